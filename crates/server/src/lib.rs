//! Unitec Portal Server library.
//!
//! Registration, session login, profile, and admin approval API. Exposed as a
//! library so the CLI can reuse the repository and password hashing, and so
//! the router can be tested without a listening socket.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
