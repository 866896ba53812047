//! Domain models for the portal server.

pub mod account;
pub mod session;

pub use account::{Account, AccountPage, AccountView};
pub use session::CurrentUser;
