// Account subsystem: users and password-reset tokens over SQLite.
//
// Entirely independent of the subtitling pipeline; no data or control flow
// crosses between the two.

pub mod auth;
pub mod connection;
pub mod repository;
pub mod schema;
pub mod service;

pub use connection::DatabaseConnection;
pub use repository::{AccountRepository, ResetTokenRecord, UserRecord};
pub use service::{AccountService, AuthenticatedUser};
