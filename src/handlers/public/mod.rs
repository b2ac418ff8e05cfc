// Handlers reachable without a bearer token
pub mod auth;
pub mod health;

pub use auth::login;
pub use health::health;
