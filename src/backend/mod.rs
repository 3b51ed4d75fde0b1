pub mod auth;
pub mod client;
pub mod seed;

pub use auth::{AuthError, AuthProvider, DevAuth};
pub use client::BackendClient;
