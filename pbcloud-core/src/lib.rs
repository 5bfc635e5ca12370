mod auth;
mod client;

pub use auth::{AuthClient, LoginRequest, Provider, Token};
pub use client::{BookPage, CloudBook, CloudClient, DEFAULT_BASE_URL, PbCloudError};
