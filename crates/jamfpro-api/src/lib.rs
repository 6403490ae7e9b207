// jamfpro-api: Async Rust client for the Jamf Pro API

pub mod auth;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use auth::{AccessToken, Credentials, TokenProvider};
pub use client::JamfClient;
pub use error::{Error, ErrorClass};
pub use transport::{TlsMode, TransportConfig};
pub use types::{CreatedRef, Page};
