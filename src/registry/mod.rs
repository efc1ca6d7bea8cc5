//! Registry interaction layer
//!
//! Authentication negotiation, transport, and the manifest client for the
//! Docker Registry HTTP API v2.

pub mod auth;
pub mod client;
pub mod transport;

pub use auth::AuthNegotiator;
pub use client::{RegistryClient, RegistryClientBuilder};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
