//! Docker Manifest Sync Library
//!
//! Library root for the docker-manifest-sync crate: a registry client that
//! fetches and stores image manifests over the Docker Registry HTTP API v2,
//! negotiating the registry's basic-to-bearer authentication scheme
//! transparently.

pub mod credentials;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod registry;

pub use credentials::CredentialStore;
pub use error::{RegistryError, Result};
pub use logging::Logger;
pub use manifest::{Descriptor, MANIFEST_V2_MEDIA_TYPE, Manifest};
pub use registry::{RegistryClient, RegistryClientBuilder};
