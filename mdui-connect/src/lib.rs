//! Collaborator contracts consumed by the MDUI login step: turning an entity
//! id into a service identity, finding the registered service that governs
//! it, and locating the UI metadata to brand the login page with.

pub mod identity;
pub mod mdui;
pub mod registry;

pub use identity::{MockServiceResolver, ServiceIdentity, ServiceResolver};
pub use mdui::{Logo, MetadataUiLocator, MockMetadataUiLocator, UiMetadata};
pub use registry::{
    AccessStrategy, MockServiceDirectory, RegisteredService, ServiceDirectory,
};
