//! Typed HTTP client for the remote catalog/chat backend.
//!
//! [`CatalogClient`] is the only component that talks to the network. It
//! implements the `salon-core` seam traits (`CatalogApi`, `ProjectsRemote`)
//! so the stores never see reqwest types.

pub mod client;
pub mod config;

pub use client::{
    CatalogClient, DeleteImageResponse, DeleteProductResponse, ImportStatus, SyncStarted,
    SyncStatus, UpdateImageResponse, UpdatePriceResponse, UpdateTitleResponse,
};
pub use config::ClientConfig;
