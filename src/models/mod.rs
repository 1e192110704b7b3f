//! # Data Models
//!
//! This module contains all the data models used throughout the LocalList API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod ad;
pub mod ad_image;
pub mod tenant;

pub use ad::Entity as Ad;
pub use ad_image::Entity as AdImage;
pub use tenant::Entity as Tenant;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "locallist".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
