//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM
//! operations for database entities, providing a clean API for data access
//! with tenant-aware methods.

pub mod ad;
pub mod tenant;

pub use ad::{AdFields, AdRepository};
pub use tenant::{CreateTenantRequest, TenantRepository};
