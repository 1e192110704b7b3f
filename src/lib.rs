//! # LocalList API Library
//!
//! This library provides the core functionality for the LocalList multi-tenant
//! directory platform: tenant-aware request routing, the directory and signup
//! HTTP surface, and the spreadsheet reconciler that keeps the ads table and
//! the admin sheet in sync.

pub mod captcha;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod mail;
pub mod models;
pub mod repositories;
pub mod routing;
pub mod server;
pub mod sheets;
pub mod storage;
pub mod sync;
pub mod telemetry;
pub use migration;
