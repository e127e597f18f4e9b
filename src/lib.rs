//! Deployment diagnostics for Azure App Service
//!
//! Serves a JSON snapshot of the host (`/api/diagnostics`) and a viewer page
//! (`/`) that renders it alongside client-side observations.

pub mod api;
pub mod collector;
pub mod config;
pub mod startup;
pub mod types;
pub mod viewer;
