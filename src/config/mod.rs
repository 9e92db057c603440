//! Configuration module
//!
//! Settings file handling and base URL resolution.

pub mod config;

pub use config::{Config, API_URL_ENV};
