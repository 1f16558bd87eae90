//! Library exports for insignia, shared between the binary and tests.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod navigation;
pub mod services;
pub mod session;
pub mod startup;
pub mod utils;
pub mod validation;

pub use error::{ClientError, NormalizedError, Result};
