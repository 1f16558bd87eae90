//! The authenticated request client and its error normalization.

pub mod api_client;
pub mod normalizer;
pub mod options;

pub use api_client::ApiClient;
pub use normalizer::{normalize, RawFailure, RawResponse};
pub use options::RequestOptions;
