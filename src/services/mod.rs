pub mod batcher;
pub mod credential_service;
pub mod matching_service;

pub use batcher::partition;
pub use credential_service::{CatalogProvider, ConfigCredentialProvider, CredentialProvider};
pub use matching_service::{normalize_query, MatchingService};
