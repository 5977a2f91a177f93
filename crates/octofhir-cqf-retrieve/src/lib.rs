//! Retrieve support
//!
//! A `RetrieveProvider` answers CQL Retrieve expressions (type, context, template,
//! terminology and date criteria) from one data source. `PriorityRetrieveProvider`
//! chains several sources and returns the first non-empty answer.

pub mod bundle;
pub mod error;
pub mod filter;
pub mod priority;
pub mod provider;
pub mod repository;
pub mod request;
pub mod settings;

pub use bundle::BundleRetrieveProvider;
pub use error::RetrieveError;
pub use filter::ResourceFilter;
pub use priority::PriorityRetrieveProvider;
pub use provider::{NoOpRetrieveProvider, RetrieveProvider};
pub use repository::RepositoryRetrieveProvider;
pub use request::{DateRange, RetrieveRequest};
pub use settings::{ProfileMode, RetrieveSettings};
