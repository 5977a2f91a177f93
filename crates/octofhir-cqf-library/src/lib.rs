//! CQL library support
//!
//! - `LibraryVersionSelector` picks the best candidate for a requested library name
//!   and version.
//! - `CompiledLibraryCache` holds compiled libraries keyed by `VersionedIdentifier`,
//!   compiling each key at most once at a time.
//! - `LibraryCacheInvalidator` drops cached entries when Library resources change.
//! - `LibraryContentProvider` loads CQL source or ELM JSON from Library resources.

pub mod cache;
pub mod content;
pub mod error;
pub mod invalidation;
pub mod selector;

pub use cache::CompiledLibraryCache;
pub use content::{LibraryContent, LibraryContentProvider, RepositoryLibraryContentProvider};
pub use error::LibraryError;
pub use invalidation::{
    InvalidationOutcome, LibraryCacheInvalidator, LibraryIdentityLookup,
    RepositoryLibraryIdentityLookup, ResourceChangeEvent, ResourceId,
};
pub use selector::{LibraryVersionSelector, VersionedArtifact};
