//! Terminology support
//!
//! Value sets found in a bundle or repository are indexed once, lazily, into
//! `TerminologyIndex`. Membership tests and expansions are answered from that index.
//!
//! ```ignore
//! let provider = BundleTerminologyProvider::from_bundle(&bundle, TerminologySettings::default())?;
//! let code = Code::new("http://example.com/CodeSystem/Codes", "123");
//! assert!(provider.in_value_set(&code, &ValueSetInfo::new("ValidValueSet"))?);
//! ```

pub mod code;
pub mod error;
pub mod expansion;
pub mod index;
pub mod provider;
pub mod settings;

pub use code::{Code, CodeSystemInfo, ValueSetInfo};
pub use error::TerminologyError;
pub use expansion::ValueSetExpansion;
pub use index::TerminologyIndex;
pub use provider::{
    lookup_in_code_system, BundleTerminologyProvider, RepositoryTerminologyProvider,
    TerminologyProvider,
};
pub use settings::{PreExpansionMode, TerminologySettings};
