//! ModelInfo definitions and parsers

pub mod parser;
pub mod types;

pub use parser::*;
pub use types::*;
