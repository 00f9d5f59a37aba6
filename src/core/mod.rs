// Public modules
pub mod assembler;
pub mod catalog;
pub mod error;
pub mod git;
pub mod image_set;
pub mod manifest;
pub mod policy;
pub mod publish;
pub mod release;
pub mod review;
pub mod transform;
pub mod version;

// Public modules for CLI access
pub mod defaults;
pub mod keychain;
pub mod paths;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
