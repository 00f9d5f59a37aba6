//! Generic utility primitives with zero domain knowledge.
//!
//! - `command` - Command execution with error handling
//! - `io` - File I/O, YAML documents and directory copies with consistent error handling

pub mod command;
pub mod io;
