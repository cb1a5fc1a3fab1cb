//! Generic utility primitives with zero domain knowledge.
//!
//! - `io` - File and stdin I/O with consistent error handling

pub mod io;
