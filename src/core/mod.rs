// Public modules
pub mod defaults;
pub mod document;
pub mod error;
pub mod paths;
pub mod fix;
pub mod rename;
pub mod table;
pub mod timestamp;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
pub use rename::{rename, rename_with_stats, RenameStats, Renamer};
pub use table::{RenameEntry, RenamePreset, RenameTable};
