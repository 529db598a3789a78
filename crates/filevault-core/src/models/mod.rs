//! Data models for the filevault client
//!
//! Wire-facing structs mirror the backend's JSON shapes exactly; everything
//! the server returns is treated as an immutable snapshot.

mod file;
mod search;
mod stats;
mod upload;

pub use file::*;
pub use search::*;
pub use stats::*;
pub use upload::*;
