//! Sideboard optimization. Keep this crate free of IO and platform concerns.

pub mod adjust;
pub mod config;
pub mod error;
pub mod greedy;
pub mod optimize;
pub mod records;
pub mod refine;
pub mod sideboard;
pub mod snapshot;

pub use adjust::*;
pub use config::*;
pub use error::*;
pub use greedy::*;
pub use optimize::*;
pub use records::*;
pub use refine::*;
pub use sideboard::*;
pub use snapshot::*;
