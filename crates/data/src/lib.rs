//! CSV-backed archetype and card tables and their edits.

pub mod load;
mod match_result;
pub mod schema;
mod store;
mod tables;

pub use load::*;
pub use match_result::*;
pub use schema::*;
pub use store::*;
pub use tables::*;
