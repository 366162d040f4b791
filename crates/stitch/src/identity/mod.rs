//! Customer identity resolution.
//!
//! [`IdentityStitcher`] decides which customer a row belongs to, working
//! through the [`CustomerStore`] trait. [`InMemoryStore`] is the bundled
//! implementation.

mod memory;
#[cfg(test)]
pub(crate) mod mock;
mod stitcher;
mod store;

pub use memory::InMemoryStore;
pub use stitcher::{IdentityStitcher, MatchedBy, StitchResult};
pub use store::{
    ConflictStatus, Customer, CustomerSource, CustomerStore, ImportRecord, ImportSummary, NewConflict,
    SourceLink, SourceRecord, StitchingConflict, StoreError, StoreResult,
};
