//! Object and status model consumed from the monitoring core.
//!
//! Everything here is read-only input to the analysis passes.

mod objects;
mod status;

pub use objects::*;
pub use status::*;
