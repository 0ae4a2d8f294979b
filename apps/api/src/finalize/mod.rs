// Proposal finalization: terms merge, page numbers, signature block and the
// external outline-flattening pass.

pub mod handlers;
pub mod params;
pub mod pipeline;
pub mod postprocess;
pub mod signature;

pub use pipeline::{FinalizeError, Finalizer};
pub use postprocess::{Ghostscript, PostProcessError};
