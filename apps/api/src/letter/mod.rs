// Cover letter: the cover template with the client name stamped under
// each "Prepared for" anchor.

pub mod handlers;
pub mod stamper;

pub use stamper::CoverStamper;
