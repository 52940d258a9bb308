pub mod bounds;
pub mod signature;
pub mod time;

// Foundation crate: small, well-tested primitives only.
pub use bounds::*;
pub use signature::*;
pub use time::*;
