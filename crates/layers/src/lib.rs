pub mod builders;
pub mod cache;
pub mod compose;
pub mod layer;
pub mod pulse;
pub mod registry;
pub mod symbology;
pub mod time_filter;
pub mod visibility;

pub use cache::{CacheEntry, CacheStats, LayerCache};
pub use compose::*;
pub use layer::*;
pub use registry::{LAYERS, LayerDescriptor, LayerRole, ids};
pub use symbology::{Palette, Theme, colors_for};
pub use visibility::VisibilityPolicy;
