pub mod basemap;
pub mod context;
pub mod renderer;

pub use basemap::*;
pub use context::*;
pub use renderer::*;
