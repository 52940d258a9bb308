pub mod collection;
pub mod highlight;
pub mod records;
pub mod stores;
pub mod tier;
pub mod view_state;

pub use collection::*;
pub use highlight::*;
pub use records::*;
pub use stores::*;
pub use tier::*;
pub use view_state::*;
