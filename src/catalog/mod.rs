//! Static region and category tables, fixed at startup.

mod category;
mod region;

pub use category::{Category, CategoryMap, WILDCARD_TYPE};
pub use region::{Region, RegionCatalog};
