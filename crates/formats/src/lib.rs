pub mod dataset;
pub mod error;
pub mod metadata;
pub mod tileset;

pub use dataset::*;
pub use error::*;
pub use metadata::*;
pub use tileset::*;
