pub mod ecef;
pub mod geodesy;
pub mod local;
pub mod mat4;
pub mod vec;

pub use ecef::*;
pub use geodesy::*;
pub use local::*;
pub use mat4::*;
pub use vec::*;
