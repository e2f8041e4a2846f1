pub mod bridge;
pub mod fov;
pub mod sync;

pub use bridge::*;
pub use fov::*;
pub use sync::*;
