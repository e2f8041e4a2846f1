pub mod globe_roaming;
pub mod keys;
pub mod point_cloud_roaming;
pub mod velocity;

pub use globe_roaming::*;
pub use keys::*;
pub use point_cloud_roaming::*;
pub use velocity::*;
