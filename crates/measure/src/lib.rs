pub mod config;
pub mod globe;
pub mod labels;
pub mod point_cloud;
pub mod session;

pub use config::*;
pub use globe::*;
pub use point_cloud::*;
pub use session::*;
