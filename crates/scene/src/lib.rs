pub mod camera;
pub mod descriptor;
pub mod entity;
pub mod headless;
pub mod input;
pub mod picking;
pub mod point_cloud;
pub mod viewer;
pub mod world;

pub use camera::*;
pub use descriptor::*;
pub use entity::*;
pub use input::*;
pub use picking::*;
pub use point_cloud::*;
pub use viewer::*;
pub use world::*;
