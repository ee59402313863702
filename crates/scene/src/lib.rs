pub mod camera;
pub mod config;
pub mod globe;
pub mod picking;
pub mod prefabs;

pub use camera::*;
pub use config::*;
pub use globe::*;
pub use picking::*;
pub use prefabs::*;
