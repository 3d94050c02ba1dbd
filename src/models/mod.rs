pub mod catalog;
pub mod image;
pub mod request;
pub mod story;
pub mod user;
pub mod wire;

pub use catalog::*;
pub use image::*;
pub use request::*;
pub use story::*;
pub use user::*;
