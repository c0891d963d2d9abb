pub mod builder;
pub mod dockerfile;
pub mod entrypoint;
pub mod error;
pub mod recipe;

pub use builder::{build_image, BuildRequest};
pub use entrypoint::TrainInvocation;
pub use error::ImageError;
pub use recipe::ImageRecipe;
