pub mod controller;
pub mod error;
pub mod generator;
pub mod request;
pub mod upload;
pub mod view;

pub use controller::Controller;
pub use error::GeradorError;
pub use generator::{GeneratedImage, Generator};
pub use request::{GenerationRequest, GenerationResult};
pub use upload::{AttachmentKind, BaseImage, Thumbnail};
pub use view::View;
