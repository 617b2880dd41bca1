pub mod client;
pub mod image;
pub mod text;
pub mod types;

pub use image::{GeminiImageClient, IMAGE_PROVIDER_NAME};
pub use text::{GeminiTextClient, TEXT_PROVIDER_NAME};
