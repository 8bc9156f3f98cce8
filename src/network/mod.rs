pub mod client;
pub mod errors;

pub use client::{PageClient, PageFuture, PageSource};
pub use errors::NetworkError;
