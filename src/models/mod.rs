//! Model metadata: capabilities and supported URL declarations.

pub mod capabilities;
pub mod supported_urls;

pub use capabilities::ModelCapabilities;
pub use supported_urls::SupportedUrls;
