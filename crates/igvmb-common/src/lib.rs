//! igvmb-common — Shared types used by the track server and the track loader.

pub mod error;
pub mod category;
pub mod tracks;

// Re-export commonly used types
pub use category::TrackCategory;
pub use error::{IgvError, Result};
pub use tracks::{BrowserConfig, GuideLine, Reference, Track};
