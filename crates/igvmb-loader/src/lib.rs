//! igvmb-loader — Genome browser initializer and on-demand track loader.
//!
//! Fetches the default browser configuration from the track server, hands it
//! to a [`widget::GenomeWidget`] and then registers BigWig / BAM track
//! descriptors with the resulting browser handle on request.

pub mod error;
pub mod source;
pub mod widget;
pub mod loader;

#[cfg(test)]
mod mock;

pub use error::LoaderError;
pub use loader::{
    register_tracks, BrowserState, LoadOutcome, LoaderEvent, RegistrationReport, TrackFailure,
    TrackLoader,
};
pub use source::{HttpTrackSource, TrackSource};
pub use widget::{BrowserHandle, GenomeWidget, SessionBrowser, SessionWidget};
