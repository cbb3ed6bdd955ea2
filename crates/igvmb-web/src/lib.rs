//! igvmb-web — Track server for the IGV multibrowser.
//! Serves:
//!   - the default igv browser configuration (`/data/default`)
//!   - BigWig and BAM track descriptors per object group
//!   - the browser page listing loadable groups

pub mod config;
pub mod catalog;
pub mod tracks;
pub mod error;
pub mod state;
pub mod handlers;
pub mod router;
