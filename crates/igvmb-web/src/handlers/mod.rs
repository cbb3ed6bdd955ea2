//! HTTP handlers for all web routes.

pub mod base;
pub mod browser;
pub mod data;
