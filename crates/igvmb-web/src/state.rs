//! Shared application state for the web server.

use minijinja::Environment;
use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog::{DatasetCatalog, StaticCatalog};
use crate::config::Config;

pub const BROWSER_TEMPLATE: &str = "browser.html";

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub catalog: Arc<dyn DatasetCatalog>,
    pub igv_js_url: String,
    pub static_dir: PathBuf,
    pub templates: Environment<'static>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn DatasetCatalog>,
        igv_js_url: impl Into<String>,
        static_dir: impl Into<PathBuf>,
    ) -> Result<Self, minijinja::Error> {
        let mut templates = Environment::new();
        templates.add_template(BROWSER_TEMPLATE, include_str!("../templates/browser.html"))?;
        Ok(Self {
            catalog,
            igv_js_url: igv_js_url.into(),
            static_dir: static_dir.into(),
            templates,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, minijinja::Error> {
        Self::new(
            Arc::new(StaticCatalog::from_config(config)),
            config.server.igv_js_url.clone(),
            config.server.static_dir.clone(),
        )
    }
}

pub type SharedState = Arc<AppState>;
