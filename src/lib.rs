//! Page Zones - geometry and constraint engine for page template editors
//!
//! A page is split into zones: an optional header pinned to the top, an
//! optional footer pinned to the bottom and any number of sections stacked
//! in between. This library keeps boxes inside their zones while they are
//! dragged, dropped and resized, keeps the zones in order, and reports the
//! visual feedback (zone highlights, alignment guides, overflow) an editor
//! needs to draw.
//!
//! # Example
//!
//! ```rust
//! use page_zones::run;
//!
//! let result = run(r#"
//!     [page]
//!     width = 600
//!     height = 800
//!
//!     [[box]]
//!     name = "body"
//!     kind = "section"
//!     style = { height = "400px" }
//!
//!     [[box]]
//!     name = "logo"
//!     parent = "body"
//!     position = "absolute"
//!     style = { left = "-30px", top = "10px", width = "100px", height = "40px" }
//!
//!     [[event]]
//!     type = "update"
//!     box = "logo"
//!
//!     [[event]]
//!     type = "tick"
//! "#).unwrap();
//!
//! let logo = result.find("logo").unwrap();
//! assert_eq!(result.document.get(logo).unwrap().style.get(page_zones::Property::Left), Some("0px"));
//! ```

pub mod config;
pub mod constraint;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod guides;
pub mod model;
pub mod scene;
pub mod zones;

pub use config::{ConfigError, EngineConfig};
pub use engine::{Effect, Engine, Feedback, HostEvent};
pub use error::SceneError;
pub use geometry::{GeometryProvider, Point, Rect, StyleLayout};
pub use model::{BoxId, BoxKind, BoxSpec, Document, NodeRef, PositionMode, Property, Style, StyleDelta};
pub use scene::{Scene, SceneRun};

use thiserror::Error;

/// Errors that can occur while loading and running a scene
#[derive(Debug, Error)]
pub enum PageZonesError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Configuration for running a scene
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Engine tuning
    pub engine: EngineConfig,
    /// Log every effect at debug level as it is produced
    pub trace_effects: bool,
}

impl RunConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the engine configuration
    pub fn with_engine(mut self, config: EngineConfig) -> Self {
        self.engine = config;
        self
    }

    /// Enable or disable effect tracing
    pub fn with_trace_effects(mut self, enabled: bool) -> Self {
        self.trace_effects = enabled;
        self
    }
}

/// Run a scene with default configuration
pub fn run(source: &str) -> Result<SceneRun, PageZonesError> {
    run_with_config(source, RunConfig::default())
}

/// Run a scene with custom configuration
///
/// # Example
///
/// ```rust
/// use page_zones::{run_with_config, EngineConfig, RunConfig};
///
/// let config = RunConfig::new().with_engine(EngineConfig::new().with_alignment_guides(false));
/// let result = run_with_config("[page]\nwidth = 100\nheight = 100\n", config).unwrap();
/// assert!(result.document.is_empty());
/// ```
pub fn run_with_config(source: &str, config: RunConfig) -> Result<SceneRun, PageZonesError> {
    let scene = Scene::from_str(source)?;
    let result = scene.run(&config.engine)?;

    if config.trace_effects {
        for step in &result.steps {
            for effect in &step.effects {
                tracing::debug!(step = step.index, event = step.event, effect = %effect, "effect");
            }
        }
    }

    Ok(result)
}
