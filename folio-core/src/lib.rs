//! # folio-core
//!
//! Page layout and navigation state machine for a PDF viewer.
//!
//! Given a page count, a layout mode (single page, double page with or
//! without a cover page, continuous scroll) and a zoom factor, the core
//! decides which page is current, which pages are visible together and what
//! must be rendered. Rasterizing pages and drawing widgets are left to the
//! host through [`PageRenderer`] and the [`ViewerEvent`] stream.
//!
//! ## Quick Start
//!
//! ```rust
//! use folio_core::{Command, Spread, Viewer, ViewerConfig, ViewerEvent};
//!
//! let mut viewer = Viewer::new(ViewerConfig::default());
//! viewer.open_document(10, Some("atlas.pdf".to_string()));
//! viewer.dispatch(Command::ToggleDoublePage);
//! viewer.dispatch(Command::ToggleCoverPage);
//!
//! let events = viewer.dispatch(Command::Next);
//! let Some(ViewerEvent::StateChanged(snapshot)) = events.first() else {
//!     unreachable!()
//! };
//! assert_eq!(snapshot.spread, Spread::pair(1, 2));
//! assert_eq!(snapshot.display_label, "2-3 / 10");
//! ```

pub mod config;
pub mod error;
pub mod layout;
pub mod navigation;
pub mod render;
pub mod spread;
pub mod state;
pub mod viewer;
pub mod zoom;

pub use config::{NavigationConfig, RenderConfig, ViewerConfig, ZoomConfig};
pub use error::{ConfigError, RenderError, Result, ViewError};
pub use layout::{LayoutEffect, LayoutMode};
pub use navigation::{page_offset_from_name, parse_page_number, PageMove};
pub use render::{
    PageRenderer, RasterImage, RenderBatch, RenderCoordinator, RenderGeneration, RenderRequest,
    RenderTarget, RenderedPage,
};
pub use spread::{compute_spread, normalize_index, Spread};
pub use state::{ViewSnapshot, ViewState};
pub use viewer::{
    AppliedRender, Command, Document, RenderOutcome, StatusLevel, StatusMessage, Viewer,
    ViewerEvent,
};
pub use zoom::ZoomChange;
