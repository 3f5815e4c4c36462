//! View state owned by the viewer, and the read-only snapshot handed to the UI

use crate::config::ZoomConfig;
use crate::layout::LayoutMode;
use crate::spread::{compute_spread, Spread};

/// Mutable view state of one open document.
///
/// Only the layout, navigation and zoom controllers mutate it, always through
/// the [`crate::Viewer`] that owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub(crate) page_count: usize,
    pub(crate) current_page_index: usize,
    pub(crate) zoom: f32,
    pub(crate) layout: LayoutMode,
    /// Cover preference applied whenever the layout enters double-page mode
    pub(crate) cover_page: bool,
    /// Paged zoom to restore when leaving continuous mode
    pub(crate) zoom_before_continuous: Option<f32>,
}

impl ViewState {
    pub fn new(page_count: usize, zoom: &ZoomConfig) -> Self {
        Self {
            page_count,
            current_page_index: 0,
            zoom: zoom.default,
            layout: LayoutMode::Single,
            cover_page: false,
            zoom_before_continuous: None,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn current_page_index(&self) -> usize {
        self.current_page_index
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    pub fn is_double_page_mode(&self) -> bool {
        self.layout.is_double_page()
    }

    pub fn is_cover_page_mode(&self) -> bool {
        self.layout.is_cover_page()
    }

    pub fn is_continuous_mode(&self) -> bool {
        self.layout.is_continuous()
    }

    /// Remembered cover preference, also meaningful outside double-page mode
    pub fn cover_page_preference(&self) -> bool {
        self.cover_page
    }

    pub fn spread(&self) -> Spread {
        compute_spread(
            self.page_count,
            self.current_page_index,
            self.is_double_page_mode(),
            self.is_cover_page_mode(),
        )
    }

    /// Index of the last page, `None` for an empty document
    pub(crate) fn last_page_index(&self) -> Option<usize> {
        self.page_count.checked_sub(1)
    }

    pub fn can_go_previous(&self) -> bool {
        self.page_count > 0 && self.current_page_index > 0
    }

    pub fn can_go_next(&self) -> bool {
        match self.last_page_index() {
            Some(last) if self.is_continuous_mode() => self.current_page_index < last,
            Some(last) => !self.spread().contains(last),
            None => false,
        }
    }

    pub fn snapshot(&self, display_name: Option<&str>, zoom: &ZoomConfig) -> ViewSnapshot {
        let spread = self.spread();
        ViewSnapshot {
            spread,
            zoom: self.zoom,
            display_label: spread.display_label(self.page_count),
            zoom_label: zoom_label(self.zoom),
            page_count: self.page_count,
            current_page_index: self.current_page_index,
            layout: self.layout,
            cover_page: self.cover_page,
            can_go_previous: self.can_go_previous(),
            can_go_next: self.can_go_next(),
            can_zoom: !self.is_continuous_mode() || zoom.continuous_stepping,
            display_name: display_name.map(str::to_string),
        }
    }
}

/// Everything the UI needs to draw the toolbar and page area.
///
/// Derived from [`ViewState`] on every change; never mutated by the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub spread: Spread,
    pub zoom: f32,
    /// `"3-4 / 10"`, `"5 / 10"`: 1-based page indicator
    pub display_label: String,
    /// `"150%"`
    pub zoom_label: String,
    pub page_count: usize,
    pub current_page_index: usize,
    pub layout: LayoutMode,
    pub cover_page: bool,
    pub can_go_previous: bool,
    pub can_go_next: bool,
    pub can_zoom: bool,
    pub display_name: Option<String>,
}

pub fn zoom_label(zoom: f32) -> String {
    format!("{:.0}%", zoom * 100.0)
}
