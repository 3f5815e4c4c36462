//! The viewer: single owner of the view state
//!
//! Every UI command goes through [`Viewer`]. It runs the matching controller,
//! derives the new spread and answers with the [`ViewerEvent`]s the UI and
//! the render coordinator need. Nothing here awaits; rendering happens
//! elsewhere and its results come back through [`Viewer::accept_render`].

use std::fmt;

use crate::config::ViewerConfig;
use crate::error::{Result, ViewError};
use crate::layout::{self, LayoutEffect, LayoutMode};
use crate::navigation::{self, PageMove};
use crate::render::{RasterImage, RenderBatch, RenderRequest, RenderTarget};
use crate::state::{ViewSnapshot, ViewState};
use crate::zoom::{self, ZoomChange};

/// A command issued by the UI
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    OpenDocument {
        page_count: usize,
        display_name: Option<String>,
    },
    CloseDocument,
    Previous,
    Next,
    First,
    Last,
    /// 1-based page number
    GoTo(i64),
    ZoomIn,
    ZoomOut,
    ZoomReset,
    ToggleDoublePage,
    ToggleCoverPage,
    ToggleContinuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Status line text for the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            text: text.into(),
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// What the viewer tells the outside world after a command
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    StateChanged(ViewSnapshot),
    Render(RenderRequest),
    /// Continuous layout: bring this page into view instead of re-rendering
    ScrollToPage(usize),
    Status(StatusMessage),
    DocumentClosed,
}

/// The document as the core sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub page_count: usize,
    pub display_name: Option<String>,
}

/// A render batch accepted for display
#[derive(Debug)]
pub struct AppliedRender {
    pub generation: u64,
    pub zoom: f32,
    pub images: Vec<(usize, RasterImage)>,
    /// Pages to show as placeholders
    pub failed_pages: Vec<usize>,
    pub status: Option<StatusMessage>,
    /// False when a bulk pass was cut short
    pub complete: bool,
}

#[derive(Debug)]
pub enum RenderOutcome {
    Applied(AppliedRender),
    /// Produced for a state that no longer exists; discard it
    Stale { generation: u64, latest: u64 },
}

#[derive(Debug)]
struct Session {
    document: Document,
    state: ViewState,
}

#[derive(Debug, Default)]
pub struct Viewer {
    config: ViewerConfig,
    session: Option<Session>,
    generation: u64,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            session: None,
            generation: 0,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn document(&self) -> Option<&Document> {
        self.session.as_ref().map(|s| &s.document)
    }

    pub fn state(&self) -> Option<&ViewState> {
        self.session.as_ref().map(|s| &s.state)
    }

    pub fn snapshot(&self) -> Option<ViewSnapshot> {
        self.session.as_ref().map(|s| {
            s.state
                .snapshot(s.document.display_name.as_deref(), &self.config.zoom)
        })
    }

    /// Generation of the latest render request
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Run a command, turning failures into status events.
    ///
    /// The view state is untouched whenever a command fails.
    pub fn dispatch(&mut self, command: Command) -> Vec<ViewerEvent> {
        let result = match command.clone() {
            Command::OpenDocument {
                page_count,
                display_name,
            } => Ok(self.open_document(page_count, display_name)),
            Command::CloseDocument => Ok(self.close_document()),
            Command::Previous => self.previous(),
            Command::Next => self.next(),
            Command::First => self.first(),
            Command::Last => self.last(),
            Command::GoTo(page_number) => self.go_to(page_number),
            Command::ZoomIn => self.zoom_in(),
            Command::ZoomOut => self.zoom_out(),
            Command::ZoomReset => self.zoom_reset(),
            Command::ToggleDoublePage => self.toggle_double_page(),
            Command::ToggleCoverPage => self.toggle_cover_page(),
            Command::ToggleContinuous => self.toggle_continuous(),
        };

        match result {
            Ok(events) => events,
            Err(err) => {
                tracing::warn!(?command, "command rejected: {}", err);
                vec![ViewerEvent::Status(StatusMessage::warning(err.to_string()))]
            }
        }
    }

    /// Replace the current document, starting on the first page at the
    /// default zoom in single-page layout.
    ///
    /// Renders still in flight for the previous document become stale.
    pub fn open_document(
        &mut self,
        page_count: usize,
        display_name: Option<String>,
    ) -> Vec<ViewerEvent> {
        let state = ViewState::new(page_count, &self.config.zoom);
        let name = display_name.clone().unwrap_or_else(|| "Untitled".to_string());
        self.session = Some(Session {
            document: Document {
                page_count,
                display_name,
            },
            state,
        });
        tracing::debug!(page_count, name = %name, "document opened");

        if page_count == 0 {
            // Nothing to render, so no request will move the generation on
            self.generation += 1;
            let mut events = self.state_changed();
            events.push(ViewerEvent::Status(StatusMessage::warning(format!(
                "{} has no pages",
                name
            ))));
            return events;
        }

        let mut events = self.refresh(LayoutEffect::RenderSpread);
        events.push(ViewerEvent::Status(StatusMessage::info(format!(
            "File loaded: {}",
            name
        ))));
        events
    }

    /// Drop the document; any render still in flight becomes stale
    pub fn close_document(&mut self) -> Vec<ViewerEvent> {
        if self.session.take().is_none() {
            return Vec::new();
        }
        self.generation += 1;
        tracing::debug!(generation = self.generation, "document closed");
        vec![ViewerEvent::DocumentClosed]
    }

    pub fn previous(&mut self) -> Result<Vec<ViewerEvent>> {
        let moved = navigation::previous(self.session_mut()?.state_mut());
        Ok(self.after_move(moved))
    }

    pub fn next(&mut self) -> Result<Vec<ViewerEvent>> {
        let moved = navigation::next(self.session_mut()?.state_mut());
        Ok(self.after_move(moved))
    }

    pub fn first(&mut self) -> Result<Vec<ViewerEvent>> {
        let moved = navigation::first(self.session_mut()?.state_mut());
        Ok(self.after_move(moved))
    }

    pub fn last(&mut self) -> Result<Vec<ViewerEvent>> {
        let moved = navigation::last(self.session_mut()?.state_mut());
        Ok(self.after_move(moved))
    }

    /// Go to a 1-based page number, honoring the filename page offset when
    /// it is enabled.
    pub fn go_to(&mut self, requested_page_number: i64) -> Result<Vec<ViewerEvent>> {
        let use_offset = self.config.navigation.filename_page_offset;
        let session = self.session_mut()?;
        let offset = if use_offset {
            session
                .document
                .display_name
                .as_deref()
                .and_then(navigation::page_offset_from_name)
                .unwrap_or(0)
        } else {
            0
        };
        let moved = navigation::go_to(&mut session.state, requested_page_number, offset)?;
        Ok(self.after_move(moved))
    }

    /// Parse go-to text and jump there
    pub fn go_to_text(&mut self, text: &str) -> Result<Vec<ViewerEvent>> {
        let page_number = navigation::parse_page_number(text)?;
        self.go_to(page_number)
    }

    pub fn zoom_in(&mut self) -> Result<Vec<ViewerEvent>> {
        let config = self.config.zoom;
        let change = zoom::zoom_in(self.session_mut()?.state_mut(), &config)?;
        Ok(self.after_zoom(change))
    }

    pub fn zoom_out(&mut self) -> Result<Vec<ViewerEvent>> {
        let config = self.config.zoom;
        let change = zoom::zoom_out(self.session_mut()?.state_mut(), &config)?;
        Ok(self.after_zoom(change))
    }

    pub fn zoom_reset(&mut self) -> Result<Vec<ViewerEvent>> {
        let config = self.config.zoom;
        let change = zoom::zoom_reset(self.session_mut()?.state_mut(), &config)?;
        Ok(self.after_zoom(change))
    }

    pub fn toggle_double_page(&mut self) -> Result<Vec<ViewerEvent>> {
        let effect = layout::toggle_double_page(self.session_mut()?.state_mut())?;
        Ok(self.refresh(effect))
    }

    pub fn toggle_cover_page(&mut self) -> Result<Vec<ViewerEvent>> {
        let effect = layout::toggle_cover_page(self.session_mut()?.state_mut())?;
        Ok(self.refresh(effect))
    }

    pub fn toggle_continuous(&mut self) -> Result<Vec<ViewerEvent>> {
        let config = self.config.zoom;
        let effect = layout::toggle_continuous(self.session_mut()?.state_mut(), &config);
        Ok(self.refresh(effect))
    }

    /// Move straight to `target`; asking for the current layout is a no-op
    pub fn set_layout(&mut self, target: LayoutMode) -> Result<Vec<ViewerEvent>> {
        let config = self.config.zoom;
        let effect = layout::set_layout(self.session_mut()?.state_mut(), target, &config);
        Ok(self.refresh(effect))
    }

    /// Take a finished render pass.
    ///
    /// Batches from an older generation are reported as stale so the UI
    /// never shows pages for a spread or zoom it has already left.
    pub fn accept_render(&self, batch: RenderBatch) -> RenderOutcome {
        let generation = batch.generation();
        if self.session.is_none() || generation != self.generation {
            tracing::debug!(generation, latest = self.generation, "discarding stale render");
            return RenderOutcome::Stale {
                generation,
                latest: self.generation,
            };
        }

        let mut images = Vec::with_capacity(batch.pages.len());
        let mut failures = Vec::new();
        for page in batch.pages {
            match page.result {
                Ok(image) => images.push((page.page_index, image)),
                Err(err) => failures.push(err),
            }
        }

        let status = match failures.as_slice() {
            [] => None,
            [only] => Some(StatusMessage::error(only.to_string())),
            [first, rest @ ..] => Some(StatusMessage::error(format!(
                "{} (and {} more pages failed)",
                first,
                rest.len()
            ))),
        };

        RenderOutcome::Applied(AppliedRender {
            generation,
            zoom: batch.request.zoom,
            images,
            failed_pages: failures.iter().map(|err| err.page_index()).collect(),
            status,
            complete: !batch.cancelled,
        })
    }

    fn session_mut(&mut self) -> Result<&mut Session> {
        self.session.as_mut().ok_or(ViewError::NoDocument)
    }

    fn after_move(&mut self, moved: Option<PageMove>) -> Vec<ViewerEvent> {
        let Some(moved) = moved else {
            return Vec::new();
        };
        let continuous = self
            .state()
            .map(ViewState::is_continuous_mode)
            .unwrap_or(false);
        if continuous {
            let mut events = self.state_changed();
            events.push(ViewerEvent::ScrollToPage(moved.to));
            events
        } else {
            self.refresh(LayoutEffect::RenderSpread)
        }
    }

    fn after_zoom(&mut self, change: Option<ZoomChange>) -> Vec<ViewerEvent> {
        if change.is_none() {
            return Vec::new();
        }
        let continuous = self
            .state()
            .map(ViewState::is_continuous_mode)
            .unwrap_or(false);
        if continuous {
            self.refresh(LayoutEffect::RenderDocument)
        } else {
            self.refresh(LayoutEffect::RenderSpread)
        }
    }

    fn refresh(&mut self, effect: LayoutEffect) -> Vec<ViewerEvent> {
        match effect {
            LayoutEffect::Unchanged => Vec::new(),
            LayoutEffect::PreferenceOnly => self.state_changed(),
            LayoutEffect::RenderSpread => {
                let mut events = self.state_changed();
                if let Some(request) = self.next_request(false) {
                    events.push(ViewerEvent::Render(request));
                }
                events
            }
            LayoutEffect::RenderDocument => {
                let mut events = self.state_changed();
                if let Some(request) = self.next_request(true) {
                    events.push(ViewerEvent::Render(request));
                }
                if let Some(state) = self.state().filter(|state| state.page_count() > 0) {
                    events.push(ViewerEvent::ScrollToPage(state.current_page_index()));
                }
                events
            }
        }
    }

    fn state_changed(&self) -> Vec<ViewerEvent> {
        self.snapshot()
            .map(ViewerEvent::StateChanged)
            .into_iter()
            .collect()
    }

    fn next_request(&mut self, whole_document: bool) -> Option<RenderRequest> {
        let (target, zoom) = {
            let state = self.state()?;
            if state.page_count() == 0 {
                return None;
            }
            let target = if whole_document {
                RenderTarget::Document {
                    page_count: state.page_count(),
                }
            } else {
                RenderTarget::Spread(state.spread())
            };
            (target, state.zoom())
        };

        self.generation += 1;
        tracing::debug!(generation = self.generation, zoom, ?target, "render requested");
        Some(RenderRequest {
            generation: self.generation,
            zoom,
            target,
        })
    }
}

impl Session {
    fn state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }
}
