use crate::viewport::Viewport;
use folio_core::{PageRenderer, RenderCoordinator, Viewer, ViewerConfig, ViewerEvent};
use std::sync::Arc;

/// Viewer state and render plumbing for one open file
#[derive(Debug)]
pub struct Session {
    pub viewer: Viewer,
    pub coordinator: RenderCoordinator,
    pub viewport: Viewport,
}

impl Session {
    pub fn open(
        config: &ViewerConfig,
        renderer: Arc<dyn PageRenderer>,
        page_count: usize,
        display_name: String,
    ) -> (Self, Vec<ViewerEvent>) {
        let mut viewer = Viewer::new(config.clone());
        let events = viewer.open_document(page_count, Some(display_name));
        let session = Self {
            viewer,
            coordinator: RenderCoordinator::new(renderer, &config.render),
            viewport: Viewport::new(config.render.supersample),
        };
        (session, events)
    }

    /// Swap in a freshly loaded copy of the file.
    ///
    /// The view starts over on the first page, and renders against the old
    /// renderer are stopped and then dropped as stale.
    pub fn reopen(
        &mut self,
        renderer: Arc<dyn PageRenderer>,
        page_count: usize,
        display_name: String,
    ) -> Vec<ViewerEvent> {
        let events = self.viewer.open_document(page_count, Some(display_name));
        self.coordinator.supersede(self.viewer.generation());
        self.coordinator = RenderCoordinator::new(renderer, &self.viewer.config().render);
        self.viewport.clear();
        events
    }

    /// Forget the file; anything still rendering for it is stopped
    pub fn close(&mut self) {
        self.viewer.close_document();
        self.coordinator.supersede(self.viewer.generation());
        self.viewport.clear();
    }
}
