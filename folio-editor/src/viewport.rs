use folio_core::{AppliedRender, StatusMessage, ViewSnapshot};
use iced::widget::image::Handle;
use std::collections::{BTreeMap, BTreeSet};

/// What the page area shows for one page index
#[derive(Debug, Clone)]
pub enum PageSlot<'a> {
    Ready(&'a Handle, f32),
    Failed,
    Pending,
}

/// Everything the page area needs to draw one tab: the latest snapshot from
/// the viewer and the pages rendered for it
#[derive(Debug, Default)]
pub struct Viewport {
    snapshot: Option<ViewSnapshot>,
    pages: BTreeMap<usize, (Handle, f32)>,
    failed: BTreeSet<usize>,
    generation: u64,
    supersample: f32,
}

impl Viewport {
    pub fn new(supersample: f32) -> Self {
        Self {
            supersample: supersample.max(1.0),
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> Option<&ViewSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn set_snapshot(&mut self, snapshot: ViewSnapshot) {
        self.snapshot = Some(snapshot);
    }

    /// Swap in the pages of an accepted render.
    ///
    /// A newer generation replaces everything shown before it; batches of
    /// the same generation add to what is there.
    pub fn apply(&mut self, applied: AppliedRender) -> Option<StatusMessage> {
        if applied.generation != self.generation {
            self.pages.clear();
            self.failed.clear();
            self.generation = applied.generation;
        }

        for (page_index, image) in applied.images {
            // Rasters are supersampled; display at the logical size
            let width = image.width() as f32 / self.supersample;
            let handle = Handle::from_rgba(image.width(), image.height(), image.into_raw());
            self.failed.remove(&page_index);
            self.pages.insert(page_index, (handle, width));
        }
        for page_index in applied.failed_pages {
            self.pages.remove(&page_index);
            self.failed.insert(page_index);
        }

        if !applied.complete {
            tracing::debug!(generation = applied.generation, "render pass was cut short");
        }
        applied.status
    }

    pub fn slot(&self, page_index: usize) -> PageSlot<'_> {
        if let Some((handle, width)) = self.pages.get(&page_index) {
            PageSlot::Ready(handle, *width)
        } else if self.failed.contains(&page_index) {
            PageSlot::Failed
        } else {
            PageSlot::Pending
        }
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
        self.pages.clear();
        self.failed.clear();
    }
}
