//! Render coordination
//!
//! The viewer never rasterizes anything itself. It emits [`RenderRequest`]s,
//! tagged with a generation number, and a [`RenderCoordinator`] turns them
//! into calls to an external [`PageRenderer`].
//!
//! Rendering is the only slow, I/O-bound step, so each page runs on tokio's
//! blocking pool under a deadline. When a newer request is announced, a bulk
//! pass stops before its next page, and the viewer drops any completed batch
//! whose generation is no longer the latest.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::spread::Spread;

/// Rasterized page handed back by the renderer
pub type RasterImage = image::RgbaImage;

/// External page rasterizer.
///
/// Called from tokio's blocking pool, so implementations may block.
pub trait PageRenderer: Send + Sync + 'static {
    fn render_page(&self, page_index: usize, zoom: f32) -> Result<RasterImage, RenderError>;
}

/// Which pages a request covers
#[derive(Debug, Clone, PartialEq)]
pub enum RenderTarget {
    /// The visible spread in single or double-page layouts
    Spread(Spread),
    /// Every page of the document, in index order (continuous layout)
    Document { page_count: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub generation: u64,
    pub zoom: f32,
    pub target: RenderTarget,
}

impl RenderRequest {
    /// Pages to render, in the order they are rendered
    pub fn page_indices(&self) -> Vec<usize> {
        match &self.target {
            RenderTarget::Spread(spread) => spread.pages().collect(),
            RenderTarget::Document { page_count } => (0..*page_count).collect(),
        }
    }

    pub fn is_bulk(&self) -> bool {
        matches!(self.target, RenderTarget::Document { .. })
    }
}

/// Latest announced render generation, shared between the coordinator and
/// the passes it started.
///
/// A pass for generation `g` is superseded as soon as any generation greater
/// than `g` is announced. All clones observe the same counter.
#[derive(Debug, Clone, Default)]
pub struct RenderGeneration {
    latest: Arc<AtomicU64>,
}

impl RenderGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `generation` as issued. Older values never move the counter back.
    pub fn announce(&self, generation: u64) {
        self.latest.fetch_max(generation, Ordering::AcqRel);
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    pub fn is_superseded(&self, generation: u64) -> bool {
        self.latest() > generation
    }
}

/// Outcome for one page of a batch
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub page_index: usize,
    pub result: Result<RasterImage, RenderError>,
}

/// Everything a render pass produced
#[derive(Debug, Clone)]
pub struct RenderBatch {
    pub request: RenderRequest,
    pub pages: Vec<RenderedPage>,
    /// The pass stopped early because a newer generation was announced
    pub cancelled: bool,
}

impl RenderBatch {
    pub fn generation(&self) -> u64 {
        self.request.generation
    }

    pub fn failures(&self) -> impl Iterator<Item = &RenderError> {
        self.pages.iter().filter_map(|page| page.result.as_ref().err())
    }
}

/// Drives the external renderer for the requests a viewer emits
#[derive(Clone)]
pub struct RenderCoordinator {
    renderer: Arc<dyn PageRenderer>,
    timeout: Duration,
    generation: RenderGeneration,
}

impl fmt::Debug for RenderCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderCoordinator")
            .field("timeout", &self.timeout)
            .field("generation", &self.generation.latest())
            .finish()
    }
}

impl RenderCoordinator {
    pub fn new(renderer: Arc<dyn PageRenderer>, config: &RenderConfig) -> Self {
        Self::with_generation(renderer, config.timeout(), RenderGeneration::new())
    }

    /// Build a coordinator that shares an existing generation counter
    pub fn with_generation(
        renderer: Arc<dyn PageRenderer>,
        timeout: Duration,
        generation: RenderGeneration,
    ) -> Self {
        Self {
            renderer,
            timeout,
            generation,
        }
    }

    pub fn generation(&self) -> &RenderGeneration {
        &self.generation
    }

    /// Stop every pass older than `generation` without starting a new one
    pub fn supersede(&self, generation: u64) {
        self.generation.announce(generation);
    }

    /// Render the pages of `request`.
    ///
    /// The request's generation is announced immediately, so older passes
    /// still running stop before their next page. The returned future is
    /// `'static` and can be handed to any executor running on tokio.
    pub fn render(
        &self,
        request: RenderRequest,
    ) -> impl Future<Output = RenderBatch> + Send + 'static {
        self.generation.announce(request.generation);

        let renderer = Arc::clone(&self.renderer);
        let timeout = self.timeout;
        let gate = self.generation.clone();

        async move {
            let indices = request.page_indices();
            let mut pages = Vec::with_capacity(indices.len());
            let mut cancelled = false;

            tracing::debug!(
                generation = request.generation,
                zoom = request.zoom,
                pages = indices.len(),
                bulk = request.is_bulk(),
                "render pass started"
            );

            for page_index in indices {
                if gate.is_superseded(request.generation) {
                    tracing::debug!(
                        generation = request.generation,
                        latest = gate.latest(),
                        page_index,
                        "render pass superseded"
                    );
                    cancelled = true;
                    break;
                }

                let result =
                    render_one(Arc::clone(&renderer), page_index, request.zoom, timeout).await;
                if let Err(err) = &result {
                    tracing::error!(page_index, generation = request.generation, "{}", err);
                }
                pages.push(RenderedPage { page_index, result });
            }

            RenderBatch {
                request,
                pages,
                cancelled,
            }
        }
    }
}

async fn render_one(
    renderer: Arc<dyn PageRenderer>,
    page_index: usize,
    zoom: f32,
    timeout: Duration,
) -> Result<RasterImage, RenderError> {
    let task = tokio::task::spawn_blocking(move || renderer.render_page(page_index, zoom));
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(RenderError::Worker {
            page_index,
            message: join_error.to_string(),
        }),
        Err(_) => Err(RenderError::Timeout {
            page_index,
            timeout,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Renders a 1x1 image whose red channel is the page index
    #[derive(Default)]
    struct RecordingRenderer {
        calls: Mutex<Vec<(usize, f32)>>,
        fail_on: Option<usize>,
    }

    impl PageRenderer for RecordingRenderer {
        fn render_page(&self, page_index: usize, zoom: f32) -> Result<RasterImage, RenderError> {
            self.calls.lock().unwrap().push((page_index, zoom));
            if self.fail_on == Some(page_index) {
                return Err(RenderError::Backend {
                    page_index,
                    message: "corrupt page".to_string(),
                });
            }
            Ok(RasterImage::from_pixel(
                1,
                1,
                image::Rgba([page_index as u8, 0, 0, 255]),
            ))
        }
    }

    struct SlowRenderer(Duration);

    impl PageRenderer for SlowRenderer {
        fn render_page(&self, _page_index: usize, _zoom: f32) -> Result<RasterImage, RenderError> {
            std::thread::sleep(self.0);
            Ok(RasterImage::new(1, 1))
        }
    }

    /// Announces a newer generation while rendering `at_page`
    struct SupersedingRenderer {
        gate: RenderGeneration,
        at_page: usize,
    }

    impl PageRenderer for SupersedingRenderer {
        fn render_page(&self, page_index: usize, _zoom: f32) -> Result<RasterImage, RenderError> {
            if page_index == self.at_page {
                self.gate.announce(self.gate.latest() + 1);
            }
            Ok(RasterImage::new(1, 1))
        }
    }

    fn document_request(generation: u64, page_count: usize) -> RenderRequest {
        RenderRequest {
            generation,
            zoom: 1.0,
            target: RenderTarget::Document { page_count },
        }
    }

    #[test]
    fn test_page_indices_follow_target() {
        let spread = RenderRequest {
            generation: 1,
            zoom: 0.5,
            target: RenderTarget::Spread(Spread::cover(0)),
        };
        assert_eq!(spread.page_indices(), vec![0]);
        assert!(!spread.is_bulk());
        assert_eq!(document_request(1, 4).page_indices(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_generation_never_moves_back() {
        let generation = RenderGeneration::new();
        generation.announce(5);
        generation.announce(3);
        assert_eq!(generation.latest(), 5);
        assert!(generation.is_superseded(4));
        assert!(!generation.is_superseded(5));
    }

    #[tokio::test]
    async fn test_spread_renders_both_pages_at_zoom() {
        let renderer = Arc::new(RecordingRenderer::default());
        let coordinator = RenderCoordinator::new(renderer.clone(), &RenderConfig::default());

        let batch = coordinator
            .render(RenderRequest {
                generation: 1,
                zoom: 1.5,
                target: RenderTarget::Spread(Spread::pair(3, 4)),
            })
            .await;

        assert!(!batch.cancelled);
        assert_eq!(batch.generation(), 1);
        assert_eq!(*renderer.calls.lock().unwrap(), vec![(3, 1.5), (4, 1.5)]);
        let image = batch.pages[1].result.as_ref().unwrap();
        assert_eq!(image.get_pixel(0, 0)[0], 4);
    }

    #[tokio::test]
    async fn test_bulk_render_is_in_index_order() {
        let renderer = Arc::new(RecordingRenderer::default());
        let coordinator = RenderCoordinator::new(renderer.clone(), &RenderConfig::default());

        let batch = coordinator.render(document_request(1, 5)).await;

        let order: Vec<usize> = renderer.calls.lock().unwrap().iter().map(|c| c.0).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
        assert_eq!(batch.pages.len(), 5);
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_bulk_render() {
        let renderer = Arc::new(RecordingRenderer {
            fail_on: Some(2),
            ..RecordingRenderer::default()
        });
        let coordinator = RenderCoordinator::new(renderer, &RenderConfig::default());

        let batch = coordinator.render(document_request(1, 4)).await;

        assert_eq!(batch.pages.len(), 4);
        let failures: Vec<usize> = batch.failures().map(RenderError::page_index).collect();
        assert_eq!(failures, vec![2]);
        assert!(batch.pages[3].result.is_ok());
    }

    #[tokio::test]
    async fn test_superseded_bulk_render_stops() {
        let gate = RenderGeneration::new();
        let renderer = Arc::new(SupersedingRenderer {
            gate: gate.clone(),
            at_page: 1,
        });
        let coordinator =
            RenderCoordinator::with_generation(renderer, Duration::from_secs(5), gate);

        let batch = coordinator.render(document_request(1, 6)).await;

        assert!(batch.cancelled);
        let rendered: Vec<usize> = batch.pages.iter().map(|p| p.page_index).collect();
        assert_eq!(rendered, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_older_request_is_superseded_before_it_starts() {
        let renderer = Arc::new(RecordingRenderer::default());
        let coordinator = RenderCoordinator::new(renderer.clone(), &RenderConfig::default());

        let stale = coordinator.render(document_request(1, 3));
        coordinator.supersede(2);
        let batch = stale.await;

        assert!(batch.cancelled);
        assert!(batch.pages.is_empty());
        assert!(renderer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_slow_page_times_out() {
        let renderer = Arc::new(SlowRenderer(Duration::from_millis(300)));
        let coordinator = RenderCoordinator::with_generation(
            renderer,
            Duration::from_millis(20),
            RenderGeneration::new(),
        );

        let batch = coordinator
            .render(RenderRequest {
                generation: 1,
                zoom: 0.5,
                target: RenderTarget::Spread(Spread::single(0)),
            })
            .await;

        assert!(matches!(
            batch.pages[0].result,
            Err(RenderError::Timeout { page_index: 0, .. })
        ));
    }
}
