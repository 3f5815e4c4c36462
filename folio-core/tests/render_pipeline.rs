//! Viewer and render coordinator wired together the way a host would

use std::sync::{Arc, Mutex};

use folio_core::{
    Command, PageRenderer, RasterImage, RenderConfig, RenderCoordinator, RenderError,
    RenderOutcome, RenderRequest, Viewer, ViewerConfig, ViewerEvent,
};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct FakeRenderer {
    calls: Mutex<Vec<(usize, f32)>>,
    broken_pages: Vec<usize>,
}

impl PageRenderer for FakeRenderer {
    fn render_page(&self, page_index: usize, zoom: f32) -> Result<RasterImage, RenderError> {
        self.calls.lock().unwrap().push((page_index, zoom));
        if self.broken_pages.contains(&page_index) {
            return Err(RenderError::Backend {
                page_index,
                message: "unsupported shading".to_string(),
            });
        }
        let side = (zoom * 4.0) as u32;
        Ok(RasterImage::new(side, side))
    }
}

fn take_request(events: Vec<ViewerEvent>) -> RenderRequest {
    events
        .into_iter()
        .find_map(|event| match event {
            ViewerEvent::Render(request) => Some(request),
            _ => None,
        })
        .expect("command should request a render")
}

#[tokio::test]
async fn latest_spread_is_applied_and_older_one_discarded() {
    let renderer = Arc::new(FakeRenderer::default());
    let coordinator = RenderCoordinator::new(renderer.clone(), &RenderConfig::default());
    let mut viewer = Viewer::new(ViewerConfig::default());

    viewer.open_document(8, Some("deck.pdf".to_string()));
    viewer.dispatch(Command::ToggleDoublePage);
    let older = coordinator.render(take_request(viewer.dispatch(Command::Next)));
    let newer = coordinator.render(take_request(viewer.dispatch(Command::ZoomIn)));

    let (older, newer) = (older.await, newer.await);
    assert!(matches!(viewer.accept_render(older), RenderOutcome::Stale { .. }));

    let RenderOutcome::Applied(applied) = viewer.accept_render(newer) else {
        panic!("newest batch must be applied");
    };
    let pages: Vec<usize> = applied.images.iter().map(|(index, _)| *index).collect();
    assert_eq!(pages, vec![2, 3]);
    assert_eq!(applied.zoom, 0.75);
    assert_eq!(applied.images[0].1.width(), 3);
}

#[tokio::test]
async fn bulk_render_keeps_going_past_broken_pages() {
    let renderer = Arc::new(FakeRenderer {
        broken_pages: vec![0, 3],
        ..FakeRenderer::default()
    });
    let coordinator = RenderCoordinator::new(renderer.clone(), &RenderConfig::default());
    let mut viewer = Viewer::new(ViewerConfig::default());

    viewer.open_document(5, None);
    let request = take_request(viewer.dispatch(Command::ToggleContinuous));
    let batch = coordinator.render(request).await;

    let RenderOutcome::Applied(applied) = viewer.accept_render(batch) else {
        panic!("bulk batch must be applied");
    };
    assert!(applied.complete);
    assert_eq!(applied.failed_pages, vec![0, 3]);
    assert_eq!(applied.images.len(), 3);
    assert!(applied.status.is_some());

    let order: Vec<usize> = renderer.calls.lock().unwrap().iter().map(|c| c.0).collect();
    assert_eq!(order, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn leaving_continuous_cancels_the_bulk_pass() {
    let renderer = Arc::new(FakeRenderer::default());
    let coordinator = RenderCoordinator::new(renderer.clone(), &RenderConfig::default());
    let mut viewer = Viewer::new(ViewerConfig::default());

    viewer.open_document(50, None);
    let bulk = coordinator.render(take_request(viewer.dispatch(Command::ToggleContinuous)));
    let single = coordinator.render(take_request(viewer.dispatch(Command::ToggleContinuous)));

    let bulk = bulk.await;
    assert!(bulk.cancelled);
    assert!(matches!(viewer.accept_render(bulk), RenderOutcome::Stale { .. }));

    let RenderOutcome::Applied(applied) = viewer.accept_render(single.await) else {
        panic!("single-page batch must be applied");
    };
    assert_eq!(applied.images.len(), 1);
    assert_eq!(applied.zoom, 0.5);
}
