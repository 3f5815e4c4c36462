use anyhow::{Context, Result};
use folio_core::{PageRenderer, RasterImage, RenderError};
use pdfium_render::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

/// PDF renderer backed by PDFium.
///
/// PDFium handles are not thread-safe, so one worker thread owns the library
/// binding and the open document; render calls are forwarded to it over a
/// channel and block until the page comes back.
pub struct PdfiumRenderer {
    jobs: mpsc::Sender<RenderJob>,
    supersample: f32,
}

struct RenderJob {
    page_index: usize,
    scale: f32,
    reply: mpsc::Sender<Result<RasterImage, RenderError>>,
}

impl fmt::Debug for PdfiumRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfiumRenderer")
            .field("supersample", &self.supersample)
            .finish()
    }
}

impl PdfiumRenderer {
    /// Start a worker for the document at `path` and return it with the
    /// document's page count.
    ///
    /// Pages are rendered `supersample` times larger than the requested zoom
    /// and scaled down for display.
    pub fn spawn(path: &Path, supersample: f32) -> Result<(Self, usize)> {
        let (jobs, queue) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();
        let worker_path = path.to_path_buf();

        thread::Builder::new()
            .name("pdfium".to_string())
            .spawn(move || run_worker(worker_path, queue, ready_tx))
            .context("Failed to start PDFium worker thread")?;

        let page_count = ready_rx
            .recv()
            .context("PDFium worker exited during startup")?
            .map_err(anyhow::Error::msg)?;

        Ok((Self { jobs, supersample }, page_count))
    }
}

impl PageRenderer for PdfiumRenderer {
    fn render_page(&self, page_index: usize, zoom: f32) -> Result<RasterImage, RenderError> {
        let stopped = || RenderError::Worker {
            page_index,
            message: "PDFium worker is not running".to_string(),
        };

        let (reply, response) = mpsc::channel();
        self.jobs
            .send(RenderJob {
                page_index,
                scale: zoom * self.supersample,
                reply,
            })
            .map_err(|_| stopped())?;
        response.recv().map_err(|_| stopped())?
    }
}

fn bind_pdfium() -> Result<Pdfium> {
    let pdfium = Pdfium::new(
        Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .context("Failed to bind to PDFium library. Please install PDFium or download the library from https://github.com/bblanchon/pdfium-binaries")?,
    );
    Ok(pdfium)
}

fn run_worker(
    path: PathBuf,
    queue: mpsc::Receiver<RenderJob>,
    ready: mpsc::Sender<std::result::Result<usize, String>>,
) {
    let pdfium = match bind_pdfium() {
        Ok(pdfium) => pdfium,
        Err(e) => {
            let _ = ready.send(Err(format!("{:#}", e)));
            return;
        }
    };

    let document = match pdfium.load_pdf_from_file(&path, None) {
        Ok(document) => document,
        Err(e) => {
            let _ = ready.send(Err(format!("Failed to load PDF document: {}", e)));
            return;
        }
    };

    let page_count = document.pages().len() as usize;
    if ready.send(Ok(page_count)).is_err() {
        return;
    }
    tracing::debug!(path = %path.display(), page_count, "PDFium worker ready");

    // Ends once every PdfiumRenderer handle has been dropped
    for job in queue {
        let result = render_page(&document, job.page_index, job.scale);
        let _ = job.reply.send(result);
    }

    tracing::debug!(path = %path.display(), "PDFium worker stopped");
}

fn render_page(
    document: &PdfDocument<'_>,
    page_index: usize,
    scale: f32,
) -> std::result::Result<RasterImage, RenderError> {
    let backend = |message: String| RenderError::Backend {
        page_index,
        message,
    };

    let index = u16::try_from(page_index)
        .map_err(|_| backend("page index exceeds PDFium limits".to_string()))?;
    let page = document
        .pages()
        .get(index)
        .map_err(|e| backend(e.to_string()))?;

    // Calculate render size based on zoom
    let render_width = (page.width().value * scale).max(1.0) as i32;
    let render_height = (page.height().value * scale).max(1.0) as i32;

    let render_config = PdfRenderConfig::new()
        .set_target_width(render_width)
        .set_maximum_height(render_height)
        .rotate_if_landscape(PdfPageRenderRotation::None, false);

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| backend(e.to_string()))?;

    // PDFium hands back BGRA
    let mut pixels = bitmap.as_raw_bytes().to_vec();
    for pixel in pixels.chunks_exact_mut(4) {
        pixel.swap(0, 2);
    }

    RasterImage::from_raw(bitmap.width() as u32, bitmap.height() as u32, pixels)
        .ok_or_else(|| backend("bitmap size does not match its pixel buffer".to_string()))
}
