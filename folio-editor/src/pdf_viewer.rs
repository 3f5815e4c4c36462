use crate::renderer::PdfiumRenderer;
use folio_core::PageRenderer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("could not open {path}: {message}")]
    Open { path: String, message: String },

    #[error("loading was interrupted")]
    Interrupted,
}

/// An open PDF file and the renderer bound to it
#[derive(Debug, Clone)]
pub struct PdfDocument {
    path: PathBuf,
    page_count: usize,
    renderer: Arc<PdfiumRenderer>,
}

impl PdfDocument {
    /// Open a PDF document from a file path.
    ///
    /// Binding PDFium and parsing the file both block, so they run on the
    /// blocking pool.
    pub async fn load(path: PathBuf, supersample: f32) -> Result<Self, LoadError> {
        let worker_path = path.clone();
        let spawned =
            tokio::task::spawn_blocking(move || PdfiumRenderer::spawn(&worker_path, supersample))
                .await
                .map_err(|_| LoadError::Interrupted)?;

        let (renderer, page_count) = spawned.map_err(|e| LoadError::Open {
            path: path.display().to_string(),
            message: format!("{:#}", e),
        })?;

        tracing::info!(path = %path.display(), page_count, "opened PDF");
        Ok(Self {
            path,
            page_count,
            renderer: Arc::new(renderer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("Untitled")
            .to_string()
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn renderer(&self) -> Arc<dyn PageRenderer> {
        self.renderer.clone()
    }
}
