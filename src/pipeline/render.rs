//! First-page rasterisation via pdfium.
//!
//! Only page index 0 is ever rendered. Later pages are never loaded into a
//! bitmap, so a résumé with extra pages produces the same image as its first
//! page alone.
//!
//! pdfium is not async-safe, so [`render_first_page`] moves the work onto
//! the blocking pool with `spawn_blocking`. The longest edge is capped at
//! `max_rendered_pixels` whatever the physical page size.

use crate::config::AtsConfig;
use crate::error::AtsError;
use crate::pipeline::upload::UploadedResume;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Turns PDF bytes into an image of page one.
///
/// Implementations are synchronous and may block; callers go through
/// [`render_first_page`].
pub trait Rasterizer: Send + Sync {
    fn rasterize_first_page(&self, resume: &UploadedResume) -> Result<DynamicImage, AtsError>;
}

/// [`Rasterizer`] backed by the pdfium C++ library.
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    max_pixels: u32,
    lib_path: Option<PathBuf>,
}

impl PdfiumRasterizer {
    pub fn new(config: &AtsConfig) -> Self {
        Self {
            max_pixels: config.max_rendered_pixels,
            lib_path: config.pdfium_lib_path.clone(),
        }
    }

    /// Bind to libpdfium: the configured directory if any, otherwise the
    /// working directory, otherwise the system library path.
    fn bind(&self) -> Result<Pdfium, AtsError> {
        let bindings = match &self.lib_path {
            Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| AtsError::PdfiumBindingFailed(format!("{:?}", e)))?;

        Ok(Pdfium::new(bindings))
    }

    /// Check that libpdfium can be loaded, without touching any document.
    pub fn probe(&self) -> Result<(), AtsError> {
        self.bind().map(|_| ())
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn rasterize_first_page(&self, resume: &UploadedResume) -> Result<DynamicImage, AtsError> {
        let pdfium = self.bind()?;
        let name = resume.name().to_string();

        let document = pdfium
            .load_pdf_from_byte_slice(resume.bytes(), None)
            .map_err(|e| {
                let err_str = format!("{:?}", e);
                if err_str.contains("Password") || err_str.contains("password") {
                    AtsError::PasswordRequired { name: name.clone() }
                } else {
                    AtsError::CorruptPdf {
                        name: name.clone(),
                        detail: err_str,
                    }
                }
            })?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        if total_pages == 0 {
            return Err(AtsError::EmptyDocument { name });
        }
        info!("PDF '{}' loaded: {} pages, rendering page 1", name, total_pages);

        let render_config = PdfRenderConfig::new()
            .set_target_width(self.max_pixels as i32)
            .set_maximum_height(self.max_pixels as i32);

        let page = pages
            .get(0)
            .map_err(|e| AtsError::RasterisationFailed {
                detail: format!("{:?}", e),
            })?;

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| AtsError::RasterisationFailed {
                detail: format!("{:?}", e),
            })?;

        let image = bitmap.as_image();
        debug!("Rendered page 1 → {}x{} px", image.width(), image.height());

        Ok(image)
    }
}

/// Rasterise page one of `resume` on the blocking pool.
pub async fn render_first_page(
    rasterizer: Arc<dyn Rasterizer>,
    resume: UploadedResume,
) -> Result<DynamicImage, AtsError> {
    resume.ensure_pdf()?;

    tokio::task::spawn_blocking(move || rasterizer.rasterize_first_page(&resume))
        .await
        .map_err(|e| AtsError::Internal(format!("Render task panicked: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingRasterizer {
        calls: AtomicUsize,
    }

    impl Rasterizer for CountingRasterizer {
        fn rasterize_first_page(&self, _resume: &UploadedResume) -> Result<DynamicImage, AtsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                4,
                4,
                Rgba([255, 255, 255, 255]),
            )))
        }
    }

    #[tokio::test]
    async fn non_pdf_never_reaches_rasterizer() {
        let r = Arc::new(CountingRasterizer {
            calls: AtomicUsize::new(0),
        });
        let resume = UploadedResume::new("notes.pdf", b"plain text".to_vec());
        let err = render_first_page(r.clone(), resume).await.unwrap_err();
        assert!(matches!(err, AtsError::NotAPdf { .. }));
        assert_eq!(r.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn pdf_bytes_are_rasterized_once() {
        let r = Arc::new(CountingRasterizer {
            calls: AtomicUsize::new(0),
        });
        let resume = UploadedResume::new("cv.pdf", b"%PDF-1.7\n".to_vec());
        let img = render_first_page(r.clone(), resume).await.unwrap();
        assert_eq!(img.width(), 4);
        assert_eq!(r.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn pdfium_rasterizer_takes_limits_from_config() {
        let config = AtsConfig::builder()
            .api_key("k")
            .max_rendered_pixels(1200)
            .pdfium_lib_path("/opt/pdfium/lib")
            .build()
            .unwrap();
        let r = PdfiumRasterizer::new(&config);
        assert_eq!(r.max_pixels, 1200);
        assert_eq!(r.lib_path, Some(PathBuf::from("/opt/pdfium/lib")));
    }
}
