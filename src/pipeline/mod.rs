//! Document stages that run before inference.
//!
//! ```text
//! upload ──▶ render ──▶ encode ──▶ (inference)
//! (bytes)   (pdfium)   (base64 JPEG)
//! ```
//!
//! 1. [`upload`]: the résumé bytes for one action; presence and `%PDF` checks
//! 2. [`render`]: rasterise page index 0; runs in `spawn_blocking` because
//!    pdfium is not async-safe
//! 3. [`encode`]: JPEG-encode and base64-wrap the page as a [`encode::RasterizedPage`]

pub mod encode;
pub mod render;
pub mod upload;
