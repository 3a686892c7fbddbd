//! Best-effort page image export through Pdfium.
//!
//! The primary PDF is already on disk when this runs; the caller treats
//! any error here as a warning, not a failed run.

use crate::{RenderError, Result};
use book_compose::{ImageFormat, ImageOutput};
use pdfium_render::prelude::*;
use std::path::Path;

/// Initialize Pdfium, trying the vendored library first, then falling
/// back to the system library.
fn bind_pdfium() -> std::result::Result<Pdfium, PdfiumError> {
    let vendor_path = std::env::current_dir().ok().and_then(|mut p| {
        p.push("vendor/pdfium/lib");
        if p.exists() { Some(p) } else { None }
    });

    if let Some(vendor_path) = vendor_path {
        if let Ok(binding) =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&vendor_path))
        {
            return Ok(Pdfium::new(binding));
        }
    }

    Pdfium::bind_to_system_library().map(Pdfium::new)
}

/// Render every page of the finished document to an image file with a
/// 1-based, 3-digit-padded numeric name. Stale numbered files of the
/// same format are cleared first. Returns the number of files written.
pub fn export_page_images(pdf_bytes: &[u8], output: &ImageOutput) -> Result<usize> {
    let pdfium = bind_pdfium()
        .map_err(|e| RenderError::Pdf(format!("pdfium library unavailable: {e:?}")))?;
    let document = pdfium
        .load_pdf_from_byte_slice(pdf_bytes, None)
        .map_err(|e| RenderError::Pdf(format!("failed to reopen generated PDF: {e:?}")))?;

    std::fs::create_dir_all(&output.folder)?;
    clear_stale_images(&output.folder, output.format)?;

    let mut exported = 0usize;
    for (index, page) in document.pages().iter().enumerate() {
        let target_width = (page.width().value / 72.0 * output.dpi).round().max(1.0) as i32;
        let config = PdfRenderConfig::new().set_target_width(target_width);
        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| RenderError::Pdf(format!("failed to render page {}: {e:?}", index + 1)))?;
        let file = output
            .folder
            .join(format!("{:03}.{}", index + 1, output.format.extension()));
        match output.format {
            ImageFormat::Png => bitmap.as_image().save(&file)?,
            // JPEG has no alpha channel.
            ImageFormat::Jpg => bitmap.as_image().into_rgb8().save(&file)?,
        }
        exported += 1;
    }
    log::info!(
        "exported {exported} page images to {}",
        output.folder.display()
    );
    Ok(exported)
}

fn clear_stale_images(folder: &Path, format: ImageFormat) -> Result<()> {
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        let numbered = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.parse::<u32>().is_ok());
        let matches_format = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(format.extension()));
        if numbered && matches_format {
            std::fs::remove_file(&path)?;
        }
    }
    Ok(())
}
