mod document;
mod font;
mod manuscript;
mod raster;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Missing resource: {0}")]
    MissingResource(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;

pub use document::{ManuscriptEntry, MissingImage, RunReport, render_document};
pub use font::BookFont;
pub use manuscript::{region_rank, sorted_entries, write_manuscript};
pub use raster::export_page_images;
