//! Page expansion: walk the ordered block list and flatten it into
//! fully-resolved [`PageSpec`] records with sequential page numbers.

use crate::config::{Book, OffsetSection};
use crate::resolve::{RefContext, TextRef, TextResolver};
use crate::types::{ComposeError, PageKind, PageSpec, Result, SpreadSide, in_to_pt};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One raw entry of the `pages` list (or of a library page list).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageBlock {
    pub slug: Option<String>,
    pub kind: Option<String>,
    pub image: Option<String>,
    pub span: Option<i64>,
    pub image_scale: Option<f32>,
    pub image_offset_in: OffsetSection,
    pub text: BTreeMap<String, TextRef>,
}

/// Expand the book's page blocks into concrete page records.
///
/// A non-empty library page list takes priority over the inline config
/// list; the two are never merged. Bare text strings from library pages
/// are literal content rather than file names.
pub fn expand_pages(book: &Book) -> Result<Vec<PageSpec>> {
    let (blocks, prefer_inline) = if book.library.pages().is_empty() {
        (book.pages.as_slice(), false)
    } else {
        (book.library.pages(), true)
    };

    let resolver = TextResolver::new(&book.library);
    let mut specs = Vec::new();
    let mut page_number = 1usize;

    for (block_index, block) in blocks.iter().enumerate() {
        let slug = block
            .slug
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("page-{}", block_index + 1));
        let kind = PageKind::parse(block.kind.as_deref().unwrap_or("page"));
        let span = match block.span {
            Some(span) if span < 1 => {
                return Err(ComposeError::Config(format!(
                    "page span must be >= 1 (slug={slug})"
                )));
            }
            Some(span) => span as usize,
            None => kind.default_span(),
        };
        if kind == PageKind::Spread && page_number % 2 != 0 {
            return Err(ComposeError::Config(format!(
                "spread '{slug}' would start on page {page_number} (a right-hand page); \
                 spreads must begin on an even page number, insert a filler page before it"
            )));
        }
        let image_name = block
            .image
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ComposeError::Config(format!("every page needs an image (slug={slug})"))
            })?;
        let image_path = resolve_media_path(&book.image_folder, image_name);
        let scale = block.image_scale.unwrap_or(book.default_scale);
        // Each offset axis falls back to the global default independently.
        let offset = (
            block
                .image_offset_in
                .x
                .map(in_to_pt)
                .unwrap_or(book.default_offset.0),
            block
                .image_offset_in
                .y
                .map(in_to_pt)
                .unwrap_or(book.default_offset.1),
        );

        for index in 0..span {
            let side = match (kind, index) {
                (PageKind::Spread, 0) => Some(SpreadSide::Left),
                (PageKind::Spread, 1) => Some(SpreadSide::Right),
                _ => None,
            };
            let mut text = BTreeMap::new();
            for region in book.regions.keys() {
                let ctx = RefContext {
                    index,
                    slug: &slug,
                    region,
                    side,
                    prefer_inline,
                };
                if let Some(source) = resolver.resolve(block.text.get(region), &ctx) {
                    text.insert(region.clone(), source);
                }
            }
            specs.push(PageSpec {
                slug: slug.clone(),
                sequence_index: index,
                page_number,
                kind,
                side,
                image_path: image_path.clone(),
                image_scale: scale,
                image_offset: offset,
                text,
            });
            page_number += 1;
        }
    }

    log::info!(
        "expanded {} blocks into {} pages",
        blocks.len(),
        specs.len()
    );
    Ok(specs)
}

/// Relative image names join the configured image root; absolute paths
/// pass through untouched.
pub fn resolve_media_path(image_folder: &Path, image_name: &str) -> PathBuf {
    let candidate = PathBuf::from(image_name);
    if candidate.is_absolute() {
        candidate
    } else {
        image_folder.join(candidate)
    }
}
