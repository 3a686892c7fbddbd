//! Text library side file.
//!
//! The library supplies reusable text keyed by page slug, independent of
//! the primary page list. Three shapes are accepted:
//!   - a flat mapping of key to per-region references,
//!   - a document with a `pages` list (page skeletons that replace the
//!     inline page list) and an optional `texts` submap,
//!   - a bare list, treated as the `pages` list.
//! The parser is picked by extension: `.json` uses the strict
//! interchange format, everything else is YAML.

use crate::expand::PageBlock;
use crate::resolve::TextRef;
use crate::types::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Default)]
pub struct TextLibrary {
    texts: BTreeMap<String, TextRef>,
    pages: Vec<PageBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LibraryDoc {
    Pages(Vec<PageBlock>),
    File(LibraryFile),
}

#[derive(Debug, Deserialize)]
struct LibraryFile {
    #[serde(default)]
    pages: Vec<PageBlock>,
    #[serde(default)]
    texts: Option<BTreeMap<String, TextRef>>,
    #[serde(flatten)]
    extra: BTreeMap<String, TextRef>,
}

impl TextLibrary {
    pub fn load(path: &Path) -> Result<TextLibrary> {
        let raw = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        // An empty or all-comment file is an empty library, not an error.
        let doc: Option<LibraryDoc> = if is_json {
            serde_json::from_str(&raw)?
        } else {
            serde_yaml::from_str(&raw)?
        };
        TextLibrary::from_doc(doc, path)
    }

    fn from_doc(doc: Option<LibraryDoc>, path: &Path) -> Result<TextLibrary> {
        let (pages, texts) = match doc {
            None => (Vec::new(), BTreeMap::new()),
            Some(LibraryDoc::Pages(pages)) => (pages, BTreeMap::new()),
            Some(LibraryDoc::File(file)) => {
                // An explicit `texts` submap wins; otherwise every other
                // top-level key is a text entry.
                let texts = file.texts.unwrap_or(file.extra);
                (file.pages, texts)
            }
        };
        let mut library = TextLibrary { texts, pages };
        library.merge_page_texts();
        if library.texts.is_empty() && library.pages.is_empty() {
            log::warn!("text library {} is empty", path.display());
        }
        Ok(library)
    }

    /// Fold each page skeleton's inline text into the flat mapping, unless
    /// the slug already has an entry.
    fn merge_page_texts(&mut self) {
        for block in &self.pages {
            let Some(slug) = block.slug.as_deref().filter(|s| !s.is_empty()) else {
                continue;
            };
            if block.text.is_empty() || self.texts.contains_key(slug) {
                continue;
            }
            self.texts
                .insert(slug.to_string(), TextRef::Map(block.text.clone()));
        }
    }

    /// Page skeletons that substitute for the inline page list.
    pub fn pages(&self) -> &[PageBlock] {
        &self.pages
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty() && self.pages.is_empty()
    }

    /// The raw reference stored for (key, region), if any. Entries that
    /// are not mappings have no regions.
    pub fn lookup(&self, key: &str, region: &str) -> Option<&TextRef> {
        match self.texts.get(key)? {
            TextRef::Map(regions) => regions.get(region),
            _ => None,
        }
    }

    /// Build a library directly from parts; used by tests.
    pub fn from_parts(texts: BTreeMap<String, TextRef>, pages: Vec<PageBlock>) -> TextLibrary {
        let mut library = TextLibrary { texts, pages };
        library.merge_page_texts();
        library
    }
}
