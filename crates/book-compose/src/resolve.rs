//! Text reference resolution.
//!
//! A page block's `text` entries accept several shapes: a bare string, a
//! list indexed by sub-page, a mapping with an explicit mode key, or a
//! pointer into the shared text library. This module collapses any of
//! those into a single [`TextSource`] or "no text". Malformed shapes are
//! not errors; they resolve to no text.

use crate::library::TextLibrary;
use crate::types::{SpreadSide, TextSource};
use serde::Deserialize;
use std::collections::BTreeMap;

/// A raw text reference as written in config or library files.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TextRef {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<TextRef>),
    Map(BTreeMap<String, TextRef>),
}

impl TextRef {
    /// The scalar payload, stringified. Nulls, lists and mappings have none.
    pub fn scalar_string(&self) -> Option<String> {
        match self {
            TextRef::Bool(value) => Some(value.to_string()),
            TextRef::Int(value) => Some(value.to_string()),
            TextRef::Float(value) => Some(value.to_string()),
            TextRef::Str(value) => Some(value.clone()),
            TextRef::Null | TextRef::List(_) | TextRef::Map(_) => None,
        }
    }
}

/// Everything the cascade needs to know about the sub-page being resolved.
#[derive(Debug, Clone, Copy)]
pub struct RefContext<'a> {
    /// Zero-based position within the block's span
    pub index: usize,
    /// Owning page slug, the default library key
    pub slug: &'a str,
    pub region: &'a str,
    pub side: Option<SpreadSide>,
    /// Bare strings are literal content when set, file names when not.
    /// True exactly when the page list came from the text library.
    pub prefer_inline: bool,
}

pub struct TextResolver<'a> {
    library: &'a TextLibrary,
}

impl<'a> TextResolver<'a> {
    pub fn new(library: &'a TextLibrary) -> Self {
        Self { library }
    }

    /// Resolve a raw reference. An absent reference or an explicit null
    /// falls through to the library keyed by the page slug; anything else
    /// runs the coercion cascade.
    pub fn resolve(&self, reference: Option<&TextRef>, ctx: &RefContext) -> Option<TextSource> {
        match reference {
            None | Some(TextRef::Null) => self.from_library(ctx.slug, ctx),
            Some(value) => self.coerce(value, ctx),
        }
    }

    fn coerce(&self, value: &TextRef, ctx: &RefContext) -> Option<TextSource> {
        match value {
            TextRef::List(items) => {
                // Clamp past-the-end indices to the last element so a
                // trailing value serves every remaining sub-page.
                let target = items.get(ctx.index).or_else(|| items.last())?;
                self.coerce(target, ctx)
            }
            TextRef::Map(map) => {
                if let Some(inline) = map.get("inline") {
                    return inline.scalar_string().map(TextSource::Inline);
                }
                if let Some(file) = map.get("file") {
                    return file.scalar_string().map(TextSource::File);
                }
                if let Some(library) = map.get("library") {
                    let key = library
                        .scalar_string()
                        .filter(|k| !k.is_empty())
                        .unwrap_or_else(|| ctx.slug.to_string());
                    return self.from_library(&key, ctx);
                }
                if map.contains_key("left") || map.contains_key("right") {
                    let selected = ctx
                        .side
                        .and_then(|side| map.get(side.as_str()))
                        .or_else(|| map.get("default"))?;
                    return self.coerce(selected, ctx);
                }
                None
            }
            TextRef::Str(text) => {
                if let Some(rest) = text.strip_prefix("@library") {
                    let key = rest
                        .strip_prefix(':')
                        .filter(|k| !k.is_empty())
                        .map(str::to_string)
                        .unwrap_or_else(|| ctx.slug.to_string());
                    return self.from_library(&key, ctx);
                }
                if ctx.prefer_inline {
                    Some(TextSource::Inline(text.clone()))
                } else {
                    Some(TextSource::File(text.clone()))
                }
            }
            scalar => scalar.scalar_string().map(TextSource::Inline),
        }
    }

    fn from_library(&self, key: &str, ctx: &RefContext) -> Option<TextSource> {
        let value = self.library.lookup(key, ctx.region)?;
        // Library content is literal unless it nests an explicit `file`.
        let lib_ctx = RefContext {
            prefer_inline: true,
            ..*ctx
        };
        self.coerce(value, &lib_ctx)
    }
}
