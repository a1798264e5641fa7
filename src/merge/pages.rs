//! Page-level operations used while combining documents.
//!
//! This module handles:
//! - Copying inheritable attributes from the page tree onto each page, so a
//!   page keeps its size and resources once it is moved under a new parent
//! - Page size and rotation lookups
//! - The landscape fix-up applied to every merged page

use std::collections::HashSet;

use lopdf::{Document, Object, ObjectId};

use crate::error::{CaseMergeError, Result};

/// Attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Page rotation angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRotation {
    /// No rotation.
    None,
    /// Rotate 90 degrees clockwise.
    Clockwise90,
    /// Rotate 180 degrees.
    Rotate180,
    /// Rotate 270 degrees clockwise.
    Clockwise270,
}

impl PageRotation {
    /// Normalize a `/Rotate` value; non-multiples of 90 are treated as none.
    pub fn from_degrees(degrees: i64) -> Self {
        match degrees.rem_euclid(360) {
            90 => Self::Clockwise90,
            180 => Self::Rotate180,
            270 => Self::Clockwise270,
            _ => Self::None,
        }
    }

    /// Get rotation as degrees.
    pub fn as_degrees(&self) -> i64 {
        match self {
            Self::None => 0,
            Self::Clockwise90 => 90,
            Self::Rotate180 => 180,
            Self::Clockwise270 => 270,
        }
    }
}

/// Page operations for documents being merged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageNormalizer;

impl PageNormalizer {
    /// Create a new page normalizer.
    pub fn new() -> Self {
        Self
    }

    /// Copy inherited `MediaBox`, `CropBox`, `Resources` and `Rotate` values
    /// onto the page itself. Values the page already sets are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the page or one of its ancestors is not a
    /// dictionary.
    pub fn flatten_inherited(&self, doc: &mut Document, page_id: ObjectId) -> Result<()> {
        let page = doc.get_dictionary(page_id).map_err(|e| page_error(page_id, e))?;

        let mut missing: Vec<&[u8]> = INHERITABLE
            .into_iter()
            .filter(|key| !page.has(key))
            .collect();
        let mut inherited = Vec::new();
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        let mut visited = HashSet::new();

        while let Some(node_id) = parent {
            if missing.is_empty() || !visited.insert(node_id) {
                break;
            }
            let node = doc.get_dictionary(node_id).map_err(|e| page_error(node_id, e))?;

            missing.retain(|key| match node.get(key) {
                Ok(value) => {
                    inherited.push((key.to_vec(), value.clone()));
                    false
                }
                Err(_) => true,
            });
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        }

        if inherited.is_empty() {
            return Ok(());
        }

        let page = doc
            .get_dictionary_mut(page_id)
            .map_err(|e| page_error(page_id, e))?;
        for (key, value) in inherited {
            page.set(key, value);
        }

        Ok(())
    }

    /// Width and height of the page's `MediaBox`, in points.
    pub fn page_size(&self, doc: &Document, page_id: ObjectId) -> Option<(f32, f32)> {
        let page = doc.get_dictionary(page_id).ok()?;
        let media_box = resolve(doc, page.get(b"MediaBox").ok()?)?.as_array().ok()?;
        if media_box.len() < 4 {
            return None;
        }

        let coord = |i: usize| resolve(doc, &media_box[i]).and_then(|o| o.as_float().ok());
        let width = (coord(2)? - coord(0)?).abs();
        let height = (coord(3)? - coord(1)?).abs();
        Some((width, height))
    }

    /// The page's own `/Rotate` value.
    pub fn rotation(&self, doc: &Document, page_id: ObjectId) -> PageRotation {
        let degrees = doc
            .get_dictionary(page_id)
            .ok()
            .and_then(|page| page.get(b"Rotate").ok())
            .and_then(|r| r.as_i64().ok())
            .unwrap_or(0);
        PageRotation::from_degrees(degrees)
    }

    /// Rotate an unrotated landscape page by 90 degrees.
    ///
    /// Returns whether the page was changed. Pages that already carry a
    /// rotation, and pages without a readable size, are left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the page is not a dictionary.
    pub fn fix_orientation(&self, doc: &mut Document, page_id: ObjectId) -> Result<bool> {
        if self.rotation(doc, page_id) != PageRotation::None {
            return Ok(false);
        }

        let landscape = matches!(self.page_size(doc, page_id), Some((w, h)) if w > h);
        if !landscape {
            return Ok(false);
        }

        doc.get_dictionary_mut(page_id)
            .map_err(|e| page_error(page_id, e))?
            .set("Rotate", PageRotation::Clockwise90.as_degrees());

        Ok(true)
    }

    /// Get the number of pages in a document.
    pub fn page_count(&self, doc: &Document) -> usize {
        doc.get_pages().len()
    }
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn page_error(id: ObjectId, err: lopdf::Error) -> CaseMergeError {
    CaseMergeError::merge_failed(format!("Page tree node {} {} is unreadable: {err}", id.0, id.1))
}
