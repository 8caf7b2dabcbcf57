//! Core data types for notebook and section resolution.
//!
//! Remote records mirror the document-graph JSON shape (camelCase,
//! wrapped in a `value` collection envelope). The response row
//! `SectionSummary` is a read-only, denormalized copy built from a
//! resolved notebook and one of its sections.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of items requested per listing. Only the first page
/// is ever considered.
pub const PAGE_SIZE: usize = 200;

// ============================================================================
// Remote Records
// ============================================================================

/// List envelope returned by the document graph (`{ "value": [...] }`).
///
/// A missing or `null` `value` reads as an empty page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Collection<T> {
    /// Items in the current page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { value: Vec::new() }
    }
}

/// A OneNote notebook as listed by the document graph.
///
/// Records without an `id` decode with an empty one and are never matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notebook {
    /// Server-assigned notebook identifier.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// Human-readable name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_name: String,
}

impl Notebook {
    /// Whether the record carries a usable identifier.
    #[must_use]
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }
}

/// A OneNote section as listed by the document graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Server-assigned section identifier.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// Human-readable name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_name: String,
}

impl Section {
    /// Whether the record carries a usable identifier.
    #[must_use]
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Read an explicit JSON `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Response Row
// ============================================================================

/// One row of the list-sections response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSummary {
    pub section_id: String,
    pub section_name: String,
    pub notebook_id: String,
    pub notebook_name: String,
}

impl SectionSummary {
    /// Build a row from a section and the notebook it was listed under.
    #[must_use]
    pub fn from_parts(notebook: &Notebook, section: &Section) -> Self {
        Self {
            section_id: section.id.clone(),
            section_name: section.display_name.clone(),
            notebook_id: notebook.id.clone(),
            notebook_name: notebook.display_name.clone(),
        }
    }
}

// ============================================================================
// Resolution Scope
// ============================================================================

/// Identifier of a site, as returned by the site lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(pub String);

impl SiteId {
    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resource space that notebook and section lookups are anchored to.
///
/// Both listings derive their path from the same `Scope`, so a notebook
/// and its sections are always read from the same resource space.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scope {
    /// The calling user's personal resource space.
    #[default]
    Personal,
    /// A specific site's resource space.
    Site(SiteId),
}

impl Scope {
    /// Path prefix for this scope, relative to the graph base URL.
    #[must_use]
    pub fn prefix(&self) -> String {
        match self {
            Self::Personal => "me".to_string(),
            Self::Site(id) => format!("sites/{id}"),
        }
    }

    /// Relative path of the notebook listing for this scope.
    #[must_use]
    pub fn notebooks_path(&self) -> String {
        format!("{}/onenote/notebooks", self.prefix())
    }

    /// Relative path of the section listing of `notebook_id` for this scope.
    #[must_use]
    pub fn sections_path(&self, notebook_id: &str) -> String {
        format!("{}/{notebook_id}/sections", self.notebooks_path())
    }
}

// ============================================================================
// Matching
// ============================================================================

/// Returns true when `candidate` names the notebook the caller asked for.
///
/// Both sides are trimmed and compared case-insensitively.
#[must_use]
pub fn display_name_matches(requested: &str, candidate: &str) -> bool {
    requested.trim().to_lowercase() == candidate.trim().to_lowercase()
}

// ============================================================================
// Tests
// ============================================================================
