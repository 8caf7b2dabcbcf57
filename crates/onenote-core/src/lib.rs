//! onenote-core: Core types for resolving OneNote notebooks and sections
//!
//! This crate provides:
//! - Remote record types (Notebook, Section) as returned by the document graph
//! - The response row (SectionSummary) with notebook fields denormalized
//! - Resolution scope (personal or site-scoped resource space)
//! - Display-name matching rules

pub mod types;

// Re-export commonly used types at crate root for convenience
pub use types::{
    Collection, Notebook, PAGE_SIZE, Scope, Section, SectionSummary, SiteId,
    display_name_matches,
};
