//! Resolution of a site URL and notebook name into the notebook's sections.
//!
//! Lookups run strictly in sequence: site (optional), notebook listing,
//! section listing. Each listing reads a single page of [`PAGE_SIZE`]
//! items; further pages are not followed.

use serde::Deserialize;
use url::Url;

use onenote_core::{
    Collection, Notebook, PAGE_SIZE, Scope, Section, SectionSummary, SiteId, display_name_matches,
};

use crate::error::{GraphError, GraphResult};
use crate::fetch::Fetcher;
use crate::token::AccessToken;

/// Default document-graph base URL.
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Message of the not-found error raised when no notebook matches.
pub const NOTEBOOK_NOT_FOUND: &str = "Notebook not found";

/// Site lookup response. Only the id is used.
#[derive(Debug, Deserialize)]
struct SiteRecord {
    id: Option<String>,
}

/// Turns human-supplied names into document-graph resources.
#[derive(Debug, Clone)]
pub struct Resolver {
    fetcher: Fetcher,
    graph_base: String,
}

impl Resolver {
    /// Create a resolver rooted at `graph_base` (e.g. `https://graph.microsoft.com/v1.0`).
    pub fn new(fetcher: Fetcher, graph_base: impl Into<String>) -> Self {
        let graph_base = graph_base.into().trim_end_matches('/').to_string();
        Self {
            fetcher,
            graph_base,
        }
    }

    /// List the sections of the notebook named `notebook_name`, optionally
    /// within the site identified by `site_url`.
    pub async fn resolve(
        &self,
        site_url: Option<&str>,
        notebook_name: &str,
        token: &AccessToken,
    ) -> GraphResult<Vec<SectionSummary>> {
        let scope = self.resolve_scope(site_url, token).await?;
        let notebook = self.find_notebook(&scope, notebook_name, token).await?;
        let sections = self.list_sections(&scope, &notebook, token).await?;

        Ok(sections
            .iter()
            .map(|section| SectionSummary::from_parts(&notebook, section))
            .collect())
    }

    /// Determine the resource space for the lookups.
    ///
    /// An absent or empty site URL selects the caller's personal space.
    ///
    /// # Errors
    ///
    /// - [`GraphError::Validation`] if `site_url` is not an absolute URL
    /// - Any fetch error from the site lookup, unchanged
    pub async fn resolve_scope(
        &self,
        site_url: Option<&str>,
        token: &AccessToken,
    ) -> GraphResult<Scope> {
        let Some(site_url) = site_url.filter(|s| !s.is_empty()) else {
            return Ok(Scope::Personal);
        };

        let path = site_path(site_url)?;
        let url = format!("{}/sites/root:{}", self.graph_base, path);
        let site: SiteRecord = self.fetcher.get_json(&url, token).await?;

        let id = site
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| GraphError::Decode(format!("site lookup for {path} returned no id")))?;

        tracing::debug!(site_id = %id, path = %path, "Resolved site");
        Ok(Scope::Site(SiteId(id)))
    }

    /// Find the notebook whose display name matches `name`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if no notebook in the first page
    /// matches; listing failures propagate unchanged. Records without an id
    /// never match.
    pub async fn find_notebook(
        &self,
        scope: &Scope,
        name: &str,
        token: &AccessToken,
    ) -> GraphResult<Notebook> {
        let url = self.page_url(&scope.notebooks_path());
        let notebooks: Collection<Notebook> = self.fetcher.get_json(&url, token).await?;

        notebooks
            .value
            .into_iter()
            .filter(Notebook::has_id)
            .find(|nb| display_name_matches(name, &nb.display_name))
            .ok_or_else(|| GraphError::NotFound(NOTEBOOK_NOT_FOUND.to_string()))
    }

    /// List the first page of sections of `notebook` in `scope`.
    ///
    /// Section records without an id are skipped.
    pub async fn list_sections(
        &self,
        scope: &Scope,
        notebook: &Notebook,
        token: &AccessToken,
    ) -> GraphResult<Vec<Section>> {
        let url = self.page_url(&scope.sections_path(&notebook.id));
        let sections: Collection<Section> = self.fetcher.get_json(&url, token).await?;
        Ok(sections.value.into_iter().filter(Section::has_id).collect())
    }

    fn page_url(&self, relative: &str) -> String {
        format!("{}/{}?$top={}", self.graph_base, relative, PAGE_SIZE)
    }
}

/// Extract the path component of a site URL (e.g. `/sites/TetonSales`).
fn site_path(site_url: &str) -> GraphResult<String> {
    let url = Url::parse(site_url)
        .map_err(|e| GraphError::Validation(format!("invalid siteUrl '{site_url}': {e}")))?;

    if url.cannot_be_a_base() {
        return Err(GraphError::Validation(format!(
            "invalid siteUrl '{site_url}': URL has no path"
        )));
    }

    Ok(url.path().to_string())
}
