//! Access overlay for search results
//!
//! Staff accounts may be bound to a gender and must only see members of
//! that gender. The check looks at the best match alone: if it belongs to
//! the other gender the whole result is withheld, even when other
//! candidates would have been visible.

use crate::search::SearchResult;
use serde::Serialize;

/// Who is asking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    Admin,
    Staff { gender: Option<String> },
}

impl Viewer {
    /// Viewer for a role name as stored by the credential store (`admin` / `user`)
    pub fn from_role(role: &str, gender: Option<String>) -> Self {
        if role.trim().eq_ignore_ascii_case("admin") {
            Viewer::Admin
        } else {
            Viewer::Staff { gender }
        }
    }

    /// Gate a search result for this viewer
    pub fn apply(&self, result: SearchResult) -> SearchOutcome {
        let Viewer::Staff { gender: Some(own) } = self else {
            return SearchOutcome::Visible(result);
        };
        let own = own.trim().to_lowercase();
        if own.is_empty() {
            return SearchOutcome::Visible(result);
        }

        match &result.best {
            Some(best) if best.gender.trim().to_lowercase() != own => {
                tracing::info!(member_id = %best.id, "Search result withheld from restricted viewer");
                SearchOutcome::AccessDenied
            }
            _ => SearchOutcome::Visible(result),
        }
    }
}

/// Search result after the access check
#[derive(Debug, Clone, Serialize)]
pub enum SearchOutcome {
    Visible(SearchResult),
    /// No matches are disclosed
    AccessDenied,
}

impl SearchOutcome {
    pub fn is_denied(&self) -> bool {
        matches!(self, SearchOutcome::AccessDenied)
    }

    /// Candidate locations visible to the viewer; empty when denied
    pub fn matches(&self) -> &[std::path::PathBuf] {
        match self {
            SearchOutcome::Visible(result) => &result.matches,
            SearchOutcome::AccessDenied => &[],
        }
    }
}
