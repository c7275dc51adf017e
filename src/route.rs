// External Crate Imports
use urlencoding::encode;

// Local Crate Imports
use crate::{filter::Filter, sort::Sort};

// Public API ==========================================================================================================

/// The navigation state of the files page. Everything needed to reproduce a view lives here, so a route can be
/// bookmarked or shared
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct FilesRoute {
    pub filter: Filter,
    pub sort: Sort,
}

impl FilesRoute {
    #[must_use]
    pub fn from_params(filter: &str, sort: &str) -> Self {
        Self {
            filter: Filter::parse(filter),
            sort: Sort::parse(sort),
        }
    }

    #[must_use]
    pub fn filter_param(&self) -> String {
        self.filter.to_string()
    }

    #[must_use]
    pub fn sort_param(&self) -> String {
        self.sort.to_param()
    }

    #[must_use]
    pub fn with_filter(&self, filter: &str) -> Self {
        Self {
            filter: Filter::parse(filter),
            sort: self.sort.clone(),
        }
    }

    #[must_use]
    pub fn with_sort_toggled(&self, attribute: &str) -> Self {
        Self {
            filter: self.filter.clone(),
            sort: self.sort.toggle(attribute),
        }
    }

    /// The query string for this route, leaving out anything that's still at its default
    #[must_use]
    pub fn to_query(&self) -> String {
        let filter = self.filter_param();
        let sort = self.sort_param();

        [("filter", filter), ("sort", sort)]
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| format!("{key}={}", encode(&value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

// Unit Tests ==========================================================================================================
