//! The query specification a client sends.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CompileResult;
use crate::filter::FilterNode;
use crate::search::SearchPaths;
use crate::sort::{parse_sort, SortField, SortKey};

/// Filters as JSON text (query-string form) or an already-parsed tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterInput {
    Json(String),
    Tree(Value),
}

/// Sort as `field[:dir],...` text or a list of `{field, direction}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortInput {
    Text(String),
    Fields(Vec<SortField>),
}

/// Filter, sort and search parameters for one list request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<FilterInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_fields: Option<String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filters(mut self, json: &str) -> Self {
        self.filters = Some(FilterInput::Json(json.into()));
        self
    }

    pub fn with_filter_tree(mut self, tree: Value) -> Self {
        self.filters = Some(FilterInput::Tree(tree));
        self
    }

    pub fn with_sort(mut self, sort: &str) -> Self {
        self.sort = Some(SortInput::Text(sort.into()));
        self
    }

    pub fn with_sort_fields(mut self, fields: Vec<SortField>) -> Self {
        self.sort = Some(SortInput::Fields(fields));
        self
    }

    pub fn with_search(mut self, term: &str) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn with_search_fields(mut self, fields: &str) -> Self {
        self.search_fields = Some(fields.into());
        self
    }

    /// The parsed filter tree; `None` when absent, blank or `null`.
    pub fn filter_tree(&self) -> CompileResult<Option<FilterNode>> {
        match &self.filters {
            None | Some(FilterInput::Tree(Value::Null)) => Ok(None),
            Some(FilterInput::Json(raw)) if raw.trim().is_empty() => Ok(None),
            Some(FilterInput::Json(raw)) => FilterNode::parse_str(raw).map(Some),
            Some(FilterInput::Tree(tree)) => FilterNode::parse(tree).map(Some),
        }
    }

    pub fn sort_keys(&self) -> CompileResult<Vec<SortKey>> {
        match &self.sort {
            None => Ok(vec![]),
            Some(SortInput::Text(raw)) => parse_sort(raw),
            Some(SortInput::Fields(fields)) => fields.iter().map(SortKey::from_field).collect(),
        }
    }

    pub fn search_paths(&self) -> CompileResult<Option<SearchPaths>> {
        self.search_fields
            .as_deref()
            .map(SearchPaths::parse)
            .transpose()
            .map(|paths| paths.filter(|p| !p.is_empty()))
    }
}
