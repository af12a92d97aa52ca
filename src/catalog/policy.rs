//! Field allow-lists for a query type.
//!
//! `only` and `exclude` entries are field names, optionally scoped to one
//! capability with a case-insensitive prefix: `filter:age`, `sort:name`,
//! `order:name` (same as `sort:`), `search:email`. Unscoped entries and
//! entries with an unrecognized prefix apply to every capability.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::Capability;

/// A named, configured view over one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryType {
    #[serde(default)]
    pub name: String,
    pub entity: String,
    #[serde(default)]
    pub only: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl QueryType {
    pub fn new(name: &str, entity: &str) -> Self {
        Self {
            name: name.into(),
            entity: entity.into(),
            only: vec![],
            exclude: vec![],
        }
    }

    pub fn only<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn exclude<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(fields.into_iter().map(Into::into));
        self
    }
}

/// `only`/`exclude` entries split by scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ScopedList {
    pub global: BTreeSet<String>,
    pub filter: BTreeSet<String>,
    pub sort: BTreeSet<String>,
    pub search: BTreeSet<String>,
}

impl ScopedList {
    pub fn parse<S: AsRef<str>>(items: &[S]) -> Self {
        let mut list = ScopedList::default();
        for raw in items {
            let entry = raw.as_ref().trim();
            if entry.is_empty() {
                continue;
            }
            let scoped = entry.split_once(':').and_then(|(prefix, name)| {
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                let capability = match prefix.trim().to_ascii_lowercase().as_str() {
                    "filter" => Capability::Filter,
                    "sort" | "order" => Capability::Sort,
                    "search" => Capability::Search,
                    _ => return None,
                };
                Some((capability, name))
            });
            match scoped {
                Some((capability, name)) => {
                    list.scope_mut(capability).insert(name.to_string());
                }
                None => {
                    list.global.insert(entry.to_string());
                }
            }
        }
        list
    }

    pub fn scope(&self, capability: Capability) -> &BTreeSet<String> {
        match capability {
            Capability::Filter => &self.filter,
            Capability::Sort => &self.sort,
            Capability::Search => &self.search,
        }
    }

    fn scope_mut(&mut self, capability: Capability) -> &mut BTreeSet<String> {
        match capability {
            Capability::Filter => &mut self.filter,
            Capability::Sort => &mut self.sort,
            Capability::Search => &mut self.search,
        }
    }
}

/// Intersect with `only` when non-empty, then remove `exclude`.
pub(crate) fn apply(
    base: &BTreeSet<String>,
    only: &BTreeSet<String>,
    exclude: &BTreeSet<String>,
) -> BTreeSet<String> {
    base.iter()
        .filter(|name| only.is_empty() || only.contains(*name))
        .filter(|name| !exclude.contains(*name))
        .cloned()
        .collect()
}

/// Per-capability field sets for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldPolicy {
    pub base: BTreeSet<String>,
    pub filter: BTreeSet<String>,
    pub sort: BTreeSet<String>,
    pub search: BTreeSet<String>,
    pub search_scoped: bool,
}

impl FieldPolicy {
    pub fn new(all_fields: BTreeSet<String>, query_type: &QueryType) -> Self {
        let only = ScopedList::parse(&query_type.only);
        let exclude = ScopedList::parse(&query_type.exclude);

        let base = apply(&all_fields, &only.global, &exclude.global);
        let per = |capability| apply(&base, only.scope(capability), exclude.scope(capability));

        Self {
            filter: per(Capability::Filter),
            sort: per(Capability::Sort),
            search: per(Capability::Search),
            search_scoped: !only.search.is_empty() || !exclude.search.is_empty(),
            base,
        }
    }

    pub fn allows(&self, capability: Capability, name: &str) -> bool {
        match capability {
            Capability::Filter => self.filter.contains(name),
            Capability::Sort => self.sort.contains(name),
            Capability::Search => self.search.contains(name),
        }
    }
}
