use crate::entities::{resources, updates};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{ColumnTrait, Condition};
use std::collections::HashMap;

/// Structured predicate over `Resource` attributes, parsed from whitelisted
/// query-string keys. Unknown keys are ignored; the recognized filters are
/// ANDed together and applied at the storage layer.
///
/// Whitelist: `name` (prefix match), `slug` (equality), `author` (equality),
/// `version` (label carried by any of the resource's updates),
/// `createdAfter` / `createdBefore` (RFC 3339 range on creation time).
#[derive(Debug, Clone, Default)]
pub struct ResourceFilter {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub author: Option<i32>,
    pub version: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

impl ResourceFilter {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let parse_ts = |key: &str| {
            params
                .get(key)
                .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
                .map(|v| v.with_timezone(&Utc))
        };

        Self {
            name: params.get("name").cloned(),
            slug: params.get("slug").cloned(),
            author: params.get("author").and_then(|v| v.parse().ok()),
            version: params.get("version").cloned(),
            created_after: parse_ts("createdAfter"),
            created_before: parse_ts("createdBefore"),
        }
    }

    /// Builds the conjunction to AND into the category query.
    pub fn condition(&self) -> Condition {
        let mut cond = Condition::all();

        if let Some(name) = &self.name {
            cond = cond.add(resources::Column::Name.starts_with(name));
        }
        if let Some(slug) = &self.slug {
            cond = cond.add(resources::Column::Slug.eq(slug));
        }
        if let Some(author) = self.author {
            cond = cond.add(resources::Column::Author.eq(author));
        }
        if let Some(version) = &self.version {
            // The versions column holds a JSON string array, so a label
            // match looks for the quoted form.
            let needle = format!("%\"{}\"%", version.replace(['%', '_'], ""));
            let owning = Query::select()
                .column(updates::Column::ResourceId)
                .from(updates::Entity)
                .and_where(Expr::col(updates::Column::Versions).like(needle))
                .to_owned();
            cond = cond.add(resources::Column::Id.in_subquery(owning));
        }
        if let Some(after) = self.created_after {
            cond = cond.add(resources::Column::CreatedAt.gte(after));
        }
        if let Some(before) = self.created_before {
            cond = cond.add(resources::Column::CreatedAt.lte(before));
        }

        cond
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let filter = ResourceFilter::from_params(&params(&[
            ("rank", "5"),
            ("order", "downloads"),
            ("name", "World"),
        ]));
        assert_eq!(filter.name.as_deref(), Some("World"));
        assert!(filter.slug.is_none());
        assert!(filter.author.is_none());
    }

    #[test]
    fn test_author_must_be_numeric() {
        let filter = ResourceFilter::from_params(&params(&[("author", "mallory")]));
        assert!(filter.author.is_none());

        let filter = ResourceFilter::from_params(&params(&[("author", "7")]));
        assert_eq!(filter.author, Some(7));
    }

    #[test]
    fn test_timestamps_parse_rfc3339_only() {
        let filter = ResourceFilter::from_params(&params(&[
            ("createdAfter", "2024-01-01T00:00:00Z"),
            ("createdBefore", "yesterday"),
        ]));
        assert!(filter.created_after.is_some());
        assert!(filter.created_before.is_none());
    }

    #[test]
    fn test_no_params_yields_unconstrained_filter() {
        let filter = ResourceFilter::from_params(&HashMap::new());
        assert!(filter.name.is_none());
        assert!(filter.slug.is_none());
        assert!(filter.author.is_none());
        assert!(filter.version.is_none());
        assert!(filter.created_after.is_none());
        assert!(filter.created_before.is_none());
    }
}
