//! Typed query parameters for the generic CRUD endpoints

use crate::config::PaginationConfig;
use crate::core::error::Result;
use crate::core::filter::Filter;
use crate::core::order::{OrderBy, parse_order};
use crate::core::page::Pageable;
use crate::core::relation::{Relation, parse_relations};
use serde::Deserialize;
use uuid::Uuid;

/// Query parameters accepted by the list-shaped endpoints
///
/// Paging parameters the client omits fall back to the configured
/// defaults. The string parameters stay raw here and parse on demand, so a
/// malformed filter surfaces through the error mapping instead of an
/// extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub filter: Option<String>,
    pub order: Option<String>,
    pub relations: Option<String>,
}

impl ListQuery {
    /// Resolve paging against the configured default and maximum sizes
    pub fn pageable(&self, pagination: &PaginationConfig) -> Pageable {
        let size = self.size.unwrap_or(pagination.default_size);
        Pageable::new(self.page.unwrap_or(1), pagination.clamp(size))
    }

    pub fn filter(&self) -> Result<Option<Filter>> {
        self.filter.as_deref().map(Filter::parse).transpose()
    }

    pub fn order(&self) -> Result<Vec<OrderBy>> {
        match self.order.as_deref() {
            Some(raw) => parse_order(raw),
            None => Ok(Vec::new()),
        }
    }

    pub fn relations(&self) -> Vec<Relation> {
        self.relations
            .as_deref()
            .map(parse_relations)
            .unwrap_or_default()
    }
}

/// Query parameter for the existence probe
#[derive(Debug, Clone, Deserialize)]
pub struct ExistsQuery {
    pub id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::Comparator;
    use axum::extract::Query;
    use axum::http::Uri;

    fn parse_uri(uri: &str) -> ListQuery {
        let uri: Uri = uri.parse().expect("uri should parse");
        Query::<ListQuery>::try_from_uri(&uri)
            .expect("query should deserialize")
            .0
    }

    #[test]
    fn test_omitted_paging_uses_configured_defaults() {
        let query = parse_uri("http://host/things");
        assert!(query.page.is_none());
        assert!(query.size.is_none());
        assert!(query.filter.is_none());
        assert!(query.order.is_none());
        assert!(query.relations.is_none());

        let pageable = query.pageable(&PaginationConfig::default());
        assert_eq!(pageable.page(), 1);
        assert_eq!(pageable.size(), 10);
    }

    #[test]
    fn test_reads_explicit_paging() {
        let query = parse_uri("http://host/things?page=3&size=25");
        let pageable = query.pageable(&PaginationConfig::default());
        assert_eq!(pageable.page(), 3);
        assert_eq!(pageable.size(), 25);
    }

    #[test]
    fn test_oversized_page_request_is_clamped() {
        let query = parse_uri("http://host/things?size=1000000");
        let pageable = query.pageable(&PaginationConfig::default());
        assert_eq!(pageable.size(), 500);

        let tight = PaginationConfig {
            default_size: 5,
            max_size: 20,
        };
        assert_eq!(parse_uri("http://host/things").pageable(&tight).size(), 5);
        assert_eq!(
            parse_uri("http://host/things?size=50").pageable(&tight).size(),
            20
        );
    }

    #[test]
    fn test_non_numeric_page_is_rejected() {
        let uri: Uri = "http://host/things?page=abc".parse().unwrap();
        assert!(Query::<ListQuery>::try_from_uri(&uri).is_err());
    }

    #[test]
    fn test_parses_filter_and_order_on_demand() {
        let query = parse_uri("http://host/things?filter=name:eq:ada&order=name:asc");
        let filter = query.filter().expect("filter should parse").expect("filter present");
        assert_eq!(
            filter,
            Filter::leaf("name", Comparator::Eq, "ada")
        );
        let order = query.order().expect("order should parse");
        assert_eq!(order, [OrderBy::asc("name")]);
    }

    #[test]
    fn test_malformed_filter_surfaces_as_error() {
        let query = parse_uri("http://host/things?filter=garbage");
        assert!(query.filter().is_err());

        let query = parse_uri("http://host/things?order=name");
        assert!(query.order().is_err());
    }

    #[test]
    fn test_relations_split_permissively() {
        let query = parse_uri("http://host/things?relations=tags,author");
        let relations = query.relations();
        assert_eq!(relations.len(), 2);
        assert_eq!(relations[0].name, "tags");
        assert_eq!(relations[1].name, "author");

        assert!(parse_uri("http://host/things").relations().is_empty());
    }
}
