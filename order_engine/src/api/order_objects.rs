//! Parameter objects for the read path.

use serde::{Deserialize, Serialize};

use crate::db_types::{OrderId, OrderStatusType};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// A window into a result set. Deserializes directly from query strings, so every field is
/// optional; [`Pagination::offset`] and [`Pagination::limit`] apply the defaults and clamp the
/// page size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<SortOrder>,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn sort(&self) -> SortOrder {
        self.sort.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQueryFilter {
    pub order_id: Option<OrderId>,
    pub status: Option<OrderStatusType>,
}

impl OrderQueryFilter {
    pub fn with_status(status: OrderStatusType) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.order_id.is_none() && self.status.is_none()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        let p = Pagination::default();
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(p.sort(), SortOrder::Desc);
        let p = Pagination { offset: Some(-5), limit: Some(10_000), sort: Some(SortOrder::Asc) };
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), MAX_PAGE_SIZE);
        assert_eq!(p.sort(), SortOrder::Asc);
    }

    #[test]
    fn pagination_deserializes_from_a_query_string() {
        let p: Pagination = serde_json::from_str(r#"{"limit": 5, "sort": "asc"}"#).unwrap();
        assert_eq!(p.limit(), 5);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.sort(), SortOrder::Asc);
    }
}
