//! Filter and paging vocabulary shared by every [`super::Store`].

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    Eq(JsonValue),
    /// Null-safe inequality: rows where the field is absent also match.
    Neq(JsonValue),
    Gte(JsonValue),
    Lte(JsonValue),
    /// Case-insensitive SQL `LIKE` pattern (`%` and `_` wildcards).
    Like(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Eq(value.into()),
        }
    }

    pub fn neq(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Neq(value.into()),
        }
    }

    pub fn gte(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Gte(value.into()),
        }
    }

    pub fn lte(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Lte(value.into()),
        }
    }

    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Like(pattern.into()),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderDirection {
    Asc,
    #[serde(other)]
    Desc,
}

impl Default for OrderDirection {
    fn default() -> Self {
        OrderDirection::Desc
    }
}

impl OrderDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    pub filters: Vec<Filter>,
    pub order_by: Option<(String, OrderDirection)>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: OrderDirection) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }
}
