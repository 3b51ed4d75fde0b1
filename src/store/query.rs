use serde_json::Value;

use super::api::TIMESTAMP_FIELD;

/// Ordering direction for a live query or one-shot fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Direction of a set-membership write. Adding a present member or removing
/// an absent one is a no-op on the store side, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipOp {
    Add,
    Remove,
}

/// Equality filter on a single document field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub equals: Value,
}

/// Data-set selector: collection, optional filter, ordering, optional limit.
/// The limit keeps the head of the ordered result.
#[derive(Debug, Clone)]
pub struct Query {
    pub collection: String,
    pub filter: Option<FieldFilter>,
    pub order_by: String,
    pub direction: Direction,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filter: None,
            order_by: TIMESTAMP_FIELD.to_string(),
            direction: Direction::Desc,
            limit: None,
        }
    }

    pub fn filter_eq(mut self, field: impl Into<String>, equals: impl Into<Value>) -> Self {
        self.filter = Some(FieldFilter {
            field: field.into(),
            equals: equals.into(),
        });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = field.into();
        self.direction = direction;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
