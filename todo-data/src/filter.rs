use crate::page::Pageable;
use crate::value::SqlValue;

/// Sort direction for an [`OrderBy`] directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// An ordering directive: field name plus direction.
///
/// Whether the field actually exists on the entity is checked by the service
/// against [`Entity::columns`](crate::Entity::columns); an unknown field is
/// logged and the query proceeds unordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }

    /// Parse a `field.asc` / `field.desc` token; a bare field sorts
    /// ascending. An unrecognized direction is logged and dropped, so the
    /// query runs unordered rather than failing.
    pub fn parse(raw: &str) -> Option<Self> {
        let (field, direction) = match raw.split_once('.') {
            Some((field, direction)) => (field, direction),
            None => (raw, "asc"),
        };
        if field.is_empty() {
            tracing::warn!(raw, "empty order_by field, ignoring ordering");
            return None;
        }
        match direction {
            "asc" => Some(OrderBy::asc(field)),
            "desc" => Some(OrderBy::desc(field)),
            other => {
                tracing::warn!(direction = other, "invalid sort direction, ignoring ordering");
                None
            }
        }
    }
}

/// Query criteria assembled per call: ANDed equality filters, an optional
/// ordering directive, and optional offset/limit bounds.
///
/// Every knob is additive — an absent knob means "no constraint", never a
/// default constraint.
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    pub(crate) filters: Vec<(String, SqlValue)>,
    pub(crate) order_by: Option<OrderBy>,
    pub(crate) offset: Option<u64>,
    pub(crate) limit: Option<u64>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an `attribute == value` predicate.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by = Some(order);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Apply a page's offset and limit in one step.
    pub fn page(self, pageable: &Pageable) -> Self {
        self.offset(pageable.offset()).limit(pageable.limit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_with_direction() {
        assert_eq!(OrderBy::parse("created_at.desc"), Some(OrderBy::desc("created_at")));
        assert_eq!(OrderBy::parse("title.asc"), Some(OrderBy::asc("title")));
    }

    #[test]
    fn parse_bare_field_defaults_ascending() {
        assert_eq!(OrderBy::parse("title"), Some(OrderBy::asc("title")));
    }

    #[test]
    fn parse_invalid_direction_is_dropped() {
        assert_eq!(OrderBy::parse("title.sideways"), None);
        assert_eq!(OrderBy::parse(".desc"), None);
    }

    #[test]
    fn criteria_is_additive() {
        let criteria = Criteria::new().eq("user_id", 7).limit(10);
        assert_eq!(criteria.filters.len(), 1);
        assert_eq!(criteria.limit, Some(10));
        assert_eq!(criteria.offset, None);
        assert!(criteria.order_by.is_none());
    }
}
