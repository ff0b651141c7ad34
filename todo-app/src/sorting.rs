use todo_data::OrderBy;

/// Map the API-facing `createdAt|updatedAt(.asc|.desc)?` sort parameter onto
/// the audit-timestamp columns. Anything else is logged and ignored, so the
/// query proceeds unordered.
pub fn timestamp_order_by(raw: &str) -> Option<OrderBy> {
    let order = OrderBy::parse(raw)?;
    let field = match order.field.as_str() {
        "createdAt" => "created_at",
        "updatedAt" => "updated_at",
        other => {
            tracing::warn!(field = other, "unsupported sort field, ignoring ordering");
            return None;
        }
    };
    Some(OrderBy {
        field: field.to_string(),
        direction: order.direction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_data::Direction;

    #[test]
    fn maps_camel_case_fields_to_columns() {
        let order = timestamp_order_by("createdAt.desc").unwrap();
        assert_eq!(order.field, "created_at");
        assert_eq!(order.direction, Direction::Desc);

        let order = timestamp_order_by("updatedAt").unwrap();
        assert_eq!(order.field, "updated_at");
        assert_eq!(order.direction, Direction::Asc);
    }

    #[test]
    fn rejects_unknown_fields_and_directions() {
        assert!(timestamp_order_by("title.asc").is_none());
        assert!(timestamp_order_by("createdAt.sideways").is_none());
    }
}
