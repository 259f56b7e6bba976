use super::*;

#[test]
fn tool_id_round_trips_through_str() {
    for id in ToolId::ALL {
        assert_eq!(id.as_str().parse::<ToolId>(), Ok(id));
        assert_eq!(id.to_string(), id.as_str());
    }
}

#[test]
fn tool_id_rejects_unknown_name() {
    let err = "orbit".parse::<ToolId>().unwrap_err();
    assert_eq!(err, UnknownToolId("orbit".into()));
    assert_eq!(err.to_string(), "unknown tool id: orbit");
}

#[test]
fn tool_id_serde_uses_snake_case() {
    assert_eq!(serde_json::to_string(&ToolId::RangeSelect).unwrap(), "\"range_select\"");
    let id: ToolId = serde_json::from_str("\"zoom\"").unwrap();
    assert_eq!(id, ToolId::Zoom);
}

#[test]
fn selection_log_records_picks() {
    let mut log = SelectionLog::default();
    log.select_range(Rect::new(1.0, 2.0, 3.0, 4.0));
    log.hover(Some(Point::new(5.0, 6.0)));
    assert_eq!(log.ranges, vec![Rect::new(1.0, 2.0, 3.0, 4.0)]);
    assert_eq!(log.last_hover, Some(Point::new(5.0, 6.0)));

    log.hover(None);
    assert!(log.last_hover.is_none());
}
