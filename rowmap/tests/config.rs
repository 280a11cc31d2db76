use rowmap::TableConfig;

#[test]
fn test_defaults() {
    let config = TableConfig::default();
    assert!(!config.virtual_items);
    assert_eq!(config.growth_chunk, 4);
    assert!(config.trim_on_redraw);
}

#[test]
fn test_partial_json_fills_defaults() {
    let config: TableConfig = serde_json::from_str(r#"{ "virtual_items": true }"#).unwrap();
    assert!(config.virtual_items);
    assert_eq!(config.growth_chunk, 4);
    assert!(config.trim_on_redraw);
}

#[test]
fn test_zero_chunk_is_clamped() {
    let config: TableConfig = serde_json::from_str(r#"{ "growth_chunk": 0 }"#).unwrap();
    assert_eq!(config.chunk(), 1);
    assert_eq!(TableConfig::new().with_growth_chunk(0).growth_chunk, 1);
}

#[test]
fn test_serializes_all_fields() {
    let json = serde_json::to_value(TableConfig::on_demand().with_trim_on_redraw(false)).unwrap();
    assert_eq!(json["virtual_items"], true);
    assert_eq!(json["growth_chunk"], 4);
    assert_eq!(json["trim_on_redraw"], false);
}
