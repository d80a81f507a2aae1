use model::records::record::Record;

/// Decodes one input line. Blank lines yield `None`. A line is either a JSON
/// object or a `[timestamp, object]` pair, in which case the timestamp is
/// dropped.
pub fn parse_line(line: &str) -> Result<Option<Record>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let json: serde_json::Value = serde_json::from_str(line).map_err(|e| e.to_string())?;
    let json = match json {
        serde_json::Value::Array(mut pair) if pair.len() == 2 && pair[1].is_object() => pair.remove(1),
        other => other,
    };

    Record::from_json(json)
        .map(Some)
        .map_err(|kind| format!("expected a JSON object, got {kind}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::core::value::Value;

    #[test]
    fn test_object_line() {
        let record = parse_line(r#"{"id": 7, "tags": {"env": "prod"}}"#).unwrap().unwrap();
        assert_eq!(record.get("id"), Some(&Value::Int(7)));
        assert!(record.get("tags").unwrap().is_composite());
    }

    #[test]
    fn test_timestamped_pair() {
        let record = parse_line(r#"[1700000000.5, {"log": "hello"}]"#).unwrap().unwrap();
        assert_eq!(record.get("log"), Some(&Value::from("hello")));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_blank_and_invalid_lines() {
        assert!(parse_line("   ").unwrap().is_none());
        assert!(parse_line("{not json").is_err());
        assert_eq!(
            parse_line("[1, 2, 3]").unwrap_err(),
            "expected a JSON object, got array"
        );
    }
}
