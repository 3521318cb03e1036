#[cfg(test)]
mod tests {
    use crate::core::domain::{Direction, TravelSpeeds};
    use crate::parsing::json_parser::{parse_corridor_json, parse_corridor_json_str};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CORRIDOR: &str = r#"{
        "cycleTime": 100,
        "speeds": { "upstreamKmh": 50, "downstreamKmh": 45 },
        "intersections": [
            {
                "name": "Main St",
                "distance": 0,
                "greenPhases": [
                    { "direction": "upstream", "startTime": 0, "duration": 40 },
                    { "direction": "downstream", "startTime": 50, "duration": 35 }
                ]
            },
            {
                "name": "Oak Ave",
                "distance": 300,
                "cycleTime": 90,
                "upstreamSpeed": 40,
                "offset": 12.5,
                "greenPhases": [
                    { "direction": "upstream", "startTime": 5, "duration": 30 }
                ]
            }
        ]
    }"#;

    /// Test parsing a full corridor document
    #[test]
    fn test_parse_full_document() {
        let corridor = parse_corridor_json_str(CORRIDOR).expect("should parse");

        assert_eq!(corridor.len(), 2);
        assert_eq!(corridor.cycle_time, Some(100.0));
        assert_eq!(corridor.speeds, Some(TravelSpeeds::new(50.0, 45.0)));

        let oak = &corridor.intersections[1];
        assert_eq!(oak.name.as_deref(), Some("Oak Ave"));
        assert_eq!(oak.cycle_time, Some(90.0));
        assert_eq!(oak.upstream_speed, Some(40.0));
        assert_eq!(oak.offset, 12.5);
        assert_eq!(oak.phase_count(Direction::Upstream), 1);
        assert_eq!(oak.phase_count(Direction::Downstream), 0);
        assert_eq!(corridor.intersections[0].offset, 0.0);
    }

    /// Test parsing a bare array of intersections
    #[test]
    fn test_parse_bare_array() {
        let json = r#"[
            { "distance": 0, "cycleTime": 60 },
            { "distance": 150, "cycleTime": 60 }
        ]"#;

        let corridor = parse_corridor_json_str(json).unwrap();
        assert_eq!(corridor.len(), 2);
        assert_eq!(corridor.cycle_time, None);
        assert!(corridor.intersections[0].green_phases.is_empty());
    }

    /// Test the legacy key and a single speed value
    #[test]
    fn test_parse_legacy_key_and_single_speed() {
        let json = r#"{
            "nodes": [{ "distance": 0 }, { "distance": 100 }],
            "speed": 30
        }"#;

        let corridor = parse_corridor_json_str(json).unwrap();
        assert_eq!(corridor.len(), 2);
        assert_eq!(corridor.speeds, Some(TravelSpeeds::uniform(30.0)));
    }

    /// Test that a separate offsets array is applied
    #[test]
    fn test_parse_offsets_array() {
        let json = r#"{
            "intersections": [{ "distance": 0 }, { "distance": 100 }, { "distance": 250 }],
            "offsets": [0, 14, 33]
        }"#;

        let corridor = parse_corridor_json_str(json).unwrap();
        assert_eq!(corridor.offsets(), vec![0.0, 14.0, 33.0]);
    }

    #[test]
    fn test_offsets_length_mismatch() {
        let json = r#"{
            "intersections": [{ "distance": 0 }, { "distance": 100 }],
            "offsets": [0]
        }"#;

        let err = parse_corridor_json_str(json).unwrap_err();
        assert!(format!("{:#}", err).contains("expected 2 offsets, got 1"));
    }

    /// Test that errors point at the offending field
    #[test]
    fn test_error_reports_path() {
        let json = r#"{
            "intersections": [
                { "distance": 0 },
                { "distance": 100, "greenPhases": [{ "direction": "upstream", "startTime": 0, "duration": "long" }] }
            ]
        }"#;

        let err = parse_corridor_json_str(json).unwrap_err().to_string();
        assert!(
            err.contains("intersections[1].greenPhases[0].duration"),
            "unexpected error: {}",
            err
        );
    }

    #[test]
    fn test_unknown_direction_rejected() {
        let json = r#"[{ "distance": 0, "greenPhases": [{ "direction": "sideways", "startTime": 0, "duration": 10 }] }]"#;
        let err = parse_corridor_json_str(json).unwrap_err().to_string();
        assert!(err.contains("direction"), "unexpected error: {}", err);
    }

    #[test]
    fn test_missing_intersections_key() {
        let err = parse_corridor_json_str(r#"{ "signals": [] }"#).unwrap_err().to_string();
        assert!(err.contains("'intersections'"));
        assert!(err.contains("signals"));
    }

    #[test]
    fn test_invalid_json_syntax() {
        let result = parse_corridor_json_str("{ not json");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid JSON syntax"));

        assert!(parse_corridor_json_str("42").is_err());
    }

    /// Test reading from a file
    #[test]
    fn test_parse_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(CORRIDOR.as_bytes()).unwrap();

        let corridor = parse_corridor_json(file.path()).unwrap();
        assert_eq!(corridor.len(), 2);

        let missing = parse_corridor_json(std::path::Path::new("/nonexistent/corridor.json"));
        assert!(missing.unwrap_err().to_string().contains("Failed to read JSON file"));
    }
}
