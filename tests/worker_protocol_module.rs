use respcluster::worker::{decode_line, parse_timestamp_millis, StepPhase, WorkerMessage};

#[test]
fn decodes_progress_messages() {
    let message = decode_line(
        r#"{"type":"progress","step":"embed_responses","status":"STARTED","timestamp":"2024-01-01T00:00:00Z"}"#,
    )
    .expect("decode progress");
    assert_eq!(
        message,
        WorkerMessage::Progress {
            step: "embed_responses".to_string(),
            status: StepPhase::Started,
            timestamp: "2024-01-01T00:00:00Z".to_string(),
        }
    );
}

#[test]
fn decodes_run_name_messages() {
    let message =
        decode_line(r#"{"type":"run_name","name":"responses_1700000000"} "#).expect("decode name");
    assert_eq!(
        message,
        WorkerMessage::RunName {
            name: "responses_1700000000".to_string(),
        }
    );
}

#[test]
fn decodes_all_step_phases() {
    for (raw, phase) in [
        ("TODO", StepPhase::Todo),
        ("STARTED", StepPhase::Started),
        ("DONE", StepPhase::Done),
        ("ERROR", StepPhase::Error),
    ] {
        let line = format!(
            r#"{{"type":"progress","step":"cluster","status":"{raw}","timestamp":"2024-01-01T00:00:00Z"}}"#
        );
        let message = decode_line(&line).expect("decode phase");
        let WorkerMessage::Progress { status, .. } = message else {
            panic!("expected progress message");
        };
        assert_eq!(status, phase);
    }
}

#[test]
fn rejects_non_json_lines() {
    assert!(decode_line("not json at all").is_err());
}

#[test]
fn rejects_unknown_message_types() {
    assert!(decode_line(r#"{"type":"telemetry","value":1}"#).is_err());
    assert!(decode_line(r#"{"type":"progress","step":"x","status":"WAITING","timestamp":"t"}"#).is_err());
}

#[test]
fn parses_rfc3339_timestamps() {
    assert_eq!(
        parse_timestamp_millis("2024-01-01T00:00:00Z"),
        Some(1_704_067_200_000)
    );
}

#[test]
fn parses_naive_isoformat_timestamps() {
    // shape emitted by datetime.now().isoformat()
    assert_eq!(
        parse_timestamp_millis("2024-01-01T00:00:00.500000"),
        Some(1_704_067_200_500)
    );
    assert_eq!(parse_timestamp_millis("2024-01-01T00:00:00"), Some(1_704_067_200_000));
}

#[test]
fn unparseable_timestamps_are_none() {
    assert_eq!(parse_timestamp_millis("yesterday"), None);
}
