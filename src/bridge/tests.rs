use super::*;
use crate::codec::DecodeError;
use crate::config::BridgeSettings;
use crate::decoders::ShapeError;
use crate::sink::RecordingSink;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

/// Collects the message of every event emitted while capturing.
#[derive(Clone, Default)]
struct EventLog(Arc<Mutex<Vec<String>>>);

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: tracing::Subscriber> Layer<S> for EventLog {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.0.lock().unwrap().push(visitor.0);
    }
}

impl EventLog {
    fn capture<R>(&self, f: impl FnOnce() -> R) -> R {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::with_default(subscriber, f)
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

fn dispatcher() -> Dispatcher<RecordingSink> {
    Dispatcher::new(RecordingSink::new(), &BridgeSettings::default())
}

fn send(dispatcher: &mut Dispatcher<RecordingSink>, topic: &str, payload: Value) -> Result<usize, DropReason> {
    dispatcher.on_message(&Envelope::new(topic, payload.to_string()))
}

fn schema_of(sink: &RecordingSink, index: usize) -> Value {
    let schema = sink.created[index].1.schema.as_deref().expect("channel has a schema");
    serde_json::from_str(schema).unwrap()
}

#[test]
fn telemetry_without_message_or_type_publishes_nothing() {
    let mut dispatcher = dispatcher();

    let payloads = [
        json!({ "header": { "system_id": 1 } }),
        json!({ "message": { "lat": 1 } }),
        json!({ "message": "HEARTBEAT" }),
        json!({ "message": { "type": 7 } }),
    ];
    for payload in payloads {
        let result = send(&mut dispatcher, "telemetry/1/1/raw", payload);
        assert!(matches!(result, Err(DropReason::Shape(_))));
    }

    assert!(dispatcher.sink().created.is_empty());
    assert!(dispatcher.sink().logged.is_empty());
    assert_eq!(dispatcher.stats().dropped, 4);
}

#[test]
fn telemetry_fans_out_by_subtype() {
    let mut dispatcher = dispatcher();

    send(&mut dispatcher, "telemetry/1/1/raw", json!({ "message": { "type": "HEARTBEAT" } })).unwrap();
    send(&mut dispatcher, "telemetry/1/1/raw", json!({ "message": { "type": "SYS_STATUS" } })).unwrap();
    send(&mut dispatcher, "telemetry/1/1/raw", json!({ "message": { "type": "HEARTBEAT", "n": 2 } })).unwrap();

    let sink = dispatcher.sink();
    assert_eq!(sink.created.len(), 2);
    assert_eq!(sink.logged_on("telemetry/1/1/HEARTBEAT").len(), 2);
    assert_eq!(sink.logged_on("telemetry/1/1/SYS_STATUS").len(), 1);
    assert_eq!(sink.logged_on("telemetry/1/1/HEARTBEAT")[1]["message"]["n"], 2);
}

#[test]
fn global_position_publishes_a_location_fix() {
    let mut dispatcher = dispatcher();
    let payload = json!({
        "message": { "type": "GLOBAL_POSITION_INT", "lat": 473977418, "lon": 85455870, "alt": 5000 }
    });

    assert_eq!(send(&mut dispatcher, "telemetry/1/1/raw", payload).unwrap(), 2);

    let sink = dispatcher.sink();
    let fixes = sink.logged_on("vehicle/position");
    assert_eq!(fixes.len(), 1);
    assert_eq!(fixes[0]["frame_id"], "map");
    assert!((fixes[0]["latitude"].as_f64().unwrap() - 47.3977418).abs() < 1e-9);
    assert!((fixes[0]["longitude"].as_f64().unwrap() - 8.545587).abs() < 1e-9);
    assert!((fixes[0]["altitude"].as_f64().unwrap() - 5.0).abs() < 1e-9);
    assert_eq!(sink.logged_on("telemetry/1/1/GLOBAL_POSITION_INT").len(), 1);
}

#[test]
fn location_fixes_from_every_source_share_one_channel() {
    let mut dispatcher = dispatcher();
    let payload = json!({ "message": { "type": "GLOBAL_POSITION_INT", "lat": 1, "lon": 2, "alt": 3 } });

    send(&mut dispatcher, "telemetry/1/1/raw", payload.clone()).unwrap();
    send(&mut dispatcher, "telemetry/2/1/raw", payload).unwrap();

    let sink = dispatcher.sink();
    let position_channels = sink
        .created
        .iter()
        .filter(|(_, spec)| spec.topic == "vehicle/position")
        .count();
    assert_eq!(position_channels, 1);
    assert_eq!(sink.logged_on("vehicle/position").len(), 2);
}

#[test]
fn bad_global_position_still_publishes_the_raw_record() {
    let mut dispatcher = dispatcher();

    let missing = json!({ "message": { "type": "GLOBAL_POSITION_INT", "lat": 1, "lon": 2 } });
    assert_eq!(send(&mut dispatcher, "telemetry/1/1/raw", missing).unwrap(), 1);

    let not_numeric = json!({ "message": { "type": "GLOBAL_POSITION_INT", "lat": "n/a", "lon": 2, "alt": 3 } });
    assert_eq!(send(&mut dispatcher, "telemetry/1/1/raw", not_numeric).unwrap(), 1);

    let sink = dispatcher.sink();
    assert_eq!(sink.logged_on("telemetry/1/1/GLOBAL_POSITION_INT").len(), 2);
    assert!(sink.logged_on("vehicle/position").is_empty());
    assert_eq!(dispatcher.stats().dropped, 0);
}

#[test]
fn bad_attitude_still_publishes_the_raw_record() {
    let mut dispatcher = dispatcher();

    let position = json!({ "message": { "type": "LOCAL_POSITION_NED", "x": 1, "y": 2, "z": 3 } });
    send(&mut dispatcher, "telemetry/1/1/raw", position).unwrap();

    let attitude = json!({ "message": { "type": "ATTITUDE", "pitch": 0.1, "yaw": 0.2 } });
    assert_eq!(send(&mut dispatcher, "telemetry/1/1/raw", attitude).unwrap(), 1);

    let sink = dispatcher.sink();
    assert_eq!(sink.logged_on("telemetry/1/1/ATTITUDE").len(), 1);
    assert!(sink.logged_on("vehicle/pose").is_empty());
    assert!(sink.logged_on("vehicle/transform").is_empty());
}

#[test]
fn pose_is_published_once_attitude_and_position_are_known() {
    let mut dispatcher = dispatcher();

    let attitude = json!({ "message": { "type": "ATTITUDE", "roll": 0.0, "pitch": 0.0, "yaw": 0.0 } });
    assert_eq!(send(&mut dispatcher, "telemetry/1/1/raw", attitude).unwrap(), 1);
    assert!(dispatcher.sink().logged_on("vehicle/pose").is_empty());

    let position = json!({
        "message": { "type": "LOCAL_POSITION_NED", "x": 1.0, "y": 2.0, "z": 3.0, "time_boot_ms": 2500 }
    });
    assert_eq!(send(&mut dispatcher, "telemetry/1/1/raw", position).unwrap(), 3);

    let sink = dispatcher.sink();
    let transforms = sink.logged_on("vehicle/transform");
    assert_eq!(transforms.len(), 1);
    assert_eq!(transforms[0]["parent_frame_id"], "map");
    assert_eq!(transforms[0]["child_frame_id"], "vehicle");
    assert_eq!(transforms[0]["translation"], json!({ "x": 1.0, "y": -2.0, "z": -3.0 }));
    assert_eq!(transforms[0]["timestamp"], json!({ "sec": 2, "nsec": 500_000_000 }));

    let poses = sink.logged_on("vehicle/pose");
    assert_eq!(poses.len(), 1);
    assert_eq!(poses[0]["orientation"], json!({ "x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0 }));
}

#[test]
fn service_log_levels_fall_back_to_unknown() {
    let mut dispatcher = dispatcher();

    for level in [0, 2, 6, -1, 42] {
        let payload = json!({
            "level": level,
            "message": "hello",
            "name": "svc",
            "file": "svc.py",
            "line": 3,
            "timestamp": { "sec": 10, "nsec": 20 }
        });
        send(&mut dispatcher, "services/svc/log", payload).unwrap();
    }

    let levels: Vec<&Value> = dispatcher
        .sink()
        .logged_on("services/svc/log")
        .into_iter()
        .map(|log| &log["level"])
        .collect();
    assert_eq!(levels, [&json!(0), &json!(2), &json!(0), &json!(0), &json!(0)]);
    assert_eq!(dispatcher.sink().created.len(), 1);
}

#[test]
fn service_log_missing_field_is_dropped() {
    let mut dispatcher = dispatcher();
    let payload = json!({ "level": 1, "message": "hello", "name": "svc", "file": "svc.py", "line": 3 });

    let result = send(&mut dispatcher, "services/svc/log", payload);
    assert!(matches!(
        result,
        Err(DropReason::Shape(ShapeError::MissingField(field))) if field == "timestamp.sec"
    ));
    assert!(dispatcher.sink().created.is_empty());
}

#[test]
fn video_frames_are_forwarded_with_defaults() {
    let mut dispatcher = dispatcher();

    send(&mut dispatcher, "video/front", json!({ "data": [1, 2, 3], "format": "jpeg" })).unwrap();

    let frames = dispatcher.sink().logged_on("video/front");
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["data"], "AQID");
    assert_eq!(frames[0]["frame_id"], "camera");
    assert_eq!(frames[0]["timestamp"], json!({ "sec": 0, "nsec": 0 }));
    assert_eq!(dispatcher.sink().created[0].1.schema_name, "foxglove.CompressedVideo");
}

#[test]
fn video_without_format_is_dropped() {
    let mut dispatcher = dispatcher();

    let result = send(&mut dispatcher, "video/front", json!({ "data": "AQID" }));
    assert!(matches!(result, Err(DropReason::Shape(_))));
    assert!(dispatcher.sink().created.is_empty());
}

#[test]
fn identical_unknown_payloads_create_one_channel() {
    let mut dispatcher = dispatcher();

    send(&mut dispatcher, "weather/berlin", json!({ "temp": 21.5, "unit": "C" })).unwrap();
    send(&mut dispatcher, "weather/berlin", json!({ "temp": 19.0, "unit": "F" })).unwrap();

    let sink = dispatcher.sink();
    assert_eq!(sink.created.len(), 1);
    assert!(sink.removed.is_empty());
    assert_eq!(sink.logged.len(), 2);
    assert_eq!(dispatcher.stats().channels_created, 1);
}

#[test]
fn new_unknown_key_replaces_the_channel_once() {
    let mut dispatcher = dispatcher();

    send(&mut dispatcher, "weather/berlin", json!({ "temp": 21.5 })).unwrap();
    send(&mut dispatcher, "weather/berlin", json!({ "temp": 20.0, "wind": 4 })).unwrap();
    send(&mut dispatcher, "weather/berlin", json!({ "temp": 20.0, "wind": 5 })).unwrap();

    let sink = dispatcher.sink();
    assert_eq!(sink.created.len(), 2);
    assert_eq!(sink.removed, vec![sink.created[0].0]);
    assert_eq!(dispatcher.stats().channels_replaced, 1);

    let old = schema_of(sink, 0);
    let new = schema_of(sink, 1);
    for key in old["properties"].as_object().unwrap().keys() {
        assert!(new["properties"].get(key).is_some(), "{key} disappeared");
    }
    for required in old["required"].as_array().unwrap() {
        assert!(new["required"].as_array().unwrap().contains(required));
    }
    assert!(new["properties"].get("wind").is_some());

    // the latest message went to the replacement channel
    let (last_channel, _) = sink.logged.last().unwrap();
    assert_eq!(*last_channel, sink.created[1].0);
    assert_eq!(sink.logged_on("weather/berlin").len(), 3);
}

#[test]
fn ignored_topics_never_reach_the_sink() {
    let mut dispatcher = dispatcher();

    for payload in [json!({ "msg": "hi" }), json!({}), json!([1, 2])] {
        let result = send(&mut dispatcher, "rosout/agg", payload);
        assert!(matches!(result, Err(DropReason::Ignored)));
    }
    let result = dispatcher.on_message(&Envelope::new("rosout", b"\xff".to_vec()));
    assert!(matches!(result, Err(DropReason::Ignored)));

    assert!(dispatcher.sink().created.is_empty());
    assert!(dispatcher.sink().logged.is_empty());
    assert_eq!(dispatcher.stats().ignored, 4);
    assert_eq!(dispatcher.stats().dropped, 0);
}

#[test]
fn malformed_payloads_do_not_affect_later_messages() {
    let mut dispatcher = dispatcher();

    for topic in ["telemetry/1/1/raw", "services/a/log", "video/front", "weather/berlin"] {
        let result = dispatcher.on_message(&Envelope::new(topic, b"{not json".to_vec()));
        assert!(matches!(result, Err(DropReason::Decode(DecodeError::InvalidJson(_)))));
    }
    let result = dispatcher.on_message(&Envelope::new("weather/berlin", vec![0xc3, 0x28]));
    assert!(matches!(result, Err(DropReason::Decode(DecodeError::InvalidUtf8(_)))));

    assert!(dispatcher.sink().logged.is_empty());

    send(&mut dispatcher, "weather/berlin", json!({ "temp": 1 })).unwrap();
    assert_eq!(dispatcher.sink().logged.len(), 1);
    assert_eq!(dispatcher.stats().dropped, 5);
    assert_eq!(dispatcher.stats().published, 1);
}

#[test]
fn unknown_non_objects_and_partial_frames_are_dropped() {
    let mut dispatcher = dispatcher();

    let result = send(&mut dispatcher, "weather/berlin", json!([1, 2, 3]));
    assert!(matches!(result, Err(DropReason::Decode(DecodeError::NotAnObject("array")))));

    let result = send(&mut dispatcher, "weather/berlin", json!({ "header": { "seq": 4 } }));
    assert!(matches!(result, Err(DropReason::Shape(ShapeError::IncompleteFrame))));

    assert!(dispatcher.sink().created.is_empty());
    assert_eq!(dispatcher.schemas().topic_count(), 0);
}

#[test]
fn excluded_topics_use_a_schemaless_channel() {
    let settings = BridgeSettings {
        schema_exclusions: vec!["diagnostics/**".to_string()],
        ..BridgeSettings::default()
    };
    let mut dispatcher = Dispatcher::new(RecordingSink::new(), &settings);

    send(&mut dispatcher, "diagnostics/cpu", json!({ "load": 1 })).unwrap();
    send(&mut dispatcher, "diagnostics/cpu", json!({ "load": 1, "temp": 50 })).unwrap();
    send(&mut dispatcher, "diagnostics/cpu", json!({ "other": "x" })).unwrap();

    let sink = dispatcher.sink();
    assert_eq!(sink.created.len(), 1);
    assert_eq!(sink.created[0].1.schema, None);
    assert!(sink.removed.is_empty());
    assert_eq!(sink.logged.len(), 3);
    assert_eq!(dispatcher.schemas().topic_count(), 0);
}

#[test]
fn shutdown_withdraws_every_channel() {
    let mut dispatcher = dispatcher();
    send(&mut dispatcher, "weather/berlin", json!({ "temp": 1 })).unwrap();
    send(&mut dispatcher, "video/front", json!({ "data": "", "format": "h264" })).unwrap();

    dispatcher.shutdown();

    assert_eq!(dispatcher.sink().removed.len(), 2);
    assert!(dispatcher.registry().is_empty());
}

#[test]
fn stats_count_every_outcome() {
    let mut dispatcher = dispatcher();
    send(&mut dispatcher, "weather/berlin", json!({ "temp": 1 })).unwrap();
    send(&mut dispatcher, "weather/berlin", json!({ "temp": 2, "rain": true })).unwrap();
    send(&mut dispatcher, "rosout", json!({})).unwrap_err();
    send(&mut dispatcher, "video/front", json!({})).unwrap_err();

    assert_eq!(
        dispatcher.stats(),
        BridgeStats {
            received: 4,
            published: 2,
            dropped: 1,
            ignored: 1,
            channels_created: 1,
            channels_replaced: 1,
        }
    );
}

#[test]
fn each_drop_emits_exactly_one_diagnostic() {
    let mut dispatcher = dispatcher();
    let events = EventLog::default();

    let envelopes = [
        Envelope::new("telemetry/1/1/raw", "{not json"),
        Envelope::new("services/a/log", "{not json"),
        Envelope::new("video/front", vec![0xc3, 0x28]),
        Envelope::new("weather/berlin", "[1, 2]"),
        Envelope::new("telemetry/1/1/raw", "{}"),
        Envelope::new("video/front", r#"{"data": "AQID"}"#),
        Envelope::new("rosout/agg", r#"{"msg": "hi"}"#),
    ];
    for envelope in &envelopes {
        let result = events.capture(|| dispatcher.on_message(envelope));
        assert!(result.is_err());
        assert_eq!(events.take(), vec!["dropped message".to_string()], "{}", envelope.topic);
    }
}

#[test]
fn forwarded_messages_emit_no_drop_diagnostic() {
    let mut dispatcher = dispatcher();
    let events = EventLog::default();

    events.capture(|| {
        send(&mut dispatcher, "weather/berlin", json!({ "temp": 1 })).unwrap();
        send(&mut dispatcher, "weather/berlin", json!({ "temp": 2 })).unwrap();
        send(&mut dispatcher, "telemetry/1/1/raw", json!({ "message": { "type": "HEARTBEAT" } })).unwrap();
    });

    let logged = events.take();
    assert!(!logged.iter().any(|message| message == "dropped message"));
}

#[test]
fn failed_derivation_is_reported_without_a_drop() {
    let mut dispatcher = dispatcher();
    let events = EventLog::default();

    let payload = json!({ "message": { "type": "ATTITUDE", "pitch": 0.1, "yaw": 0.2 } });
    events.capture(|| send(&mut dispatcher, "telemetry/1/1/raw", payload).unwrap());

    let logged = events.take();
    assert_eq!(logged.iter().filter(|m| *m == "skipped derived record").count(), 1);
    assert!(!logged.iter().any(|message| message == "dropped message"));
}

#[test]
fn unserializable_records_are_skipped_with_a_warning() {
    let events = EventLog::default();
    let mut record = HashMap::new();
    record.insert((1u8, 2u8), 3u8);

    let encoded = events.capture(|| dispatcher::encode_record("vehicle/pose", &record));

    assert_eq!(encoded, None);
    let logged = events.take();
    assert_eq!(logged.len(), 1);
    assert!(logged[0].starts_with("skipped record that failed to serialize"));

    let encoded = dispatcher::encode_record("vehicle/pose", &json!({ "ok": true }));
    assert_eq!(encoded, Some(json!({ "ok": true })));
}
