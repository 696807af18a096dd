use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{BridgeStats, DropReason, Envelope};
use crate::codec;
use crate::config::BridgeSettings;
use crate::decoders::telemetry::{self, Derived};
use crate::decoders::{service_log, unknown, video};
use crate::pose::PoseTracker;
use crate::records::{
    FRAME_TRANSFORM_SCHEMA, LOCATION_FIX_SCHEMA, LOG_SCHEMA, POSE_SCHEMA, VIDEO_FRAME_SCHEMA,
};
use crate::registry::ChannelRegistry;
use crate::router::{RoutingTable, TopicClass, TopicFilter};
use crate::schema::SchemaEngine;
use crate::sink::{ChannelSchema, Sink};

/// Routes inbound messages to decoders and publishes the results on `sink`.
///
/// Processing is synchronous: one message runs to completion before the next
/// is accepted. Callers that receive on several threads share the dispatcher
/// behind a mutex.
#[derive(Debug)]
pub struct Dispatcher<S> {
    sink: S,
    routes: RoutingTable,
    registry: ChannelRegistry,
    schemas: SchemaEngine,
    pose: PoseTracker,
    ignored: TopicFilter,
    settings: BridgeSettings,
    stats: BridgeStats,
}

impl<S: Sink> Dispatcher<S> {
    pub fn new(sink: S, settings: &BridgeSettings) -> Self {
        Self::with_routes(sink, RoutingTable::default(), settings)
    }

    pub fn with_routes(sink: S, routes: RoutingTable, settings: &BridgeSettings) -> Self {
        Self {
            sink,
            routes,
            registry: ChannelRegistry::new(),
            schemas: SchemaEngine::new(TopicFilter::new(&settings.schema_exclusions)),
            pose: PoseTracker::new(),
            ignored: TopicFilter::new(&settings.ignored_topics),
            settings: settings.clone(),
            stats: BridgeStats::default(),
        }
    }

    /// Handle one inbound message and return how many records were published.
    ///
    /// A dropped message is logged exactly once here and reported as the
    /// error; the dispatcher stays usable either way.
    pub fn on_message(&mut self, envelope: &Envelope) -> Result<usize, DropReason> {
        self.stats.received += 1;
        let class = self.routes.classify(&envelope.topic);

        let outcome = match class {
            TopicClass::Telemetry => self.on_telemetry(envelope),
            TopicClass::ServiceLog => self.on_service_log(envelope),
            TopicClass::Video => self.on_video(envelope),
            TopicClass::Unknown => self.on_unknown(envelope),
        };

        match &outcome {
            Ok(published) => self.stats.published += *published as u64,
            Err(reason) => {
                self.stats.record_drop(reason);
                report_drop(&envelope.topic, class, reason);
            }
        }

        let interval = self.settings.stats_interval;
        if interval > 0 && self.stats.received % interval == 0 {
            info!(
                received = self.stats.received,
                published = self.stats.published,
                dropped = self.stats.dropped,
                channels = self.registry.len(),
                "Processed {} messages",
                self.stats.received
            );
        }

        outcome
    }

    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    pub fn schemas(&self) -> &SchemaEngine {
        &self.schemas
    }

    /// Withdraw every channel from the sink.
    pub fn shutdown(&mut self) {
        self.registry.clear(&mut self.sink);
    }

    fn on_telemetry(&mut self, envelope: &Envelope) -> Result<usize, DropReason> {
        let data = codec::decode_object(&envelope.payload)?;
        let record = telemetry::decode(&envelope.topic, data)?;

        let schema = ChannelSchema::schemaless(record.subtype.as_str());
        let mut published = self.publish(&record.topic, TopicClass::Telemetry, &schema, &record.data);

        match record.derived {
            Some(Err(reason)) => {
                debug!(topic = %record.topic, %reason, "skipped derived record");
            }
            Some(Ok(Derived::Position(fix))) => {
                let topic = self.settings.position_topic.clone();
                published += self.publish_record(&topic, &LOCATION_FIX_SCHEMA, &fix);
            }
            Some(Ok(Derived::Attitude(attitude))) => {
                self.pose.update_attitude(attitude);
                published += self.publish_pose();
            }
            Some(Ok(Derived::LocalPosition(position))) => {
                self.pose.update_position(position);
                published += self.publish_pose();
            }
            None => {}
        }

        Ok(published)
    }

    fn on_service_log(&mut self, envelope: &Envelope) -> Result<usize, DropReason> {
        let data = codec::decode_object(&envelope.payload)?;
        let log = service_log::decode(&data)?;
        Ok(self.publish_class(&envelope.topic, TopicClass::ServiceLog, &LOG_SCHEMA, &log))
    }

    fn on_video(&mut self, envelope: &Envelope) -> Result<usize, DropReason> {
        let data = codec::decode_object(&envelope.payload)?;
        let frame = video::decode(&data)?;
        Ok(self.publish_class(&envelope.topic, TopicClass::Video, &VIDEO_FRAME_SCHEMA, &frame))
    }

    fn on_unknown(&mut self, envelope: &Envelope) -> Result<usize, DropReason> {
        let topic = envelope.topic.as_str();
        if self.ignored.contains(topic) {
            return Err(DropReason::Ignored);
        }

        let data = codec::decode_object(&envelope.payload)?;
        unknown::check(&data)?;
        let value = Value::Object(data);

        let schema = if self.schemas.is_excluded(topic) {
            ChannelSchema::schemaless(topic)
        } else {
            ChannelSchema::new(topic, self.schemas.observe(topic, &value))
        };

        Ok(self.publish(topic, TopicClass::Unknown, &schema, &value))
    }

    /// Publish the derived pose and transform once both inputs are known.
    fn publish_pose(&mut self) -> usize {
        let mut published = 0;
        if let Some(transform) = self.pose.frame_transform() {
            let topic = self.settings.transform_topic.clone();
            published += self.publish_record(&topic, &FRAME_TRANSFORM_SCHEMA, &transform);
        }
        if let Some(pose) = self.pose.pose() {
            let topic = self.settings.pose_topic.clone();
            published += self.publish_record(&topic, &POSE_SCHEMA, &pose);
        }
        published
    }

    /// Derived records live on shared topics with a fixed schema.
    fn publish_record<T: Serialize>(&mut self, topic: &str, schema: &ChannelSchema, record: &T) -> usize {
        self.publish_class(topic, TopicClass::Telemetry, schema, record)
    }

    fn publish_class<T: Serialize>(
        &mut self,
        topic: &str,
        class: TopicClass,
        schema: &ChannelSchema,
        record: &T,
    ) -> usize {
        match encode_record(topic, record) {
            Some(payload) => self.publish(topic, class, schema, &payload),
            None => 0,
        }
    }

    fn publish(&mut self, topic: &str, class: TopicClass, schema: &ChannelSchema, payload: &Value) -> usize {
        let resolution = self.registry.resolve(&mut self.sink, topic, class, schema);
        self.stats.record_resolution(resolution);
        self.sink.log(resolution.id(), payload);
        1
    }
}

/// Serialize an output record. A failure is logged once and the record skipped.
pub(super) fn encode_record<T: Serialize>(topic: &str, record: &T) -> Option<Value> {
    match serde_json::to_value(record) {
        Ok(payload) => Some(payload),
        Err(e) => {
            warn!(topic, "skipped record that failed to serialize: {e}");
            None
        }
    }
}

fn report_drop(topic: &str, class: TopicClass, reason: &DropReason) {
    match (class, reason) {
        (TopicClass::Video, DropReason::Shape(_)) => {
            warn!(topic, %class, %reason, "dropped message");
        }
        _ => debug!(topic, %class, %reason, "dropped message"),
    }
}
