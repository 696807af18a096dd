//! Runtime schema inference for topics without a fixed record shape.

mod shape;

use std::collections::HashMap;

use serde_json::Value;

use crate::router::TopicFilter;

pub use shape::Shape;

/// Pure merge step: the shape describing `shape` plus `value`.
pub fn merge(shape: Shape, value: &Value) -> Shape {
    shape.merged(value)
}

/// One shape accumulator per topic.
#[derive(Debug, Default)]
pub struct SchemaEngine {
    shapes: HashMap<String, Shape>,
    exclusions: TopicFilter,
}

impl SchemaEngine {
    pub fn new(exclusions: TopicFilter) -> Self {
        Self {
            shapes: HashMap::new(),
            exclusions,
        }
    }

    /// Topics whose shape changes too often to be worth announcing.
    pub fn is_excluded(&self, topic: &str) -> bool {
        self.exclusions.contains(topic)
    }

    /// Merge `value` into the topic's accumulator and return the schema of
    /// everything observed on that topic, `value` included.
    pub fn observe(&mut self, topic: &str, value: &Value) -> Value {
        let shape = self.shapes.entry(topic.to_string()).or_default();
        shape.observe(value);
        shape.to_json_schema()
    }

    /// Current schema for a topic, if anything has been observed on it.
    pub fn schema(&self, topic: &str) -> Option<Value> {
        self.shapes.get(topic).map(Shape::to_json_schema)
    }

    pub fn topic_count(&self) -> usize {
        self.shapes.len()
    }
}
