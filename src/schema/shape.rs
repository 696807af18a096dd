//! Structural shape of observed JSON values.
//!
//! A [`Shape`] is the union of every value merged into it. Merging only ever
//! sets flags, adds properties or drops keys from `required`, so a shape can
//! widen but never narrow.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shape {
    null: bool,
    boolean: bool,
    integer: bool,
    number: bool,
    string: bool,
    /// Union of item shapes, once any array has been seen. Stays empty while
    /// only `[]` has been observed, and then no `items` constraint is rendered.
    array: Option<Box<Shape>>,
    object: Option<ObjectShape>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectShape {
    properties: BTreeMap<String, Shape>,
    /// Keys present in every object observed so far.
    required: BTreeSet<String>,
}

impl Shape {
    /// The shape of nothing; its schema accepts any value.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Shape of a single value.
    pub fn of(value: &Value) -> Self {
        Self::empty().merged(value)
    }

    /// Pure form of [`Shape::observe`].
    pub fn merged(mut self, value: &Value) -> Self {
        self.observe(value);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }

    /// Widen this shape to also describe `value`.
    pub fn observe(&mut self, value: &Value) {
        match value {
            Value::Null => self.null = true,
            Value::Bool(_) => self.boolean = true,
            Value::Number(n) if n.is_i64() || n.is_u64() => self.integer = true,
            Value::Number(_) => self.number = true,
            Value::String(_) => self.string = true,
            Value::Array(items) => {
                let shape = self.array.get_or_insert_with(Box::default);
                for item in items {
                    shape.observe(item);
                }
            }
            Value::Object(map) => match self.object.as_mut() {
                Some(object) => object.observe(map),
                None => self.object = Some(ObjectShape::first(map)),
            },
        }
    }

    /// Render as a JSON Schema document.
    pub fn to_json_schema(&self) -> Value {
        let mut schema = Map::new();

        let mut types = Vec::new();
        if self.null {
            types.push("null");
        }
        if self.boolean {
            types.push("boolean");
        }
        // integer is a subset of number
        if self.number {
            types.push("number");
        } else if self.integer {
            types.push("integer");
        }
        if self.string {
            types.push("string");
        }
        if self.array.is_some() {
            types.push("array");
        }
        if self.object.is_some() {
            types.push("object");
        }

        match types.as_slice() {
            [] => {}
            [single] => {
                schema.insert("type".into(), json!(single));
            }
            many => {
                schema.insert("type".into(), json!(many));
            }
        }

        if let Some(items) = self.array.as_deref().filter(|items| !items.is_empty()) {
            schema.insert("items".into(), items.to_json_schema());
        }

        if let Some(object) = &self.object {
            let properties: Map<String, Value> = object
                .properties
                .iter()
                .map(|(key, shape)| (key.clone(), shape.to_json_schema()))
                .collect();
            schema.insert("properties".into(), Value::Object(properties));
            schema.insert("required".into(), json!(object.required));
        }

        Value::Object(schema)
    }
}

impl ObjectShape {
    fn first(map: &Map<String, Value>) -> Self {
        Self {
            properties: map
                .iter()
                .map(|(key, value)| (key.clone(), Shape::of(value)))
                .collect(),
            required: map.keys().cloned().collect(),
        }
    }

    fn observe(&mut self, map: &Map<String, Value>) {
        self.required.retain(|key| map.contains_key(key));
        for (key, value) in map {
            self.properties.entry(key.clone()).or_default().observe(value);
        }
    }
}
