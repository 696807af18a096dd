//! Topic classification.
//!
//! Classification is a pure function of the topic string: an ordered list of
//! `(pattern, class)` rules is scanned top to bottom, the first match wins,
//! and anything left over is [`TopicClass::Unknown`].

use std::fmt;

/// The closed set of message classes the bridge knows how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicClass {
    Telemetry,
    ServiceLog,
    Video,
    /// No rule matched; the payload shape is inferred at runtime.
    Unknown,
}

impl TopicClass {
    /// Whether the output record shape is hardcoded.
    pub fn has_fixed_schema(self) -> bool {
        !matches!(self, TopicClass::Unknown)
    }
}

impl fmt::Display for TopicClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Telemetry => write!(f, "telemetry"),
            Self::ServiceLog => write!(f, "service-log"),
            Self::Video => write!(f, "video"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Chunk {
    Literal(String),
    /// `*`: exactly one non-empty chunk.
    Single,
    /// `**`: zero or more chunks.
    Multi,
}

/// A `/`-separated key pattern with `*` and `**` wildcards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPattern {
    source: String,
    chunks: Vec<Chunk>,
}

impl TopicPattern {
    pub fn new(pattern: &str) -> Self {
        let chunks = pattern
            .split('/')
            .map(|chunk| match chunk {
                "*" => Chunk::Single,
                "**" => Chunk::Multi,
                literal => Chunk::Literal(literal.to_string()),
            })
            .collect();
        Self {
            source: pattern.to_string(),
            chunks,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, topic: &str) -> bool {
        let parts: Vec<&str> = topic.split('/').collect();
        match_chunks(&self.chunks, &parts)
    }
}

fn match_chunks(pattern: &[Chunk], parts: &[&str]) -> bool {
    match pattern.split_first() {
        None => parts.is_empty(),
        Some((Chunk::Multi, rest)) => {
            (0..=parts.len()).any(|skip| match_chunks(rest, &parts[skip..]))
        }
        Some((Chunk::Literal(literal), rest)) => {
            parts.split_first().is_some_and(|(part, remaining)| {
                literal.as_str() == *part && match_chunks(rest, remaining)
            })
        }
        Some((Chunk::Single, rest)) => parts
            .split_first()
            .is_some_and(|(part, remaining)| !part.is_empty() && match_chunks(rest, remaining)),
    }
}

/// A set of patterns; a topic is in the set if any pattern matches.
#[derive(Debug, Clone, Default)]
pub struct TopicFilter {
    patterns: Vec<TopicPattern>,
}

impl TopicFilter {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| TopicPattern::new(p.as_ref()))
                .collect(),
        }
    }

    pub fn contains(&self, topic: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(topic))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Ordered classification rules with a guaranteed `Unknown` fallback.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    rules: Vec<(TopicPattern, TopicClass)>,
}

impl RoutingTable {
    /// An empty table classifies everything as `Unknown`.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule. Earlier rules take precedence.
    pub fn route(mut self, pattern: &str, class: TopicClass) -> Self {
        self.rules.push((TopicPattern::new(pattern), class));
        self
    }

    pub fn classify(&self, topic: &str) -> TopicClass {
        self.rules
            .iter()
            .find(|(pattern, _)| pattern.matches(topic))
            .map(|(_, class)| *class)
            .unwrap_or(TopicClass::Unknown)
    }
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::new()
            .route("telemetry/*/*/**", TopicClass::Telemetry)
            .route("services/*/log", TopicClass::ServiceLog)
            .route("video/*", TopicClass::Video)
    }
}
