//! # foxbridge
//!
//! `foxbridge` subscribes to every topic on a Zenoh network, classifies each
//! message by its topic, decodes the payload and republishes it on a typed
//! channel that visualization clients consume over WebSocket. Topics without a
//! known record shape get a JSON Schema inferred at runtime; when the schema
//! widens, the channel is re-announced.
//!
//! ## Core Modules
//!
//! - `router`: ordered topic pattern rules mapping a topic to its class.
//! - `codec`: raw bytes to JSON.
//! - `decoders`: per-class field validation and record extraction.
//! - `schema`: incremental schema inference for dynamic topics.
//! - `registry`: one output channel per topic, replaced on schema drift.
//! - `pose`: attitude and local position to pose and frame transform.
//! - `bridge`: the dispatcher tying the above together.
//! - `sink`, `broker`, `client`, `transport`: the channel sink and the
//!   WebSocket server viewers connect to.
//! - `ingest`: the Zenoh session and subscription.
//! - `web`: the companion HTTP endpoint.
//! - `config`, `utils`: configuration loading, errors and logging.
//! - `cli`, `app`: command-line flags and the process lifecycle.

pub mod app;
pub mod bridge;
pub mod broker;
pub mod cli;
pub mod client;
pub mod codec;
pub mod config;
pub mod decoders;
pub mod ingest;
pub mod pose;
pub mod records;
pub mod registry;
pub mod router;
pub mod schema;
pub mod sink;
pub mod transport;
pub mod utils;
pub mod web;
