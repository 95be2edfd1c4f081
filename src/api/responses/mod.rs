//! Codex `/responses` protocol support.
//!
//! The module is split into:
//! - request builder (`request_builder`)
//! - SSE line decoding and event dispatch (`sse_parser`)
//! - the lazy event stream both consumption modes share (`stream`)

mod request_builder;
mod sse_parser;
mod stream;

pub(crate) use request_builder::{build_codex_payload, RequestOptions};
pub use stream::{ChunkSource, SseEventStream};

#[cfg(test)]
pub(crate) use request_builder::DEFAULT_INSTRUCTIONS;
