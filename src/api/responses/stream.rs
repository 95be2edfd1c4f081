//! Lazy event stream over a completion response body.
//!
//! [`SseEventStream`] is the single parsing core: it pulls byte chunks on
//! demand, decodes them into [`StreamEvent`]s in wire order, and keeps a
//! running [`CompletionResult`]. Buffered callers drain it with
//! [`collect`](SseEventStream::collect); live callers pull deltas with
//! [`next_delta`](SseEventStream::next_delta). Dropping the stream drops the
//! underlying response, which closes the connection.

use super::sse_parser::{parse_sse_line, SseLineDecoder};
use crate::error::ApiError;
use crate::types::{CompletionResult, StreamEvent, Usage};
use async_trait::async_trait;
use std::collections::VecDeque;

/// A pull-based source of response body bytes.
#[async_trait]
pub trait ChunkSource: Send {
    /// Next body chunk, or `None` once the body is exhausted.
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, ApiError>;
}

#[async_trait]
impl ChunkSource for reqwest::Response {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, ApiError> {
        Ok(self.chunk().await?.map(|bytes| bytes.to_vec()))
    }
}

#[async_trait]
impl ChunkSource for Box<dyn ChunkSource> {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, ApiError> {
        (**self).next_chunk().await
    }
}

/// Folds stream events into a [`CompletionResult`].
#[derive(Debug, Default)]
pub(crate) struct CompletionAccumulator {
    text: String,
    usage: Option<Usage>,
}

impl CompletionAccumulator {
    pub(crate) fn apply(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::TextDelta(delta) => self.text.push_str(delta),
            StreamEvent::Completed { text, usage } => {
                if let Some(text) = text {
                    // The final block is authoritative over concatenated deltas.
                    self.text.clone_from(text);
                }
                if usage.is_some() {
                    self.usage = *usage;
                }
            }
            StreamEvent::Done | StreamEvent::Unrecognized => {}
        }
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn usage(&self) -> Option<Usage> {
        self.usage
    }

    pub(crate) fn finish(self, model: String) -> CompletionResult {
        CompletionResult {
            text: self.text,
            usage: self.usage,
            model,
        }
    }
}

/// Single-pass, non-restartable sequence of events from one completion request.
pub struct SseEventStream<S> {
    source: S,
    decoder: SseLineDecoder,
    pending: VecDeque<StreamEvent>,
    accumulator: CompletionAccumulator,
    model: String,
    source_exhausted: bool,
    done: bool,
}

impl<S: ChunkSource> SseEventStream<S> {
    pub fn new(source: S, model: impl Into<String>) -> Self {
        Self {
            source,
            decoder: SseLineDecoder::default(),
            pending: VecDeque::new(),
            accumulator: CompletionAccumulator::default(),
            model: model.into(),
            source_exhausted: false,
            done: false,
        }
    }

    /// Next meaningful event, or `None` after `[DONE]` or end of body.
    ///
    /// Every returned event has already been applied to the running result.
    /// Unrecognized event types are consumed silently.
    pub async fn next_event(&mut self) -> Result<Option<StreamEvent>, ApiError> {
        loop {
            if self.done {
                return Ok(None);
            }
            if let Some(event) = self.pending.pop_front() {
                match event {
                    StreamEvent::Done => {
                        self.done = true;
                        self.pending.clear();
                        return Ok(None);
                    }
                    StreamEvent::Unrecognized => continue,
                    event => {
                        self.accumulator.apply(&event);
                        return Ok(Some(event));
                    }
                }
            }
            if self.source_exhausted {
                self.done = true;
                return Ok(None);
            }
            match self.source.next_chunk().await? {
                Some(chunk) => {
                    let lines = self.decoder.push(&chunk);
                    self.pending.extend(lines.iter().filter_map(|line| parse_sse_line(line)));
                }
                None => {
                    self.source_exhausted = true;
                    if let Some(line) = self.decoder.finish() {
                        self.pending.extend(parse_sse_line(&line));
                    }
                }
            }
        }
    }

    /// Next text delta for live consumers; `None` once the stream has ended.
    ///
    /// Completed events are folded into the running result on the way, so
    /// [`usage`](Self::usage) is populated once this returns `None`.
    pub async fn next_delta(&mut self) -> Result<Option<String>, ApiError> {
        while let Some(event) = self.next_event().await? {
            if let StreamEvent::TextDelta(delta) = event {
                return Ok(Some(delta));
            }
        }
        Ok(None)
    }

    /// Drain the stream into the accumulated result.
    pub async fn collect(mut self) -> Result<CompletionResult, ApiError> {
        while self.next_event().await?.is_some() {}
        Ok(self.into_result())
    }

    /// Text accumulated so far.
    pub fn text(&self) -> &str {
        self.accumulator.text()
    }

    /// Usage reported by the last completed event seen so far.
    pub fn usage(&self) -> Option<Usage> {
        self.accumulator.usage()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// True once `[DONE]` or the end of the body was reached.
    pub fn is_finished(&self) -> bool {
        self.done
    }

    /// Stop consuming and return what was accumulated.
    pub fn into_result(self) -> CompletionResult {
        self.accumulator.finish(self.model)
    }
}

impl<S> std::fmt::Debug for SseEventStream<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SseEventStream")
            .field("model", &self.model)
            .field("pending", &self.pending.len())
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}
