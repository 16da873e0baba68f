//! Incremental decoder for the backend's server-sent-events stream.
//!
//! Network reads do not line up with event boundaries, so the decoder keeps
//! the incomplete trailing line between calls to [`SseDecoder::push`].

use serde::Deserialize;
use tracing::debug;

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";
const TEXT_DELTA_EVENT: &str = "content_block_delta";

#[derive(Deserialize)]
struct StreamEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    delta: Option<StreamDelta>,
}

#[derive(Deserialize)]
struct StreamDelta {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the `[DONE]` sentinel has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed raw bytes, returning the text deltas of every line they complete.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut deltas = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(text) = self.decode_line(&line[..line.len() - 1]) {
                deltas.push(text);
            }
        }
        deltas
    }

    /// Flush a final line that arrived without a trailing newline.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buffer);
        self.decode_line(&line)
    }

    fn decode_line(&mut self, raw: &[u8]) -> Option<String> {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim_end_matches('\r');
        let payload = line.strip_prefix(DATA_PREFIX)?.trim();

        if payload == DONE_SENTINEL {
            self.done = true;
            return None;
        }

        match serde_json::from_str::<StreamEvent>(payload) {
            Ok(event) if event.event_type == TEXT_DELTA_EVENT => {
                event.delta.and_then(|d| d.text).filter(|t| !t.is_empty())
            }
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "Skipping malformed stream event");
                None
            }
        }
    }
}
