//! Replays recorded detector output.
//!
//! A recording is a text file with one detector result per line, either the
//! JSON shape the browser detector returns or the flat float buffer a native
//! detector writes (63 whitespace- or comma-separated values per hand):
//!
//! ```text
//! {"landmarks":[[{"x":0.42,"y":0.51,"z":-0.02}, …21 points…]]}
//! {"landmarks":[]}
//! 0.42 0.51 -0.02 0.40 0.55 -0.01 …
//! ```
//!
//! Each `detect` call consumes the next line; the recording loops when it
//! runs out.  Blank lines are skipped.

use std::path::PathBuf;

use async_trait::async_trait;
use gesture_core::protocol::{decode_flat, decode_json, FLOATS_PER_HAND};
use gesture_core::HandFrame;
use tracing::info;

use super::{DetectorError, DetectorOptions, LandmarkSource};
use crate::infrastructure::camera::VideoFrame;

/// [`LandmarkSource`] backed by a JSON-lines recording.
#[derive(Debug)]
pub struct ReplayLandmarkSource {
    path: Option<PathBuf>,
    lines: Vec<String>,
    cursor: usize,
    closed: bool,
}

impl ReplayLandmarkSource {
    /// A source that loads `path` during `initialize`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            lines: Vec::new(),
            cursor: 0,
            closed: false,
        }
    }

    /// A source over an in-memory recording.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: None,
            lines: collect_lines(lines),
            cursor: 0,
            closed: false,
        }
    }

    /// Number of recorded results.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn collect_lines<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    lines
        .into_iter()
        .map(Into::into)
        .filter(|l| !l.trim().is_empty())
        .collect()
}

/// Decodes one recorded result in either line format.
fn decode_line(line: &str) -> Result<Option<HandFrame>, DetectorError> {
    let line = line.trim();
    if line.starts_with('{') {
        return decode_json(line).map_err(|e| DetectorError::DetectFailed(e.to_string()));
    }
    let values = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|v| !v.is_empty())
        .map(str::parse::<f32>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DetectorError::DetectFailed(format!("bad flat landmark value: {e}")))?;
    // A partial trailing hand is reported as missing data, not dropped.
    let num_hands = values.len().div_ceil(FLOATS_PER_HAND);
    decode_flat(&values, num_hands).map_err(|e| DetectorError::DetectFailed(e.to_string()))
}

#[async_trait]
impl LandmarkSource for ReplayLandmarkSource {
    async fn initialize(&mut self, _options: &DetectorOptions) -> Result<(), DetectorError> {
        if let Some(path) = &self.path {
            let text = tokio::fs::read_to_string(path).await.map_err(|e| {
                DetectorError::LoadFailed(format!("cannot read {}: {e}", path.display()))
            })?;
            self.lines = collect_lines(text.lines());
            info!(path = %path.display(), results = self.lines.len(), "loaded landmark recording");
        }
        if self.lines.is_empty() {
            return Err(DetectorError::LoadFailed("recording is empty".into()));
        }
        Ok(())
    }

    fn detect(
        &mut self,
        _frame: &VideoFrame,
        _timestamp_ms: u64,
    ) -> Result<Option<HandFrame>, DetectorError> {
        if self.closed {
            return Err(DetectorError::AlreadyClosed);
        }
        let Some(line) = self.lines.get(self.cursor) else {
            return Err(DetectorError::DetectFailed("recording not loaded".into()));
        };
        self.cursor = (self.cursor + 1) % self.lines.len();
        decode_line(line)
    }

    fn close(&mut self) -> Result<(), DetectorError> {
        if self.closed {
            return Err(DetectorError::AlreadyClosed);
        }
        self.closed = true;
        self.lines.clear();
        Ok(())
    }
}
