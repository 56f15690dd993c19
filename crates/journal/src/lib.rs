//! JSON-lines session journal
//!
//! One line per drained [`SessionEvent`]:
//!
//! ```text
//! {"ts_ms":1532,"episode":1,"kind":"matched","color":"red","score":1,"combo":1}
//! ```
//!
//! Enabled by setting `TRAIN_MATCHER_LOG_PATH`; the file is appended to.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Map, Value};

use train_matcher_core::SessionEvent;

const LOG_PATH_ENV: &str = "TRAIN_MATCHER_LOG_PATH";

#[derive(Debug, Serialize)]
struct JournalRecord<'a> {
    ts_ms: u64,
    episode: u32,
    kind: &'a str,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

/// Event-specific fields of a record.
pub fn event_fields(event: &SessionEvent) -> Map<String, Value> {
    let value = match *event {
        SessionEvent::RunStarted { mode, .. } => json!({ "mode": mode.as_str() }),
        SessionEvent::Matched { color, score, combo } => {
            json!({ "color": color.as_str(), "score": score, "combo": combo })
        }
        SessionEvent::Missed {
            expected,
            selected,
            mistakes,
        } => json!({
            "expected": expected.as_str(),
            "selected": selected.as_str(),
            "mistakes": mistakes,
        }),
        SessionEvent::MistakeForgiven { mistakes } => json!({ "mistakes": mistakes }),
        SessionEvent::ComboStreak { combo, super_combo } => {
            json!({ "combo": combo, "super": super_combo })
        }
        SessionEvent::LevelStarted { level } => json!({ "level": level }),
        SessionEvent::ModifierUnlocked(kind) => json!({ "modifier": kind.as_str() }),
        SessionEvent::ExpressStarted | SessionEvent::ExpressEnded => json!({}),
        SessionEvent::GameOver {
            reason,
            score,
            new_high_score,
        } => json!({
            "reason": reason.as_str(),
            "score": score,
            "new_high_score": new_high_score,
        }),
        SessionEvent::ZenChanged(enabled) => json!({ "enabled": enabled }),
        SessionEvent::MistakeLimitChanged { max_mistakes } => {
            json!({ "max_mistakes": max_mistakes })
        }
    };
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Journal writing to an opened file (or any boxed sink).
pub type DynJournal = EventJournal<Box<dyn Write + Send>>;

pub struct EventJournal<W: Write> {
    out: W,
    buf: Vec<u8>,
    started: Instant,
    records: u64,
}

impl DynJournal {
    /// Open `path` for appending.
    pub fn open(path: &Path) -> Result<Self> {
        let file: File = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening journal {}", path.display()))?;
        Ok(Self::new(Box::new(BufWriter::new(file))))
    }

    /// Open the journal named by `TRAIN_MATCHER_LOG_PATH`, if set.
    pub fn from_env() -> Option<Self> {
        let path = std::env::var(LOG_PATH_ENV)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())?;

        match Self::open(Path::new(&path)) {
            Ok(journal) => Some(journal),
            Err(e) => {
                eprintln!("[Journal] {:#}; journaling disabled", e);
                None
            }
        }
    }
}

impl<W: Write> EventJournal<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            buf: Vec::with_capacity(256),
            started: Instant::now(),
            records: 0,
        }
    }

    /// Append `event`, stamped with the time since the journal was opened.
    pub fn record(&mut self, episode: u32, event: &SessionEvent) -> Result<()> {
        let ts_ms = self.started.elapsed().as_millis() as u64;
        self.record_at(ts_ms, episode, event)
    }

    pub fn record_at(&mut self, ts_ms: u64, episode: u32, event: &SessionEvent) -> Result<()> {
        let rec = JournalRecord {
            ts_ms,
            episode,
            kind: event.kind(),
            fields: event_fields(event),
        };
        self.buf.clear();
        serde_json::to_writer(&mut self.buf, &rec).context("encoding journal record")?;
        self.buf.push(b'\n');
        self.out
            .write_all(&self.buf)
            .context("writing journal record")?;
        self.records += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush().context("flushing journal")
    }

    /// Records written so far.
    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
