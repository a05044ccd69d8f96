//! Scalar event tracking
//!
//! Each ensemble member gets its own run directory under the output root,
//! named by ordinal and wall-clock timestamp. Inside it:
//! - `scalars.jsonl`: one JSON event `{tag, value, step}` per line, the
//!   stream an external visualization tool tails
//!   (`{loss, acc1, acc5} x {train, test}`, keyed by global step)
//! - `params.json`: the full configuration the member was trained with

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single scalar observation in a run's event stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarEvent {
    pub tag: String,
    pub value: f32,
    pub step: u64,
}

/// Buffered writer for one member's run directory
pub struct ScalarWriter {
    dir: PathBuf,
    out: BufWriter<File>,
}

impl ScalarWriter {
    /// Create the run directory `member-{ordinal}-{timestamp}` under `root`
    /// and open its event stream
    pub fn create(root: &Path, ordinal: usize) -> Result<Self> {
        let stamp = Local::now().format("%Y-%m-%d-%H-%M-%S");
        let dir = root.join(format!("member-{ordinal}-{stamp}"));
        fs::create_dir_all(&dir)?;
        let file = File::create(dir.join("scalars.jsonl"))?;
        Ok(Self { dir, out: BufWriter::new(file) })
    }

    /// Append one scalar event
    pub fn log_scalar(&mut self, tag: &str, value: f32, step: u64) -> Result<()> {
        let event = ScalarEvent { tag: tag.to_string(), value, step };
        serde_json::to_writer(&mut self.out, &event)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    /// Record the run's hyperparameters as `params.json`
    pub fn write_params<T: Serialize>(&self, params: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(params)?;
        fs::write(self.dir.join("params.json"), json)?;
        Ok(())
    }

    /// Flush buffered events to disk
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    /// The run directory this writer owns
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Read every event back from a run directory's stream
///
/// Exists for tests and offline analysis; the hot path only appends.
pub fn read_events(dir: &Path) -> Result<Vec<ScalarEvent>> {
    let raw = fs::read_to_string(dir.join("scalars.jsonl"))?;
    raw.lines().map(|line| Ok(serde_json::from_str(line)?)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_dir_carries_ordinal() {
        let root = tempfile::tempdir().unwrap();
        let writer = ScalarWriter::create(root.path(), 3).unwrap();
        let name = writer.dir().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("member-3-"), "unexpected run dir name: {name}");
        assert!(writer.dir().join("scalars.jsonl").is_file());
    }

    #[test]
    fn test_events_round_trip() {
        let root = tempfile::tempdir().unwrap();
        let mut writer = ScalarWriter::create(root.path(), 0).unwrap();
        writer.log_scalar("loss/train", 1.25, 0).unwrap();
        writer.log_scalar("acc1/train", 0.5, 0).unwrap();
        writer.log_scalar("loss/test", 0.9, 10).unwrap();
        writer.flush().unwrap();

        let events = read_events(writer.dir()).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], ScalarEvent { tag: "loss/train".into(), value: 1.25, step: 0 });
        assert_eq!(events[2].step, 10);
    }

    #[test]
    fn test_params_json_written() {
        #[derive(Serialize)]
        struct Params {
            lr: f32,
        }

        let root = tempfile::tempdir().unwrap();
        let writer = ScalarWriter::create(root.path(), 1).unwrap();
        writer.write_params(&Params { lr: 0.001 }).unwrap();

        let raw = fs::read_to_string(writer.dir().join("params.json")).unwrap();
        assert!(raw.contains("0.001"));
    }

    #[test]
    fn test_steps_survive_serde() {
        let event = ScalarEvent { tag: "acc5/test".into(), value: 0.99, step: 12345 };
        let json = serde_json::to_string(&event).unwrap();
        let back: ScalarEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
