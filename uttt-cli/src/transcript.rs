//! Game transcripts: one 81-character board string per line

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use uttt_core::Board;

/// Line-per-position transcript writer (no-op without a path)
pub struct Transcript {
    path: Option<PathBuf>,
    writer: Option<BufWriter<File>>,
}

impl Transcript {
    /// Create (truncating) the transcript file, if any
    pub fn create(path: Option<&Path>) -> Result<Self> {
        let writer = match path {
            Some(p) => Some(BufWriter::new(
                File::create(p).with_context(|| format!("Failed to create {}", p.display()))?,
            )),
            None => None,
        };
        Ok(Self {
            path: path.map(Path::to_path_buf),
            writer,
        })
    }

    pub fn record(&mut self, board: &Board) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writeln!(writer, "{}", board)?;
            writer.flush()?;
        }
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Read a transcript back into boards
pub fn load(path: &Path) -> Result<Vec<Board>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(i, line)| {
            line.trim()
                .parse::<Board>()
                .with_context(|| format!("Bad board on line {}", i + 1))
        })
        .collect()
}
