use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    sync::Arc,
};

use crate::game::position::Position;

use super::DataLoader;

/// Holds every position in memory, either parsed from a text file of
/// `<fen> | <score> | <wdl>` lines or supplied directly.
#[derive(Clone)]
pub struct InMemoryLoader {
    file_paths: Vec<String>,
    data: Arc<[Position]>,
}

impl InMemoryLoader {
    pub fn from_text_file(file_path: &str) -> io::Result<Self> {
        let reader = BufReader::new(File::open(file_path)?);
        let mut data = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            let pos = line
                .parse::<Position>()
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("line {}: {e}", line_no + 1)))?;

            data.push(pos);
        }

        Ok(Self { file_paths: vec![file_path.to_string()], data: data.into() })
    }

    pub fn from_positions(data: Vec<Position>) -> Self {
        Self { file_paths: Vec::new(), data: data.into() }
    }
}

impl DataLoader for InMemoryLoader {
    fn data_file_paths(&self) -> &[String] {
        &self.file_paths
    }

    fn count_positions(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }

    fn map_batches<F: FnMut(&[Position]) -> bool>(&self, batch_size: usize, mut f: F) {
        assert!(batch_size > 0, "Batch size must be positive!");

        if self.data.is_empty() {
            return;
        }

        'dataloading: loop {
            for batch in self.data.chunks(batch_size) {
                if f(batch) {
                    break 'dataloading;
                }
            }
        }
    }
}
