use std::{
    fs::{self, File},
    io::{self, Read},
    mem::size_of,
};

use bulletformat::ChessBoard;
use rand::seq::SliceRandom;

use crate::game::position::Position;

use super::DataLoader;

const BUFFER_SIZE_MB: usize = 256;

/// Streams `bulletformat::ChessBoard` records from one or more files,
/// in order, looping back to the first file at the end.
#[derive(Clone)]
pub struct DirectSequentialDataLoader {
    file_paths: Vec<String>,
    shuffle: bool,
}

impl DirectSequentialDataLoader {
    pub fn new(file_paths: &[&str]) -> io::Result<Self> {
        let file_paths = file_paths.iter().map(|path| path.to_string()).collect::<Vec<_>>();

        for path in &file_paths {
            let size = fs::metadata(path)?.len();

            if size % size_of::<ChessBoard>() as u64 != 0 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("File [{path}] does not have a multiple of {} size!", size_of::<ChessBoard>()),
                ));
            }
        }

        Ok(Self { file_paths, shuffle: false })
    }

    /// Shuffle each buffer-load of positions before batching.
    pub fn shuffled(mut self) -> Self {
        self.shuffle = true;
        self
    }

    fn read_chunk(file: &mut File, bytes: &mut [u8], positions: &mut Vec<Position>) -> io::Result<usize> {
        let record = size_of::<ChessBoard>();
        let mut filled = 0;

        while filled < bytes.len() {
            match file.read(&mut bytes[filled..])? {
                0 => break,
                n => filled += n,
            }
        }

        positions.clear();
        let mut skipped = 0;
        let mut last_error = None;

        for chunk in bytes[..filled - filled % record].chunks_exact(record) {
            // any bit pattern is a valid `ChessBoard`
            let board = unsafe { std::ptr::read_unaligned(chunk.as_ptr().cast::<ChessBoard>()) };

            match Position::try_from(board) {
                Ok(pos) => positions.push(pos),
                Err(e) => {
                    skipped += 1;
                    last_error = Some(e);
                }
            }
        }

        if let Some(e) = last_error {
            println!("Skipped {skipped} invalid positions, last error: {e}");
        }

        Ok(filled)
    }
}

impl DataLoader for DirectSequentialDataLoader {
    fn data_file_paths(&self) -> &[String] {
        &self.file_paths
    }

    fn count_positions(&self) -> Option<u64> {
        let mut total = 0;

        for path in &self.file_paths {
            total += fs::metadata(path).ok()?.len();
        }

        Some(total / size_of::<ChessBoard>() as u64)
    }

    fn map_batches<F: FnMut(&[Position]) -> bool>(&self, batch_size: usize, mut f: F) {
        assert!(batch_size > 0, "Batch size must be positive!");

        let record = size_of::<ChessBoard>();
        let batches_per_load = (BUFFER_SIZE_MB * 1024 * 1024 / record / batch_size).max(1);
        let mut bytes = vec![0u8; record * batch_size * batches_per_load];
        let mut positions = Vec::with_capacity(batch_size * batches_per_load);
        let mut rng = rand::thread_rng();

        'dataloading: loop {
            let mut loaded_any = false;

            for path in &self.file_paths {
                let mut file = match File::open(path) {
                    Ok(file) => file,
                    Err(e) => {
                        println!("Failed to open [{path}]: {e}");
                        break 'dataloading;
                    }
                };

                loop {
                    let filled = match Self::read_chunk(&mut file, &mut bytes, &mut positions) {
                        Ok(filled) => filled,
                        Err(e) => {
                            println!("Failed to read [{path}]: {e}");
                            break 'dataloading;
                        }
                    };

                    if filled == 0 {
                        break;
                    }

                    if self.shuffle {
                        positions.shuffle(&mut rng);
                    }

                    for batch in positions.chunks(batch_size) {
                        loaded_any = true;

                        if f(batch) {
                            break 'dataloading;
                        }
                    }
                }
            }

            if !loaded_any {
                break;
            }
        }
    }
}
