mod direct;
mod text;

pub use direct::DirectSequentialDataLoader;
pub use text::InMemoryLoader;

use crate::game::{inputs::SparseInputType, position::Position};

use super::target::TargetBlend;

/// Dictates how data is read from a file into positions.
/// This allows for the file format to be divorced from the training
/// data format.
pub trait DataLoader: Clone + Send + Sync + 'static {
    fn data_file_paths(&self) -> &[String];

    fn count_positions(&self) -> Option<u64> {
        None
    }

    /// Calls `f` on consecutive batches, looping over the data until `f`
    /// returns `true`.
    fn map_batches<F: FnMut(&[Position]) -> bool>(&self, batch_size: usize, f: F);
}

/// Feature indices for one perspective, `max_active` slots per row.
/// Unused slots hold `-1`.
#[derive(Clone, Debug, Default)]
pub struct SparseInput {
    value: Vec<i32>,
    max_active: usize,
    num_inputs: usize,
}

impl SparseInput {
    fn reset(&mut self, batch_size: usize, max_active: usize, num_inputs: usize) {
        self.value.clear();
        self.value.resize(max_active * batch_size, -1);
        self.max_active = max_active;
        self.num_inputs = num_inputs;
    }

    pub fn values(&self) -> &[i32] {
        &self.value
    }

    pub fn max_active(&self) -> usize {
        self.max_active
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    /// Active features of row `b`, in the order they were written.
    pub fn row(&self, b: usize) -> &[i32] {
        let row = &self.value[self.max_active * b..self.max_active * (b + 1)];
        let len = row.iter().position(|&feat| feat == -1).unwrap_or(row.len());
        &row[..len]
    }

    /// All `(row, feature)` pairs. Duplicates are kept.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.value
            .chunks(self.max_active.max(1))
            .enumerate()
            .flat_map(|(b, row)| row.iter().take_while(|&&feat| feat != -1).map(move |&feat| (b, feat as usize)))
    }

    pub fn active(&self) -> usize {
        self.value.iter().filter(|&&feat| feat != -1).count()
    }
}

/// A batch of encoded positions.
#[derive(Clone)]
pub struct PreparedData<I: SparseInputType> {
    input_getter: I,
    blend: TargetBlend,
    batch_size: usize,
    stm: SparseInput,
    nstm: SparseInput,
    targets: Vec<f32>,
}

impl<I: SparseInputType> PreparedData<I> {
    pub fn new(input_getter: I, blend: TargetBlend, data: &[Position], threads: usize) -> Self {
        let mut prep = Self {
            input_getter,
            blend,
            batch_size: 0,
            stm: SparseInput::default(),
            nstm: SparseInput::default(),
            targets: Vec::new(),
        };

        prep.load(data, threads);
        prep
    }

    /// Encodes `data`, replacing the previous contents. Rows are split
    /// into contiguous chunks, one thread per chunk, and each thread only
    /// writes to the slots of its own rows.
    pub fn load(&mut self, data: &[Position], threads: usize) {
        assert!(threads > 0, "Need at least one thread to prepare data!");
        self.blend.assert_valid();

        let batch_size = data.len();
        let max_active = self.input_getter.max_active();
        let input_size = self.input_getter.num_inputs();
        let chunk_size = batch_size.div_ceil(threads).max(1);
        let sparse_chunk_size = max_active * chunk_size;

        self.batch_size = batch_size;
        self.stm.reset(batch_size, max_active, input_size);
        self.nstm.reset(batch_size, max_active, input_size);
        self.targets.clear();
        self.targets.resize(batch_size, 0.0);

        let inp = &self.input_getter;
        let blend = &self.blend;

        std::thread::scope(|s| {
            data.chunks(chunk_size)
                .zip(self.stm.value.chunks_mut(sparse_chunk_size))
                .zip(self.nstm.value.chunks_mut(sparse_chunk_size))
                .zip(self.targets.chunks_mut(chunk_size))
                .for_each(|(((data_chunk, stm_chunk), nstm_chunk), results_chunk)| {
                    s.spawn(move || {
                        for (i, pos) in data_chunk.iter().enumerate() {
                            let mut j = 0;
                            let sparse_offset = max_active * i;

                            inp.map_features(pos, |our, opp| {
                                assert!(j < max_active, "More inputs provided than the specified maximum!");
                                assert!(
                                    our < input_size && opp < input_size,
                                    "Input feature index exceeded input size!"
                                );

                                stm_chunk[sparse_offset + j] = our as i32;
                                nstm_chunk[sparse_offset + j] = opp as i32;

                                j += 1;
                            });

                            results_chunk[i] = blend.target(pos.score(), pos.wdl());
                        }
                    });
                });
        });
    }

    pub fn input_getter(&self) -> &I {
        &self.input_getter
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Features from the side to move's perspective.
    pub fn stm(&self) -> &SparseInput {
        &self.stm
    }

    /// Features from the other side's perspective.
    pub fn nstm(&self) -> &SparseInput {
        &self.nstm
    }

    pub fn targets(&self) -> &[f32] {
        &self.targets
    }
}
