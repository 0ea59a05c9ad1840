use std::{
    sync::mpsc::{self, Receiver},
    thread::{self, JoinHandle},
};

use crate::game::inputs::SparseInputType;

use super::{
    loader::{DataLoader, PreparedData},
    target::TargetBlend,
};

#[derive(Clone, Copy, Debug)]
pub struct PipelineSettings {
    pub batch_size: usize,
    /// Threads used to encode each batch.
    pub threads: usize,
    /// Number of batches that can be prepared and put in a queue before
    /// they are consumed.
    pub batch_queue_size: usize,
    /// Stop after this many batches, or keep looping over the data.
    pub max_batches: Option<usize>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self { batch_size: 16_384, threads: 4, batch_queue_size: 32, max_batches: None }
    }
}

/// Loads and encodes batches on a background thread, ahead of the consumer.
pub struct BatchPipeline<I: SparseInputType> {
    receiver: Receiver<PreparedData<I>>,
    worker: Option<JoinHandle<()>>,
}

impl<I: SparseInputType> BatchPipeline<I> {
    pub fn spawn<D: DataLoader>(loader: D, input_getter: I, blend: TargetBlend, settings: PipelineSettings) -> Self {
        assert!(settings.threads > 0, "Need at least one thread to prepare data!");
        blend.assert_valid();

        let (sender, receiver) = mpsc::sync_channel(settings.batch_queue_size);

        let worker = thread::spawn(move || {
            let mut batches = 0;

            if settings.max_batches == Some(0) {
                return;
            }

            loader.map_batches(settings.batch_size, |batch| {
                let prepared_data = PreparedData::new(input_getter.clone(), blend, batch, settings.threads);

                // receiver was dropped
                if sender.send(prepared_data).is_err() {
                    return true;
                }

                batches += 1;
                settings.max_batches.is_some_and(|max| batches >= max)
            });
        });

        Self { receiver, worker: Some(worker) }
    }

    /// Blocks until the next batch is ready, `None` once the loader
    /// has finished.
    pub fn recv(&self) -> Option<PreparedData<I>> {
        self.receiver.recv().ok()
    }
}

impl<I: SparseInputType> Iterator for BatchPipeline<I> {
    type Item = PreparedData<I>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.recv();

        if next.is_none() {
            if let Some(worker) = self.worker.take() {
                if worker.join().is_err() {
                    panic!("Batch preparation thread panicked!");
                }
            }
        }

        next
    }
}
