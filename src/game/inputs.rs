mod halfkp;

pub use halfkp::HalfKp;

use super::position::Position;

pub trait SparseInputType: Clone + Send + Sync + 'static {
    /// The total number of inputs
    fn num_inputs(&self) -> usize;

    /// The maximum number of active inputs
    fn max_active(&self) -> usize;

    /// Calls `f(stm, nstm)` once per active feature pair.
    fn map_features<F: FnMut(usize, usize)>(&self, pos: &Position, f: F);

    /// Shorthand for the input e.g. `halfkp32`
    fn shorthand(&self) -> String;

    /// Description of the input type
    fn description(&self) -> String;

    fn is_factorised(&self) -> bool {
        false
    }

    /// Folds factoriser weights back into the features they were derived
    /// from. `unmerged` is feature-major, `num_inputs() * layer_size` long.
    fn merge_factoriser(&self, unmerged: Vec<f32>) -> Vec<f32> {
        assert!(self.is_factorised());
        unmerged
    }
}
