/// Contains the position type, board coordinate helpers and the
/// `SparseInputType` trait with the `HalfKp` input type.
pub mod game;

/// Terminal output helpers.
pub mod logger;

/// Describes the network trained on these inputs, and converts its
/// trained weights into the quantised format used by the engine.
pub mod nn;

/// Data loading and batch preparation: positions in, sparse feature
/// indices and training targets out.
pub mod value;

pub use game::{
    inputs::{HalfKp, SparseInputType},
    position::{Color, Piece, Position},
};
pub use nn::NetworkConfig;
pub use value::{
    dataloader::{BatchPipeline, PipelineSettings},
    loader::{DataLoader, DirectSequentialDataLoader, InMemoryLoader, PreparedData, SparseInput},
    target::TargetBlend,
};
