/// Background batch preparation.
pub mod dataloader;
/// Data sources and the batch encoder.
pub mod loader;
/// Training target blending.
pub mod target;
