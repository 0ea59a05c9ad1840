/// Contains the `SparseInputType` trait and the `HalfKp` input type.
pub mod inputs;
/// Training sample representation.
pub mod position;
/// Board coordinate helpers and the king bucket table.
pub mod square;

/// Contains data formats
pub mod formats {
    pub use bulletformat;
}
