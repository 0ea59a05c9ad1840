use crate::game::{
    position::{Color, Piece, Position},
    square::{is_queen_side, king_bucket, mirror_square, relative_square},
};

use super::SparseInputType;

/// King-relative piece-square inputs, with the king mirrored onto the king
/// side so only 32 king buckets are needed. Each piece also activates a
/// king-independent "virtual" feature, stored after all the real features.
#[derive(Clone, Copy, Debug, Default)]
pub struct HalfKp;

impl HalfKp {
    pub const KING_BUCKETS: usize = 32;
    /// Five non-king piece types, for each of "ours" and "theirs".
    pub const RELATIONS: usize = 10;
    pub const SQUARES: usize = 64;

    /// 30 non-king pieces, each with a real and a virtual feature.
    const MAX_ACTIVE: usize = 60;

    pub const fn real_features(&self) -> usize {
        Self::KING_BUCKETS * Self::RELATIONS * Self::SQUARES
    }

    pub const fn virtual_features(&self) -> usize {
        Self::RELATIONS * Self::SQUARES
    }

    /// Index of the first virtual feature.
    pub const fn virtual_offset(&self) -> usize {
        self.real_features()
    }

    /// Returns `(real, virtual)`, with the virtual index not yet offset
    /// by [`HalfKp::virtual_offset`].
    pub fn feature_index(&self, piece_sq: usize, piece: Piece, king_sq: usize, view: Color) -> (usize, usize) {
        assert!(!piece.is_king(), "Kings are not encoded as features!");
        debug_assert!(piece_sq < 64 && king_sq < 64);

        let relation = 5 * usize::from(piece.color() == view) + piece.kind();

        let mut rel_king = relative_square(view, king_sq);
        let mut rel_piece = relative_square(view, piece_sq);

        if is_queen_side(rel_king) {
            rel_king = mirror_square(rel_king);
            rel_piece = mirror_square(rel_piece);
        }

        let real = Self::SQUARES * Self::RELATIONS * king_bucket(rel_king) + Self::SQUARES * relation + rel_piece;
        let virt = Self::SQUARES * relation + rel_piece;

        (real, virt)
    }
}

impl SparseInputType for HalfKp {
    fn num_inputs(&self) -> usize {
        self.real_features() + self.virtual_features()
    }

    fn max_active(&self) -> usize {
        Self::MAX_ACTIVE
    }

    fn map_features<F: FnMut(usize, usize)>(&self, pos: &Position, mut f: F) {
        let stm = pos.stm();
        let stm_king = pos.king_sq(stm);
        let nstm_king = pos.king_sq(!stm);
        let offset = self.virtual_offset();

        for (piece, sq) in pos.into_iter() {
            if piece.is_king() {
                continue;
            }

            let (stm_real, stm_virtual) = self.feature_index(sq, piece, stm_king, stm);
            let (nstm_real, nstm_virtual) = self.feature_index(sq, piece, nstm_king, !stm);

            f(stm_real, nstm_real);
            f(offset + stm_virtual, offset + nstm_virtual);
        }
    }

    fn shorthand(&self) -> String {
        format!("halfkp{}", Self::KING_BUCKETS)
    }

    fn description(&self) -> String {
        "Horizontally mirrored halfkp inputs, with virtual psqt features".to_string()
    }

    fn is_factorised(&self) -> bool {
        true
    }

    fn merge_factoriser(&self, unmerged: Vec<f32>) -> Vec<f32> {
        let src_size = self.num_inputs();

        assert_eq!(unmerged.len() % src_size, 0);
        let layer_size = unmerged.len() / src_size;
        let offset = self.virtual_offset();
        let block = self.virtual_features();

        (0..self.real_features() * layer_size)
            .map(|elem| {
                let feat = elem / layer_size;
                let idx = elem % layer_size;
                let virt = offset + feat % block;

                unmerged[layer_size * feat + idx] + unmerged[layer_size * virt + idx]
            })
            .collect()
    }
}
