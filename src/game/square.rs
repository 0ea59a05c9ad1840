use super::position::Color;

/// Files `a` through `d`.
const QUEEN_SIDE: u64 = 0x0F0F_0F0F_0F0F_0F0F;

/// Maps each king square to one of 32 buckets. Files are folded towards
/// the centre, so a square and its horizontal mirror share a bucket.
#[rustfmt::skip]
pub const KING_BUCKETS: [usize; 64] = [
     3,  2,  1,  0,  0,  1,  2,  3,
     7,  6,  5,  4,  4,  5,  6,  7,
    11, 10,  9,  8,  8,  9, 10, 11,
    15, 14, 13, 12, 12, 13, 14, 15,
    19, 18, 17, 16, 16, 17, 18, 19,
    23, 22, 21, 20, 20, 21, 22, 23,
    27, 26, 25, 24, 24, 25, 26, 27,
    31, 30, 29, 28, 28, 29, 30, 31,
];

pub const fn file_of(sq: usize) -> usize {
    sq % 8
}

pub const fn rank_of(sq: usize) -> usize {
    sq / 8
}

pub const fn square(rank: usize, file: usize) -> usize {
    rank * 8 + file
}

/// Rank of `sq` as seen by `color`, so that each side's back rank is rank 0.
pub const fn relative_rank(color: Color, sq: usize) -> usize {
    match color {
        Color::White => rank_of(sq),
        Color::Black => 7 - rank_of(sq),
    }
}

pub const fn relative_square(color: Color, sq: usize) -> usize {
    square(relative_rank(color, sq), file_of(sq))
}

/// Flips the square horizontally, `a1 <-> h1`.
pub const fn mirror_square(sq: usize) -> usize {
    square(rank_of(sq), 7 - file_of(sq))
}

pub const fn is_queen_side(sq: usize) -> bool {
    (QUEEN_SIDE >> sq) & 1 == 1
}

/// Does not mirror, callers are expected to have moved the
/// king onto the king side first.
pub fn king_bucket(sq: usize) -> usize {
    KING_BUCKETS[sq]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates() {
        assert_eq!(file_of(12), 4);
        assert_eq!(rank_of(12), 1);
        assert_eq!(square(1, 4), 12);

        for sq in 0..64 {
            assert_eq!(square(rank_of(sq), file_of(sq)), sq);
        }
    }

    #[test]
    fn mirroring_is_an_involution() {
        for sq in 0..64 {
            assert_eq!(mirror_square(mirror_square(sq)), sq);
            assert_eq!(rank_of(mirror_square(sq)), rank_of(sq));
            assert_eq!(file_of(mirror_square(sq)), 7 - file_of(sq));
        }
    }

    #[test]
    fn relative_rank_flips_for_black_only() {
        for sq in 0..64 {
            assert_eq!(relative_rank(Color::White, sq), rank_of(sq));
            assert_eq!(relative_rank(Color::Black, sq), 7 - rank_of(sq));

            assert_eq!(relative_square(Color::White, sq), sq);
            assert_eq!(relative_square(Color::Black, sq), sq ^ 56);
            assert_eq!(relative_square(Color::Black, relative_square(Color::Black, sq)), sq);
        }
    }

    #[test]
    fn queen_side_is_files_a_to_d() {
        for sq in 0..64 {
            assert_eq!(is_queen_side(sq), file_of(sq) < 4);
            assert_ne!(is_queen_side(sq), is_queen_side(mirror_square(sq)));
        }
    }

    #[test]
    fn buckets_fold_mirrored_files() {
        let mut seen = [false; 32];

        for sq in 0..64 {
            let bucket = king_bucket(sq);
            assert!(bucket < 32);
            assert_eq!(bucket, king_bucket(mirror_square(sq)));

            if !is_queen_side(sq) {
                seen[bucket] = true;
            }
        }

        assert!(seen.iter().all(|&x| x), "Every bucket is reachable from the king side");
    }
}
