use anyhow::Context;
use bulletformat::{ChessBoard, DataLoader};
use halfkp::game::square::{is_queen_side, king_bucket, mirror_square};
use structopt::StructOpt;

use std::path::PathBuf;

const NUM_BUCKETS: usize = 32;

#[derive(StructOpt)]
pub struct BucketOptions {
    #[structopt(required = true, min_values = 1)]
    pub inputs: Vec<PathBuf>,
}

impl BucketOptions {
    pub fn run(&self) -> anyhow::Result<()> {
        let mut total_position_count = 0;
        let mut total_king_squares = [0usize; 64];
        let mut total_bucket_counts = [0usize; NUM_BUCKETS];

        for path in &self.inputs {
            println!("\nFile {}", path.display());
            let loader = DataLoader::<ChessBoard>::new(path, 256).with_context(|| "Failed to create dataloader.")?;

            let mut position_count = 0usize;
            let mut king_squares = [0usize; 64];
            let mut bucket_counts = [0usize; NUM_BUCKETS];

            // both king squares are already relative to their own side
            loader.map_positions(|pos| {
                let ours = usize::from(pos.our_ksq());
                let theirs = usize::from(pos.opp_ksq());

                position_count += 1;
                king_squares[ours] += 1;

                for ksq in [ours, theirs] {
                    let ksq = if is_queen_side(ksq) { mirror_square(ksq) } else { ksq };
                    bucket_counts[king_bucket(ksq)] += 1;
                }
            });

            println!("King bucket distribution from {position_count} positions (both perspectives):");
            print_buckets(&bucket_counts);

            total_position_count += position_count;
            for (total, count) in total_king_squares.iter_mut().zip(king_squares) {
                *total += count;
            }
            for (total, count) in total_bucket_counts.iter_mut().zip(bucket_counts) {
                *total += count;
            }
        }

        if self.inputs.len() != 1 {
            println!("\nTotal king bucket distribution from {total_position_count} positions:");
            print_buckets(&total_bucket_counts);
        }

        println!("\nTotal side-to-move king square counts:");
        print_board(total_king_squares);

        Ok(())
    }
}

fn print_buckets(counts: &[usize]) {
    for (bucket, count) in counts.iter().enumerate() {
        println!("Bucket {bucket}: {count}");
    }
}

fn print_board(arr: [usize; 64]) {
    let divider = format!("+{}", "------------+".repeat(8));

    println!("{divider}");
    for y in (0..8).rev() {
        print!("|");
        for x in 0..8 {
            print!("{: >11} |", arr[y * 8 + x]);
        }
        println!("\n{divider}");
    }
}
