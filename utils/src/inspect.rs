use std::{path::PathBuf, time::Instant};

use anyhow::{bail, Context};
use halfkp::{
    logger::{ansi, report_encoding_progress, seconds_to_hms},
    BatchPipeline, DataLoader, DirectSequentialDataLoader, HalfKp, PipelineSettings, SparseInputType, TargetBlend,
};
use structopt::StructOpt;

#[derive(StructOpt)]
pub struct InspectOptions {
    #[structopt(required = true, short, long)]
    input: PathBuf,
    #[structopt(short, long, default_value = "4")]
    threads: usize,
    #[structopt(short, long, default_value = "16384")]
    batch_size: usize,
    #[structopt(short = "n", long, default_value = "64")]
    batches: usize,
    #[structopt(long)]
    shuffle: bool,
}

impl InspectOptions {
    pub fn run(&self) -> anyhow::Result<()> {
        if self.threads == 0 || self.batch_size == 0 {
            bail!("Threads and batch size must both be positive.");
        }

        let path = self.input.to_str().with_context(|| "Input path is not valid UTF-8.")?;
        let mut loader = DirectSequentialDataLoader::new(&[path]).with_context(|| "Failed to create dataloader.")?;

        if self.shuffle {
            loader = loader.shuffled();
        }

        let inputs = HalfKp;
        let blend = TargetBlend::default();

        println!("# [Inspecting Data]");
        println!("Positions              : {}", ansi(loader.count_positions().unwrap_or(0), 31));
        println!("Inputs                 : {}", ansi(inputs.shorthand(), "32;1"));
        println!("Target                 : {}", blend.colourful());

        let settings = PipelineSettings {
            batch_size: self.batch_size,
            threads: self.threads,
            batch_queue_size: 32,
            max_batches: Some(self.batches),
        };

        let timer = Instant::now();
        let mut batches = 0;
        let mut positions = 0;
        let mut stm_active = 0;
        let mut nstm_active = 0;
        let mut target_sum = 0.0;

        for prepared in BatchPipeline::spawn(loader, inputs, blend, settings) {
            batches += 1;
            positions += prepared.batch_size();
            stm_active += prepared.stm().active();
            nstm_active += prepared.nstm().active();
            target_sum += prepared.targets().iter().map(|&x| f64::from(x)).sum::<f64>();

            if batches % 16 == 0 {
                report_encoding_progress(batches, positions, &timer);
            }
        }

        if positions == 0 {
            bail!("No valid positions found in {}", self.input.display());
        }

        let (hours, minutes, seconds) = seconds_to_hms(timer.elapsed().as_secs() as u32);

        println!();
        println!("SUMMARY:");
        println!("Encoded {positions} Positions in {batches} batches, took {hours}h {minutes}m {seconds}s");
        println!("Mean stm features       : {:.2}", stm_active as f64 / positions as f64);
        println!("Mean nstm features      : {:.2}", nstm_active as f64 / positions as f64);
        println!("Mean target             : {:.4}", target_sum / positions as f64);

        Ok(())
    }
}
