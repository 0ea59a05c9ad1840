use std::{path::PathBuf, time::Instant};

use anyhow::Context;
use halfkp::{
    nn::export::RawNetwork,
    HalfKp, NetworkConfig,
};
use structopt::StructOpt;

#[derive(StructOpt)]
pub struct CollapseOptions {
    #[structopt(required = true, short, long)]
    input: PathBuf,
    #[structopt(required = true, short, long)]
    output: PathBuf,
}

impl CollapseOptions {
    pub fn run(&self) -> anyhow::Result<()> {
        let timer = Instant::now();
        let config = NetworkConfig::default();
        let inputs = HalfKp;

        let input = self.input.to_str().with_context(|| "Input path is not valid UTF-8.")?;
        let output = self.output.to_str().with_context(|| "Output path is not valid UTF-8.")?;

        println!("# [Collapsing Network]");
        config.display(&inputs);

        let raw = RawNetwork::read_from_file(input, &config, &inputs)
            .with_context(|| format!("Failed to read raw weights from {}", self.input.display()))?;

        let quantised = raw.collapse(&inputs).quantise(&config);

        quantised
            .write_to_file(output)
            .with_context(|| format!("Failed to write network to {}", self.output.display()))?;

        println!(
            "Wrote {} bytes to {} in {:.2} seconds",
            quantised.size_in_bytes(),
            self.output.display(),
            timer.elapsed().as_secs_f32()
        );

        Ok(())
    }
}
