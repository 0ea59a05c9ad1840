mod buckets;
mod collapse;
mod inspect;

use structopt::StructOpt;

#[derive(StructOpt)]
pub enum Options {
    Collapse(collapse::CollapseOptions),
    Inspect(inspect::InspectOptions),
    Buckets(buckets::BucketOptions),
}

fn main() -> anyhow::Result<()> {
    match Options::from_args() {
        Options::Collapse(options) => options.run(),
        Options::Inspect(options) => options.run(),
        Options::Buckets(options) => options.run(),
    }
}
