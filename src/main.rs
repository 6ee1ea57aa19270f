use clap::Parser;
use shaderview::{config::Args, run_viewer};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    run_viewer(&args)?;
    Ok(())
}
