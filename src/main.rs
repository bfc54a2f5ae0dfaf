use anyhow::{Context, Result};
use clap::Parser;

use cwnd_plot::app;
use cwnd_plot::config::{CliArgs, Config};
use cwnd_plot::render::PlotRenderer;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    let config = Config::from_args(&args).context("invalid configuration")?;
    log::debug!("running with {config:?}");

    let renderer = PlotRenderer::new(&config.chart).context("invalid chart style")?;
    let output = app::run(&config, &renderer)?;

    println!("chart saved as: {}", output.display());
    Ok(())
}
