use std::process;

use anyhow::Context;
use clap::Parser;

use rusty_malus::app;
use rusty_malus::cli::Cli;
use rusty_malus::pipeline;
use rusty_malus::render::timestamp;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.load_config()?;
    let stamp = timestamp(&chrono::Local::now());

    let mut stdout = std::io::stdout().lock();
    let outcome = pipeline::run(&config, &stamp, &mut stdout)
        .with_context(|| format!("analysing {} entries", config.entries.len()))?;
    drop(stdout);

    if !outcome.analysis.skipped.is_empty() {
        log::warn!(
            "{} of {} entries were skipped",
            outcome.analysis.skipped.len(),
            config.entries.len()
        );
    }

    if config.show {
        app::show(outcome)?;
    }
    Ok(())
}
