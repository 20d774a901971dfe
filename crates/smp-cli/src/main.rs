use std::path::PathBuf;

use clap::Parser;
use color_eyre::{eyre::eyre, Report, Result, Section};
use smp_core::{Config, RemapError};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "smp_core=info,wasm_sourcemap_path=info";

#[derive(Parser, Debug)]
#[command(
    name = "wasm-sourcemap-path",
    version,
    about = "Rewrite build-machine paths in a source map into fetchable source urls"
)]
struct Cli {
    /// Source map produced by the build
    #[arg(value_name = "INPUT-MAP")]
    input: PathBuf,
    /// Where to write the rewritten source map
    #[arg(value_name = "OUTPUT-MAP")]
    output: PathBuf,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing();

    let config = Config::from_env().map_err(report)?;
    tracing::debug!(build_root = config.build_root(), "starting");
    let summary =
        smp_core::remap_source_map_file(&cli.input, &cli.output, config).map_err(report)?;
    tracing::debug!(
        remapped = summary.remapped,
        unchanged = summary.unchanged,
        "done"
    );
    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("SMP_LOG").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn report(err: anyhow::Error) -> Report {
    let remap = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<RemapError>())
        .cloned();
    let report = eyre!("{err:?}");
    let Some(remap) = remap else {
        return report;
    };
    let report = report.with_note(|| format!("error code {}", remap.code()));
    match remap.hint() {
        Some(hint) => report.suggestion(hint),
        None => report,
    }
}
