use anyhow::Context;
use clap::Parser;
use img_shrink::cli::Args;
use img_shrink::logger::{self, Verbosity};
use img_shrink::{run_batch, Config};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::set_verbosity(Verbosity::from_flags(args.quiet, args.verbose));

    let config = Config::from_args(&args).context("invalid configuration")?;
    let summary = run_batch(&config)
        .with_context(|| format!("failed to process {}", config.root_dir.display()))?;

    // per-image failures were already reported and do not change the exit code
    if summary.failed > 0 {
        img_shrink::verbose!("{} of {} images failed", summary.failed, summary.discovered);
    }
    Ok(())
}
