//! `folio build` command implementation.

use std::path::PathBuf;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_site::{BuildReport, SiteBuilder};

use super::{ConfigArg, print_report};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    config: ConfigArg,

    /// Output directory (overrides config `build.out_dir`).
    #[arg(short, long)]
    out_dir: Option<PathBuf>,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let settings = CliSettings {
            out_dir: self.out_dir,
            ..CliSettings::default()
        };
        let config = self.config.load(&settings)?;
        build_site(&config, &Output::new())?;
        Ok(())
    }
}

/// Build the production site and print a summary.
pub(crate) fn build_site(config: &Config, output: &Output) -> Result<BuildReport, CliError> {
    output.info(&format!(
        "Building {} from {}",
        config.title,
        config.paths.source_dir.display()
    ));
    let report = SiteBuilder::new(config).build()?;
    print_report(output, &report);
    output.success(&format!(
        "Site built to {} ({} written, {} unchanged, {} removed)",
        config.paths.out_dir.display(),
        report.written.written,
        report.written.unchanged,
        report.written.removed
    ));
    Ok(report)
}
