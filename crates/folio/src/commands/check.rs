//! `folio check` command implementation.

use clap::Args;
use folio_config::CliSettings;
use folio_site::SiteBuilder;

use super::{ConfigArg, print_report};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    config: ConfigArg,
}

impl CheckArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load(&CliSettings::default())?;
        let report = SiteBuilder::new(&config).check()?;
        print_report(&output, &report);
        output.success("No blocking problems found");
        Ok(())
    }
}
