//! `folio serve` command implementation.

use clap::Args;
use folio_server::{ServeOptions, serve};

use super::{AddressArgs, ConfigArg};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    #[command(flatten)]
    config: ConfigArg,

    #[command(flatten)]
    address: AddressArgs,
}

impl ServeArgs {
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load(&self.address.into_settings())?;
        let options = ServeOptions::from_config(&config, config.paths.out_dir.clone());

        output.info(&format!("Serving {}", options.site_dir.display()));
        output.highlight(&options.url());
        serve(options).await?;
        Ok(())
    }
}
