//! `folio deploy` command implementation.

use clap::Args;
use folio_config::CliSettings;
use folio_site::{DeployOutcome, GitPublisher, PublishConfig};

use super::ConfigArg;
use super::build::build_site;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the deploy command.
#[derive(Args)]
pub(crate) struct DeployArgs {
    #[command(flatten)]
    config: ConfigArg,

    /// Publish the existing build output without rebuilding.
    #[arg(long)]
    pub skip_build: bool,

    /// Commit but don't push.
    #[arg(long)]
    pub dry_run: bool,

    /// Deploy branch (overrides config `deploy.branch`).
    #[arg(long)]
    pub branch: Option<String>,

    /// Git remote (overrides config `deploy.remote`).
    #[arg(long)]
    pub remote: Option<String>,
}

impl DeployArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load(&CliSettings::default())?;

        let remote = match self.remote {
            Some(remote) => remote,
            None => config.deploy_remote()?,
        };
        let branch = self.branch.unwrap_or_else(|| config.deploy.branch.clone());

        if self.skip_build {
            output.info("Skipping build");
        } else {
            build_site(&config, &output)?;
        }

        output.info(&format!("Deploying to {remote} ({branch})"));
        let publisher = GitPublisher::new(PublishConfig {
            remote,
            branch,
            message: config.deploy.message.clone(),
            dry_run: self.dry_run,
        });
        match publisher.publish(&config.paths.out_dir)? {
            DeployOutcome::UpToDate => output.success("Deploy branch already up to date"),
            DeployOutcome::Committed { files } => {
                output.warning(&format!("Dry run: committed {files} files, not pushed"));
            }
            DeployOutcome::Pushed { files } => {
                output.success(&format!("Deployed {files} files"));
            }
        }
        Ok(())
    }
}
