//! `folio start` command implementation.

use std::path::Path;

use clap::Args;
use folio_server::ServeOptions;

use super::{AddressArgs, ConfigArg};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the start command.
#[derive(Args)]
pub(crate) struct StartArgs {
    #[command(flatten)]
    config: ConfigArg,

    #[command(flatten)]
    address: AddressArgs,
}

impl StartArgs {
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let settings = self.address.into_settings();
        let config = self.config.load(&settings)?;

        ensure_project_dir(&config.paths.project_dir)?;

        let options = ServeOptions::from_config(&config, config.paths.dev_dir());
        output.info(&format!(
            "Watching {} (drafts included)",
            config.paths.source_dir.display()
        ));
        output.highlight(&options.url());

        folio_server::start(config, settings).await?;
        Ok(())
    }
}

/// Ensure the `.folio/` project directory exists with a `.gitignore`.
fn ensure_project_dir(project_dir: &Path) -> Result<(), CliError> {
    std::fs::create_dir_all(project_dir)?;

    let gitignore_path = project_dir.join(".gitignore");
    if !gitignore_path.exists() {
        std::fs::write(&gitignore_path, "# Automatically created by folio\n*\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_project_dir_gets_gitignore() {
        let dir = tempfile::tempdir().unwrap();
        let project_dir = dir.path().join(".folio");
        ensure_project_dir(&project_dir).unwrap();
        assert_eq!(
            std::fs::read_to_string(project_dir.join(".gitignore")).unwrap(),
            "# Automatically created by folio\n*\n"
        );
    }

    #[test]
    fn test_existing_gitignore_kept() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "custom\n").unwrap();
        ensure_project_dir(dir.path()).unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join(".gitignore")).unwrap(),
            "custom\n"
        );
    }
}
