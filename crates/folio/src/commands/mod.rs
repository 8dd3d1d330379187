//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod check;
pub(crate) mod deploy;
pub(crate) mod serve;
pub(crate) mod start;

use std::path::PathBuf;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_site::BuildReport;

use crate::error::CliError;
use crate::output::Output;

pub(crate) use build::BuildArgs;
pub(crate) use check::CheckArgs;
pub(crate) use deploy::DeployArgs;
pub(crate) use serve::ServeArgs;
pub(crate) use start::StartArgs;

/// `--config` option shared by every command.
#[derive(Args, Debug)]
pub(crate) struct ConfigArg {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl ConfigArg {
    pub(crate) fn load(&self, settings: &CliSettings) -> Result<Config, CliError> {
        Ok(Config::load(self.config.as_deref(), Some(settings))?)
    }
}

/// `--host`/`--port` options of the server commands.
#[derive(Args, Debug)]
pub(crate) struct AddressArgs {
    /// Host to bind to (overrides config).
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl AddressArgs {
    pub(crate) fn into_settings(self) -> CliSettings {
        CliSettings {
            host: self.host,
            port: self.port,
            ..CliSettings::default()
        }
    }
}

/// Print the outcome of a build or check.
pub(crate) fn print_report(output: &Output, report: &BuildReport) {
    output.info(&format!(
        "{} from {} ({} in navigation)",
        plural(report.pages, "page"),
        plural(report.documents, "document"),
        report.referenced_documents
    ));
    let issues = report.warnings.len() + report.broken_links.len();
    if issues > 0 {
        output.warning(&format!(
            "{} and {} reported above",
            plural(report.warnings.len(), "warning"),
            plural(report.broken_links.len(), "broken link"),
        ));
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plural() {
        assert_eq!(plural(0, "page"), "0 pages");
        assert_eq!(plural(1, "page"), "1 page");
        assert_eq!(plural(2, "broken link"), "2 broken links");
    }

    #[test]
    fn test_address_settings() {
        let settings = AddressArgs {
            host: Some("0.0.0.0".to_owned()),
            port: None,
        }
        .into_settings();
        assert_eq!(settings.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(settings.port, None);
        assert_eq!(settings.out_dir, None);
    }
}
