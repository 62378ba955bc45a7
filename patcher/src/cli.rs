//! CLI argument definitions for the WAR patcher.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::download::DEFAULT_TIMEOUT_SECS;
use crate::library::ReplaceOptions;
use crate::pipeline::{DEFAULT_OUTPUT, PatchConfig};
use crate::repository::{MAVEN_CENTRAL, RepositoryUrl};
use crate::source::WarSource;
use camino::Utf8PathBuf;
use clap::Parser;
use std::time::Duration;

/// Replace or add library JARs inside a WAR package.
#[derive(Parser, Debug)]
#[command(name = "warpatch")]
#[command(version, about)]
#[command(long_about = concat!(
    "Replace or add library JARs inside a WAR package.\n\n",
    "The WAR is copied (or downloaded, when given an http(s) URL) to the output ",
    "path, unpacked, patched and repacked in place. Each library coordinate is ",
    "fetched from the artifact repository and written to ",
    "WEB-INF/lib/<artifactId>-<version>.jar, overwriting a file of the same ",
    "name. Other versions of the same artifact are kept unless --prune-old is ",
    "given.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Upgrade a library in a local WAR:\n",
    "    $ warpatch target/app.war org.yaml:snakeyaml:2.2\n\n",
    "  Patch a WAR downloaded from a server, dropping the old version:\n",
    "    $ warpatch --prune-old https://ci.example/app.war \\\n",
    "        com.fasterxml.jackson.core:jackson-databind:2.17.1\n\n",
    "  Resolve libraries against a mirror:\n",
    "    $ warpatch -r https://mirror.example/maven2 app.war org.example:lib:1.0",
))]
pub struct Cli {
    /// WAR file path or http(s) URL to patch.
    #[arg(value_name = "WAR_FILE_OR_URL")]
    pub source: String,

    /// Library coordinates to place in WEB-INF/lib, applied in order.
    #[arg(value_name = "GROUP:ARTIFACT:VERSION", required = true, num_args = 1..)]
    pub libraries: Vec<String>,

    /// Path the patched WAR is written to.
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    pub output: Utf8PathBuf,

    /// Maven repository base URL libraries are downloaded from.
    #[arg(short, long, value_name = "URL", default_value = MAVEN_CENTRAL)]
    pub repository: RepositoryUrl,

    /// HTTP timeout in seconds for each download.
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Remove other versions of each replaced artifact from WEB-INF/lib.
    #[arg(long)]
    pub prune_old: bool,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Build the pipeline configuration for these arguments.
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use warpatch::cli::Cli;
    ///
    /// let cli = Cli::parse_from(["warpatch", "app.war", "org.example:lib:1.0"]);
    /// let config = cli.patch_config();
    /// assert_eq!(config.output.to_str(), Some("new.war"));
    /// assert_eq!(config.libraries, vec!["org.example:lib:1.0".to_owned()]);
    /// ```
    #[must_use]
    pub fn patch_config(&self) -> PatchConfig {
        PatchConfig {
            source: WarSource::parse(&self.source),
            libraries: self.libraries.clone(),
            output: self.output.clone().into_std_path_buf(),
            repository: self.repository.clone(),
            timeout: Duration::from_secs(self.timeout),
            replace: ReplaceOptions {
                prune_old: self.prune_old,
            },
            quiet: self.quiet,
        }
    }

    /// Return the default `env_logger` filter for the requested verbosity.
    ///
    /// `RUST_LOG` still takes precedence when set.
    #[must_use]
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
