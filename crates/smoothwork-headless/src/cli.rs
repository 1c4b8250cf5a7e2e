//! Command-line options

use std::path::PathBuf;

use clap::Parser;

use crate::constants::{env, paths};

/// Hydrate, validate, simulate and optionally export a workflow
#[derive(Debug, Clone, Parser)]
#[command(name = "smoothwork")]
#[command(about = "Validate, lay out, simulate and export Smoothwork workflows")]
#[command(version)]
pub struct Cli {
    /// Workflow file to import after hydration
    pub workflow: Option<PathBuf>,

    /// Run auto-layout before simulating
    #[arg(long)]
    pub layout: bool,

    /// Directory to write `workflow.json` into
    #[arg(long = "export", value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Directory holding the saved workflow and `editor.json`
    #[arg(long, env = env::DATA_DIR, default_value = paths::DATA_DIR)]
    pub data_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_all_options() {
        let cli = Cli::try_parse_from([
            "smoothwork",
            "flow.json",
            "--layout",
            "--export",
            "out",
            "--data-dir",
            "state",
        ])
        .unwrap();

        assert_eq!(cli.workflow, Some(PathBuf::from("flow.json")));
        assert!(cli.layout);
        assert_eq!(cli.export_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.data_dir, PathBuf::from("state"));
    }

    #[test]
    fn test_bare_invocation() {
        let cli = Cli::try_parse_from(["smoothwork"]).unwrap();
        assert!(cli.workflow.is_none());
        assert!(!cli.layout);
        assert!(cli.export_dir.is_none());
    }

    #[test]
    fn test_rejected_arguments() {
        assert!(Cli::try_parse_from(["smoothwork", "--export"]).is_err());

        let unknown = Cli::try_parse_from(["smoothwork", "--fast"]).unwrap_err();
        assert_eq!(unknown.kind(), ErrorKind::UnknownArgument);

        assert!(Cli::try_parse_from(["smoothwork", "a.json", "b.json"]).is_err());
    }
}
