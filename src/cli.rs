//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};

use crate::states::settings::OptimizationMode;

#[derive(Parser, Debug)]
#[command(
    name = "peg-playground",
    version,
    about = "Edit a PEG grammar and sample input side by side with live diagnostics"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Configuration file (defaults to the platform config directory).
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Engine program printing the JSON lint report (overrides config).
    #[arg(long, value_name = "CMD", global = true)]
    pub engine: Option<String>,

    /// Extra engine argument; repeat for several (overrides config).
    #[arg(long = "engine-arg", value_name = "ARG", global = true, allow_hyphen_values = true)]
    pub engine_args: Vec<String>,

    /// Settings store file (overrides config).
    #[arg(long, value_name = "PATH", global = true)]
    pub storage: Option<PathBuf>,

    /// Keep buffers and toggles in memory only.
    #[arg(long, conflicts_with = "storage", global = true)]
    pub ephemeral: bool,

    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Explicit log level (overrides -v/-q).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Launch the desktop playground (default).
    Gui,
    /// Analyze files once and print the diagnostics.
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Grammar file.
    #[arg(value_name = "GRAMMAR")]
    pub grammar: PathBuf,

    /// Input to parse with the grammar.
    #[arg(value_name = "CODE")]
    pub code: Option<PathBuf>,

    /// Input given inline instead of as a file.
    #[arg(long, value_name = "TEXT", conflicts_with = "code")]
    pub source: Option<String>,

    /// Optimization mode passed to the engine.
    #[arg(long, value_enum, default_value = "all")]
    pub opt: OptArg,

    /// Enable packrat parsing.
    #[arg(long)]
    pub packrat: bool,

    /// Print the AST (optimized when `--opt all`).
    #[arg(long)]
    pub ast: bool,

    /// Print the profile report.
    #[arg(long)]
    pub profile: bool,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OptArg {
    All,
    None,
}

impl From<OptArg> for OptimizationMode {
    fn from(value: OptArg) -> Self {
        match value {
            OptArg::All => OptimizationMode::All,
            OptArg::None => OptimizationMode::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Html,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_gui() {
        let cli = Cli::try_parse_from(["peg-playground"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.ephemeral);
    }

    #[test]
    fn storage_flags_work_after_the_subcommand() {
        let cli = Cli::try_parse_from(["peg-playground", "gui", "--ephemeral"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Gui)));
        assert!(cli.ephemeral);

        let cli = Cli::try_parse_from(["peg-playground", "gui", "--storage", "s.json"]).unwrap();
        assert_eq!(cli.storage, Some(PathBuf::from("s.json")));

        assert!(Cli::try_parse_from([
            "peg-playground",
            "gui",
            "--ephemeral",
            "--storage",
            "s.json"
        ])
        .is_err());
    }

    #[test]
    fn check_parses_flags() {
        let cli = Cli::try_parse_from([
            "peg-playground",
            "check",
            "calc.peg",
            "input.txt",
            "--opt",
            "none",
            "--packrat",
            "--format",
            "html",
            "--engine",
            "./lint",
        ])
        .unwrap();
        let Some(Command::Check(args)) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.grammar, PathBuf::from("calc.peg"));
        assert_eq!(args.code, Some(PathBuf::from("input.txt")));
        assert_eq!(OptimizationMode::from(args.opt), OptimizationMode::None);
        assert!(args.packrat);
        assert_eq!(args.format, OutputFormat::Html);
        assert_eq!(cli.engine.as_deref(), Some("./lint"));
    }
}
