use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;
use crate::logging::LogLevel;

/// Terminal task manager with a built-in Pomodoro timer.
/// Storage defaults to ~/.koto/koto.db or a path passed via --db.
#[derive(Parser)]
#[command(name = "koto", version, about = "Terminal task manager with Pomodoro timer")]
pub struct Cli {
    /// Path to the SQLite database file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Log level written to koto.log (overridden by KOTO_LOG).
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Defaults to `ui` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_ui() {
        let cli = Cli::try_parse_from(["koto"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, LogLevel::Info);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["koto", "list", "--db", "/tmp/x.db", "--status", "pending"]).unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        assert!(matches!(cli.command, Some(Commands::List { status: crate::fields::StatusFilter::Pending })));
    }
}
