//! Command line definitions.

use clap::{Parser, Subcommand};

use playtest_core::model::{BlockId, GameMode, UserId};
use services::SessionLength;

/// Adaptive multiple-choice practice with Luminarias rewards.
#[derive(Parser, Debug)]
#[command(name = "playtest", version, about)]
pub struct Cli {
    /// `SQLite` database URL or file path
    #[arg(long, global = true, env = "PLAYTEST_DB_URL", default_value = "sqlite:playtest.sqlite3")]
    pub db: String,

    /// Learner the command acts for
    #[arg(long, global = true, env = "PLAYTEST_USER_ID", default_value = "1")]
    pub user: UserId,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load a demo question block
    Seed {
        #[arg(long, default_value = "1")]
        block: BlockId,
    },
    /// Show the adaptive draw for a block without answering it
    Plan {
        #[arg(long)]
        block: BlockId,
        /// quick, recommended, intensive, all or a question count
        #[arg(long, default_value = "recommended")]
        count: SessionLength,
    },
    /// Answer a session interactively on stdin
    Practice {
        #[arg(long)]
        block: BlockId,
        #[arg(long, default_value = "recommended")]
        count: SessionLength,
        #[arg(long, default_value = "classic")]
        mode: GameMode,
    },
    /// Credit the reward for an externally played session
    Reward {
        #[arg(long)]
        correct: u32,
        #[arg(long)]
        total: u32,
        #[arg(long, default_value = "classic")]
        mode: GameMode,
        #[arg(long)]
        victory: bool,
    },
    /// Show the Luminarias balance and recent history
    Balance {
        #[arg(long, default_value = "10")]
        limit: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_practice_with_globals_after_subcommand() {
        let cli = Cli::try_parse_from([
            "playtest", "practice", "--block", "3", "--count", "quick", "--mode", "exam",
            "--user", "7",
        ])
        .unwrap();
        assert_eq!(cli.user, UserId::new(7));
        match cli.command {
            Command::Practice { block, count, mode } => {
                assert_eq!(block, BlockId::new(3));
                assert_eq!(count, SessionLength::Quick);
                assert_eq!(mode, GameMode::Exam);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_zero_length() {
        assert!(Cli::try_parse_from(["playtest", "plan", "--block", "1", "--count", "0"]).is_err());
    }

    #[test]
    fn reward_flags() {
        let cli = Cli::try_parse_from([
            "playtest", "reward", "--correct", "3", "--total", "10", "--mode", "duel", "--victory",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Reward { correct: 3, total: 10, victory: true, .. }
        ));
    }
}
