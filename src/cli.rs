use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// custody: terminal front end for the custodial wallet dashboard.
#[derive(Parser, Debug)]
#[command(name = "custody", version)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Directory holding the persisted session (overrides CUSTODY_STATE_DIR)
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account
    Register(RegisterArgs),

    /// Verify an email address with the token from the emailed link
    VerifyEmail {
        /// Verification token
        token: String,
    },

    /// Send the verification email again
    ResendVerification {
        email: String,
    },

    /// Sign in
    Login(LoginArgs),

    /// Sign out and forget the session
    Logout,

    /// Balance, balance history and recent activity
    Dashboard {
        /// Days of balance history
        #[arg(long, default_value = "7")]
        days: u32,
    },

    /// Wallet connection
    #[command(subcommand)]
    Wallet(WalletCommand),

    /// Deposit ETH from the connected wallet into the omnibus vault
    Deposit {
        /// Amount in ETH
        amount: String,
    },

    /// Withdraw ETH to a whitelisted address
    Withdraw(WithdrawArgs),

    /// Withdrawal whitelist
    #[command(subcommand)]
    Whitelist(WhitelistCommand),

    /// Daily withdrawal limit
    #[command(subcommand)]
    DailyLimit(DailyLimitCommand),

    /// Deposit and withdrawal history
    Activity {
        #[arg(long, value_enum)]
        direction: Option<DirectionArg>,
    },

    /// Administrator operations
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Show or change the color theme
    Theme {
        #[arg(value_enum)]
        mode: Option<ThemeArg>,
    },
}

#[derive(Parser, Debug)]
pub struct RegisterArgs {
    pub email: String,

    #[arg(long, env = "CUSTODY_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Password confirmation; defaults to --password
    #[arg(long, hide_env_values = true)]
    pub confirm: Option<String>,
}

#[derive(Parser, Debug)]
pub struct LoginArgs {
    pub email: String,

    #[arg(long, env = "CUSTODY_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Parser, Debug)]
pub struct WithdrawArgs {
    /// Recipient address
    pub to: String,

    /// Amount in ETH
    pub amount: String,

    /// Step-up password
    #[arg(long, env = "CUSTODY_WITHDRAW_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Subcommand, Debug)]
pub enum WalletCommand {
    /// Connect the wallet and switch it to the expected chain
    Connect,
    /// Forget the wallet binding
    Disconnect,
    /// Show the wallet account and chain
    Status,
}

#[derive(Subcommand, Debug)]
pub enum WhitelistCommand {
    List,
    Add { address: String },
    Remove { address: String },
}

#[derive(Subcommand, Debug)]
pub enum DailyLimitCommand {
    Get,
    /// Set the limit in ETH; 0 removes it
    Set { max_eth: String },
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// Vault balances, users and pending withdrawals
    Overview,
    Freeze { user_id: String },
    Unfreeze { user_id: String },
    /// Pause the omnibus vault
    Pause,
    Unpause,
    /// Move ETH from the omnibus into the cold vault
    ColdDeposit { amount: String },
    /// Cold vault to omnibus move
    #[command(subcommand)]
    ColdMove(ColdMoveCommand),
    /// Withdrawals waiting for manager approval
    Withdrawals,
    /// Details of one withdrawal request
    Withdrawal { tx_id: String },
    /// Manager-approve a withdrawal and execute it
    ApproveWithdrawal { tx_id: String },
    /// Transaction log
    Transactions {
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        /// Case-insensitive email substring
        #[arg(long, default_value = "")]
        email: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ColdMoveCommand {
    /// Request a move of AMOUNT ETH from the cold vault
    Request { amount: String },
    /// Record this administrator's approval; shows which admins have approved
    Approve { move_id: String },
    /// Execute an approved move
    ///
    /// The move is resumed by id, so no local approval state is checked.
    /// The backend refuses the move until both administrators have approved.
    Execute { move_id: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum DirectionArg {
    In,
    Out,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum KindArg {
    Deposit,
    Withdraw,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ThemeArg {
    Dark,
    Light,
    Toggle,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cold_move_execute_help_names_quorum_owner() {
        let mut cli = Cli::command();
        let execute = cli
            .find_subcommand_mut("admin")
            .and_then(|c| c.find_subcommand_mut("cold-move"))
            .and_then(|c| c.find_subcommand_mut("execute"))
            .unwrap();
        let help = execute.render_long_help().to_string();
        assert!(help.contains("backend refuses the move until both administrators"));
    }

    #[test]
    fn test_parse_cold_move_execute() {
        let cli = Cli::try_parse_from(["custody", "admin", "cold-move", "execute", "0xaa"]).unwrap();
        let Command::Admin(AdminCommand::ColdMove(ColdMoveCommand::Execute { move_id })) =
            cli.command
        else {
            panic!("unexpected command");
        };
        assert_eq!(move_id, "0xaa");
    }
}
