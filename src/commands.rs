//! One handler per subcommand. Each handler goes through the same page
//! controller the dashboard uses, then renders the result.

use std::fmt::Write as _;

use custody::pages::{
    ActivityPage, AdminPage, DashboardPage, DepositPage, LoginOutcome, LoginPage, RegisterPage,
    ReportStatus, VerifyEmailPage, VerifyOutcome, WithdrawForm, WithdrawRequestPage,
    WithdrawSettingsPage, WithdrawalApproval,
};
use custody::utils::{format_date, format_unix, truncate_address, truncate_tx_hash};
use custody::{
    AccountStatus, ColdMoveState, Custody, Direction, Route, Session, TransferKind,
    TxHistoryItem, WithdrawReceipt, WithdrawState,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::{
    AdminCommand, ColdMoveCommand, Command, DailyLimitCommand, DirectionArg, KindArg,
    LoginArgs, RegisterArgs, ThemeArg, WalletCommand, WhitelistCommand, WithdrawArgs,
};
use crate::error::CliError;
use crate::output::{field, Output};

type Result<T> = std::result::Result<T, CliError>;

pub async fn run(
    ctx: &Custody,
    command: Command,
    out: Output,
    cancel: CancellationToken,
) -> Result<()> {
    match command {
        Command::Register(args) => register(ctx, args, out).await,
        Command::VerifyEmail { token } => verify_email(ctx, &token, out).await,
        Command::ResendVerification { email } => {
            VerifyEmailPage::new(ctx).resend(&email).await?;
            Ok(())
        }
        Command::Login(args) => login(ctx, args, out).await,
        Command::Logout => {
            ctx.logout()?;
            Ok(())
        }
        Command::Dashboard { days } => dashboard(ctx, days, out).await,
        Command::Wallet(cmd) => wallet(ctx, cmd, out).await,
        Command::Deposit { amount } => deposit(ctx, &amount, out, cancel).await,
        Command::Withdraw(args) => withdraw(ctx, args, out).await,
        Command::Whitelist(cmd) => whitelist(ctx, cmd, out).await,
        Command::DailyLimit(cmd) => daily_limit(ctx, cmd, out).await,
        Command::Activity { direction } => activity(ctx, direction, out).await,
        Command::Admin(cmd) => admin(ctx, cmd, out).await,
        Command::Theme { mode } => theme(ctx, mode, out),
    }
}

// --- Auth ---

async fn register(ctx: &Custody, args: RegisterArgs, out: Output) -> Result<()> {
    let confirm = args.confirm.as_deref().unwrap_or(&args.password);
    let resp = RegisterPage::new(ctx)
        .submit(&args.email, &args.password, confirm)
        .await?;
    out.print(&resp, |buf| {
        field(buf, "registered", &resp.user.email);
        field(buf, "next", "open the link in the verification email");
    })
}

async fn verify_email(ctx: &Custody, token: &str, out: Output) -> Result<()> {
    match VerifyEmailPage::new(ctx).verify(Some(token)).await? {
        VerifyOutcome::Verified(session) => print_session(&session, out),
        VerifyOutcome::Frozen => out.print(&json!({ "frozen": true }), |buf| {
            field(buf, "status", AccountStatus::Frozen)
        }),
    }
}

async fn login(ctx: &Custody, args: LoginArgs, out: Output) -> Result<()> {
    let mut page = LoginPage::new(ctx);
    match page.submit(&args.email, &args.password).await? {
        LoginOutcome::LoggedIn(session) => print_session(&session, out),
        LoginOutcome::Frozen => out.print(&json!({ "frozen": true }), |buf| {
            field(buf, "status", AccountStatus::Frozen)
        }),
        LoginOutcome::VerificationRequired => out.print(
            &json!({ "verificationRequired": true }),
            |buf| {
                let _ = writeln!(
                    buf,
                    "Email not verified. Run `custody resend-verification {}`.",
                    args.email.trim()
                );
            },
        ),
    }
}

fn print_session(session: &Session, out: Output) -> Result<()> {
    let value = json!({
        "userId": session.user_id,
        "email": session.email,
        "role": session.role,
        "status": session.status,
    });
    out.print(&value, |buf| {
        field(buf, "email", session.email.as_deref().unwrap_or("-"));
        field(buf, "role", session.role.as_deref().unwrap_or("-"));
        field(buf, "status", session.status.unwrap_or_default());
    })
}

// --- Dashboard + wallet ---

async fn dashboard(ctx: &Custody, days: u32, out: Output) -> Result<()> {
    ctx.enter(Route::Dashboard)?;
    let mut page = DashboardPage::new(ctx);
    page.set_history_days(days);
    let view = page.load().await?;

    let value = json!({
        "email": view.email,
        "status": view.status,
        "balanceEth": view.balance_eth,
        "history": view.history,
        "recent": transfers_json(&view.recent),
    });
    out.print(&value, |buf| {
        field(buf, "email", view.email.as_deref().unwrap_or("-"));
        field(buf, "status", view.status);
        field(buf, "balance", format!("{} ETH", view.balance_eth));
        let _ = writeln!(buf, "\nbalance history ({days} days)");
        for day in &view.history {
            let _ = writeln!(buf, "  {}  {} ETH", day.date, day.balance_eth);
        }
        let _ = writeln!(buf, "\nrecent activity");
        for tx in &view.recent {
            let _ = writeln!(
                buf,
                "  {}  {:<3}  {}  {}  {}",
                tx.created_at.as_deref().map(format_date).unwrap_or_default(),
                tx.direction,
                transfer_amount(tx),
                tx.status,
                truncate_tx_hash(&tx.tx_hash),
            );
        }
    })
}

async fn wallet(ctx: &Custody, cmd: WalletCommand, out: Output) -> Result<()> {
    ctx.enter(Route::Dashboard)?;
    let page = DashboardPage::new(ctx);
    match cmd {
        WalletCommand::Connect => {
            let state = page.connect_wallet().await?;
            let address = state.address.map(|a| a.to_checksum(None));
            out.print(
                &json!({ "address": address, "chainId": state.chain_id }),
                |buf| {
                    field(buf, "address", address.as_deref().unwrap_or("-"));
                    field(buf, "chain", state.chain_id.unwrap_or_default());
                },
            )
        }
        WalletCommand::Disconnect => {
            page.disconnect_wallet();
            Ok(())
        }
        WalletCommand::Status => {
            let address = ctx.wallet.request_accounts().await?.to_checksum(None);
            let chain_id = ctx.wallet.chain_id().await?;
            let on_expected = chain_id == ctx.network.expected_chain_id();
            out.print(
                &json!({ "address": address, "chainId": chain_id, "onExpectedChain": on_expected }),
                |buf| {
                    field(buf, "address", truncate_address(&address));
                    field(buf, "chain", chain_id);
                    field(buf, "expected chain", on_expected);
                },
            )
        }
    }
}

// --- Deposits + withdrawals ---

async fn deposit(
    ctx: &Custody,
    amount: &str,
    out: Output,
    cancel: CancellationToken,
) -> Result<()> {
    ctx.enter(Route::Deposit)?;
    DashboardPage::new(ctx).connect_wallet().await?;

    let mut page = DepositPage::new(ctx);
    let outcome = tokio::select! {
        result = page.deposit(amount) => result?,
        _ = cancel.cancelled() => {
            info!("stopped waiting for the deposit");
            return Err(CliError::Cancelled);
        }
    };

    let report = match &outcome.report {
        ReportStatus::Reported(message) => message.clone(),
        ReportStatus::Failed(message) => format!("not reported: {message}"),
        ReportStatus::Idle | ReportStatus::Pending => "pending".to_string(),
    };
    let value = json!({
        "txHash": outcome.tx_hash,
        "blockNumber": outcome.block_number,
        "report": report,
    });
    out.print(&value, |buf| {
        field(buf, "tx", outcome.tx_hash);
        if let Some(block) = outcome.block_number {
            field(buf, "block", block);
        }
        field(buf, "report", &report);
    })
}

async fn withdraw(ctx: &Custody, args: WithdrawArgs, out: Output) -> Result<()> {
    ctx.enter(Route::WithdrawRequest)?;
    let mut page = WithdrawRequestPage::new(ctx);
    page.load().await;

    let form = WithdrawForm {
        to: args.to,
        amount: args.amount,
        password: args.password,
    };
    match page.submit(&form).await? {
        WithdrawState::Executed(receipt) => print_receipt("executed", receipt, out),
        WithdrawState::WaitingManager(receipt) => print_receipt("waiting_manager", receipt, out),
        other => print_receipt(other.name(), &WithdrawReceipt::default(), out),
    }
}

fn print_receipt(state: &str, receipt: &WithdrawReceipt, out: Output) -> Result<()> {
    let value = json!({
        "state": state,
        "txId": receipt.tx_id,
        "submitHash": receipt.submit_hash,
        "approveHash": receipt.approve_hash,
        "managerHash": receipt.manager_hash,
        "executeHash": receipt.execute_hash,
    });
    out.print(&value, |buf| {
        field(buf, "state", state);
        field(buf, "tx id", &receipt.tx_id);
        for (label, hash) in [
            ("submit tx", &receipt.submit_hash),
            ("approve tx", &receipt.approve_hash),
            ("manager tx", &receipt.manager_hash),
            ("execute tx", &receipt.execute_hash),
        ] {
            if let Some(hash) = hash {
                field(buf, label, hash);
            }
        }
    })
}

// --- Settings ---

async fn whitelist(ctx: &Custody, cmd: WhitelistCommand, out: Output) -> Result<()> {
    ctx.enter(Route::WithdrawSettings)?;
    let mut page = WithdrawSettingsPage::new(ctx);
    page.load().await?;
    match cmd {
        WhitelistCommand::List => {}
        WhitelistCommand::Add { address } => {
            page.add_address(&address).await?;
        }
        WhitelistCommand::Remove { address } => page.remove_address(&address).await?,
    }
    out.print(page.whitelist(), |buf| {
        for address in page.whitelist() {
            let _ = writeln!(buf, "{address}");
        }
    })
}

async fn daily_limit(ctx: &Custody, cmd: DailyLimitCommand, out: Output) -> Result<()> {
    ctx.enter(Route::WithdrawSettings)?;
    let mut page = WithdrawSettingsPage::new(ctx);
    match cmd {
        DailyLimitCommand::Get => page.load().await?,
        DailyLimitCommand::Set { max_eth } => page.set_daily_limit(&max_eth).await?,
    }
    let limit = page.daily_limit();
    out.print(&limit, |buf| match limit {
        Some(l) if l.is_unlimited => field(buf, "daily limit", "unlimited"),
        Some(l) => {
            field(buf, "daily limit", format!("{} ETH", l.max_eth));
            field(buf, "spent today", format!("{} ETH", l.spent_eth));
            if let Some(remaining) = &l.remaining_eth {
                field(buf, "remaining", format!("{remaining} ETH"));
            }
        }
        None => field(buf, "daily limit", "unavailable"),
    })
}

async fn activity(ctx: &Custody, direction: Option<DirectionArg>, out: Output) -> Result<()> {
    ctx.enter(Route::Activity)?;
    let direction = direction.map(|d| match d {
        DirectionArg::In => Direction::In,
        DirectionArg::Out => Direction::Out,
    });
    let items = ActivityPage::new(ctx).load(direction).await?;
    out.print(&transfers_json(&items), |buf| {
        for tx in &items {
            let counterparty = match tx.direction {
                Direction::In => &tx.from,
                Direction::Out => &tx.to,
            };
            let _ = writeln!(
                buf,
                "{}  {:<3}  {:>16}  {:<10}  {}  {}",
                tx.created_at.as_deref().map(format_date).unwrap_or_default(),
                tx.direction,
                transfer_amount(tx),
                tx.status,
                truncate_address(counterparty),
                truncate_tx_hash(&tx.tx_hash),
            );
        }
    })
}

/// `1.5 ETH`, or the raw value when the backend sent something other than wei.
fn transfer_amount(tx: &TxHistoryItem) -> String {
    match tx.amount_eth() {
        Ok(eth) => format!("{eth} ETH"),
        Err(_) => format!("{} wei", tx.amount),
    }
}

/// Transfers as sent by the backend, each with an added `amountEth`.
fn transfers_json(items: &[TxHistoryItem]) -> Vec<serde_json::Value> {
    items
        .iter()
        .map(|tx| {
            let mut value = json!(tx);
            if let (Some(obj), Ok(eth)) = (value.as_object_mut(), tx.amount_eth()) {
                obj.insert("amountEth".to_string(), json!(eth));
            }
            value
        })
        .collect()
}

// --- Admin ---

async fn admin(ctx: &Custody, cmd: AdminCommand, out: Output) -> Result<()> {
    ctx.enter(Route::Admin)?;
    let mut page = AdminPage::new(ctx);
    match cmd {
        AdminCommand::Overview => {
            let o = page.open().await?;
            let value = json!({
                "omnibus": o.omnibus,
                "cold": o.cold,
                "paused": o.paused,
                "users": o.users,
                "pendingWithdrawals": o.pending.total,
            });
            out.print(&value, |buf| {
                field(buf, "omnibus", format!("{} ETH", o.omnibus.balance_eth));
                field(buf, "cold vault", format!("{} ETH", o.cold.balance_eth));
                field(buf, "omnibus paused", o.paused.paused);
                field(buf, "pending", o.pending.total);
                let _ = writeln!(buf, "\nusers");
                for u in &o.users {
                    let _ = writeln!(
                        buf,
                        "  {:<36}  {:<28}  {:<6}  {} ETH",
                        u.id, u.email, u.status, u.balance_eth
                    );
                }
            })
        }
        AdminCommand::Freeze { user_id } => {
            let update = page.set_user_status(&user_id, AccountStatus::Frozen).await?;
            out.print(&update, |buf| field(buf, &update.id, update.status))
        }
        AdminCommand::Unfreeze { user_id } => {
            let update = page.set_user_status(&user_id, AccountStatus::Active).await?;
            out.print(&update, |buf| field(buf, &update.id, update.status))
        }
        AdminCommand::Pause => pause_omnibus(&mut page, true, out).await,
        AdminCommand::Unpause => pause_omnibus(&mut page, false, out).await,
        AdminCommand::ColdDeposit { amount } => {
            let deposit = page.cold_deposit(&amount).await?;
            out.print(&deposit, |buf| {
                field(buf, "amount", format!("{} ETH", deposit.amount_eth));
                field(buf, "tx", &deposit.tx_hash);
            })
        }
        AdminCommand::ColdMove(step) => cold_move(&mut page, step, out).await,
        AdminCommand::Withdrawals => {
            let o = page.open().await?;
            out.print(&o.pending, |buf| {
                for w in &o.pending.requests {
                    let _ = writeln!(
                        buf,
                        "{}  {:<28}  {} ETH  -> {}  tss={} manager={}",
                        w.tx_id,
                        w.email.as_deref().unwrap_or("-"),
                        w.amount_eth,
                        truncate_address(&w.to),
                        w.approved_tss,
                        w.approved_manager,
                    );
                }
            })
        }
        AdminCommand::Withdrawal { tx_id } => {
            let info = page.withdrawal_info(&tx_id).await?;
            out.print(&info, |buf| {
                field(buf, "tx id", &info.tx_id);
                field(buf, "email", info.email.as_deref().unwrap_or("-"));
                field(buf, "to", &info.to);
                field(buf, "amount", format!("{} ETH", info.amount_eth));
                field(buf, "tss approved", info.approved_tss);
                field(buf, "manager approved", info.approved_manager);
                field(buf, "executed", info.executed);
            })
        }
        AdminCommand::ApproveWithdrawal { tx_id } => {
            match page.approve_withdrawal(&tx_id).await? {
                WithdrawalApproval::Executed(execution) => {
                    out.print(&execution, |buf| {
                        field(buf, "status", &execution.status);
                        field(buf, "amount", format!("{} ETH", execution.amount_eth));
                        if let Some(hash) = &execution.tx_hash {
                            field(buf, "tx", hash);
                        }
                    })
                }
                WithdrawalApproval::ApprovedOnly { approval, error } => {
                    let value = json!({ "approval": approval, "executeError": error });
                    out.print(&value, |buf| {
                        field(buf, "status", &approval.status);
                        field(buf, "execute error", &error);
                    })
                }
            }
        }
        AdminCommand::Transactions { kind, email } => {
            page.open().await?;
            let kind = kind.map(|k| match k {
                KindArg::Deposit => TransferKind::Deposit,
                KindArg::Withdraw => TransferKind::Withdraw,
            });
            let txs = page.filtered_transactions(kind, &email);
            out.print(&txs, |buf| {
                for tx in &txs {
                    let counterparty = tx.from.as_deref().or(tx.to.as_deref()).unwrap_or("-");
                    let _ = writeln!(
                        buf,
                        "{}  {:<8}  {:<28}  {:>12}  {}",
                        format_unix(tx.timestamp),
                        tx.kind,
                        tx.email.as_deref().unwrap_or("-"),
                        tx.amount,
                        truncate_address(counterparty),
                    );
                }
            })
        }
    }
}

async fn pause_omnibus(page: &mut AdminPage, paused: bool, out: Output) -> Result<()> {
    let result = page.pause_omnibus(paused).await?;
    out.print(&result, |buf| {
        field(buf, "omnibus paused", result.paused);
        if let Some(hash) = &result.tx_hash {
            field(buf, "tx", hash);
        }
    })
}

async fn cold_move(page: &mut AdminPage, step: ColdMoveCommand, out: Output) -> Result<()> {
    match step {
        ColdMoveCommand::Request { amount } => {
            let requested = page.cold_move_request(&amount).await?;
            out.print(&requested, |buf| {
                field(buf, "move id", &requested.move_id);
                field(buf, "amount", format!("{} ETH", requested.amount_eth));
            })
        }
        ColdMoveCommand::Approve { move_id } => {
            page.resume_cold_move(ColdMoveState::Approve {
                move_id,
                approved_admin1: false,
                approved_admin2: false,
            });
            let approved = page.cold_move_approve().await?;
            let next = page.cold_move().name();
            out.print(&approved, |buf| {
                field(buf, "admin 1", approved.approved_admin1);
                field(buf, "admin 2", approved.approved_admin2);
                field(buf, "next step", next);
            })
        }
        ColdMoveCommand::Execute { move_id } => {
            page.resume_cold_move(ColdMoveState::Execute { move_id });
            let executed = page.cold_move_execute().await?;
            out.print(&executed, |buf| {
                field(buf, "executed", executed.executed);
                field(buf, "amount", format!("{} ETH", executed.amount_eth));
                field(buf, "tx", &executed.tx_hash);
            })
        }
    }
}

// --- Theme ---

fn theme(ctx: &Custody, mode: Option<ThemeArg>, out: Output) -> Result<()> {
    let is_dark = match mode {
        None => ctx.theme.is_dark(),
        Some(ThemeArg::Dark) => {
            ctx.theme.set_theme(true)?;
            true
        }
        Some(ThemeArg::Light) => {
            ctx.theme.set_theme(false)?;
            false
        }
        Some(ThemeArg::Toggle) => ctx.theme.toggle()?,
    };
    let name = if is_dark { "dark" } else { "light" };
    out.print(&json!({ "theme": name }), |buf| field(buf, "theme", name))
}
