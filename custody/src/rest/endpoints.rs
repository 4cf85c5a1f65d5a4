use crate::error::Result;
use crate::rest::ApiClient;
use crate::types::*;

impl ApiClient {
    // --- Auth ---

    /// POST /auth/register - Create an account and send the verification mail.
    pub async fn register(&self, email: &str, password: &str) -> Result<RegisterResponse> {
        self.post("/auth/register", &Credentials { email, password })
            .await
    }

    /// GET /auth/verify-email?token= - Verify the email and sign in.
    pub async fn verify_email(&self, token: &str) -> Result<AuthResponse> {
        self.get("/auth/verify-email", &[("token", token)]).await
    }

    /// POST /auth/resend-verification
    pub async fn resend_verification(&self, email: &str) -> Result<MessageResponse> {
        self.post("/auth/resend-verification", &EmailBody { email })
            .await
    }

    /// POST /auth/login
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        self.post("/auth/login", &Credentials { email, password })
            .await
    }

    /// GET /auth/profile - Current user, including balance and status.
    pub async fn get_profile(&self) -> Result<ProfileResponse> {
        self.get("/auth/profile", &[]).await
    }

    /// GET /auth/daily-balance-history?days=
    pub async fn get_daily_balance_history(&self, days: u32) -> Result<Vec<DailyBalance>> {
        let env: Envelope<Vec<DailyBalance>> = self
            .get(
                "/auth/daily-balance-history",
                &[("days", &days.to_string())],
            )
            .await?;
        Ok(env.data)
    }

    // --- Transactions ---

    /// POST /tx/deposit - Report a mined deposit transaction.
    pub async fn report_deposit(&self, tx_hash: &str) -> Result<DepositReport> {
        self.post("/tx/deposit", &TxHashBody { tx_hash }).await
    }

    /// POST /tx/withdraw/submit - Create a withdrawal intent.
    pub async fn withdraw_submit(&self, req: &WithdrawSubmitRequest) -> Result<WithdrawSubmitted> {
        let env: Envelope<WithdrawSubmitted> = self.post("/tx/withdraw/submit", req).await?;
        Ok(env.data)
    }

    /// POST /tx/withdraw/approve
    pub async fn withdraw_approve(&self, tx_id: &str) -> Result<WithdrawApproved> {
        let env: Envelope<WithdrawApproved> = self
            .post("/tx/withdraw/approve", &TxIdBody { tx_id })
            .await?;
        Ok(env.data)
    }

    /// POST /tx/withdraw/execute
    pub async fn withdraw_execute(&self, tx_id: &str) -> Result<WithdrawExecuted> {
        let env: Envelope<WithdrawExecuted> = self
            .post("/tx/withdraw/execute", &TxIdBody { tx_id })
            .await?;
        Ok(env.data)
    }

    /// GET /tx/tx-history?direction= - Deposits and withdrawals for the user.
    pub async fn get_tx_history(&self, direction: Option<Direction>) -> Result<Vec<TxHistoryItem>> {
        let query: Vec<(&str, &str)> = direction
            .map(|d| vec![("direction", d.as_str())])
            .unwrap_or_default();
        let env: Envelope<Vec<TxHistoryItem>> = self.get("/tx/tx-history", &query).await?;
        Ok(env.data)
    }

    // --- Settings ---

    /// POST /setting/withdraw-whitelist
    pub async fn add_whitelist(&self, to: &str) -> Result<MessageResponse> {
        self.post("/setting/withdraw-whitelist", &ToBody { to })
            .await
    }

    /// GET /setting/withdraw-whitelist
    pub async fn get_whitelist(&self) -> Result<Vec<WhitelistEntry>> {
        let env: Envelope<Vec<WhitelistEntry>> =
            self.get("/setting/withdraw-whitelist", &[]).await?;
        Ok(env.data)
    }

    /// DELETE /setting/withdraw-whitelist
    pub async fn remove_whitelist(&self, to: &str) -> Result<MessageResponse> {
        self.delete("/setting/withdraw-whitelist", &ToBody { to })
            .await
    }

    /// POST /setting/daily-limit - `0` clears the limit.
    pub async fn set_daily_limit(&self, max_eth: rust_decimal::Decimal) -> Result<DailyLimitUpdate> {
        let env: Envelope<DailyLimitUpdate> = self
            .post("/setting/daily-limit", &DailyLimitBody { max_eth })
            .await?;
        Ok(env.data)
    }

    /// GET /setting/daily-limit
    pub async fn get_daily_limit(&self) -> Result<DailyLimit> {
        let env: Envelope<DailyLimit> = self.get("/setting/daily-limit", &[]).await?;
        Ok(env.data)
    }

    // --- Admin: balances and users ---

    /// GET /admin/omnibus-balance
    pub async fn get_omnibus_balance(&self) -> Result<VaultBalance> {
        let env: Envelope<VaultBalance> = self.get("/admin/omnibus-balance", &[]).await?;
        Ok(env.data)
    }

    /// GET /admin/cold-balance
    pub async fn get_cold_balance(&self) -> Result<VaultBalance> {
        let env: Envelope<VaultBalance> = self.get("/admin/cold-balance", &[]).await?;
        Ok(env.data)
    }

    /// GET /admin/users
    pub async fn get_all_users(&self) -> Result<Vec<AdminUser>> {
        let env: Envelope<Vec<AdminUser>> = self.get("/admin/users", &[]).await?;
        Ok(env.data)
    }

    /// PATCH /admin/users/status - Freeze or unfreeze a user.
    pub async fn update_user_status(
        &self,
        user_id: &str,
        status: AccountStatus,
    ) -> Result<UserStatusUpdate> {
        let env: Envelope<UserStatusUpdate> = self
            .patch("/admin/users/status", &UserStatusBody { user_id, status })
            .await?;
        Ok(env.data)
    }

    /// GET /admin/transactions?limit=
    pub async fn get_admin_transactions(&self, limit: Option<u32>) -> Result<AdminTransactions> {
        let limit = limit.map(|l| l.to_string());
        let query: Vec<(&str, &str)> = limit
            .as_deref()
            .map(|l| vec![("limit", l)])
            .unwrap_or_default();
        let env: Envelope<AdminTransactions> = self.get("/admin/transactions", &query).await?;
        Ok(env.data)
    }

    // --- Admin: omnibus and cold vault ---

    /// GET /admin/omnibus/paused
    pub async fn get_omnibus_paused(&self) -> Result<OmnibusPaused> {
        let env: Envelope<OmnibusPaused> = self.get("/admin/omnibus/paused", &[]).await?;
        Ok(env.data)
    }

    /// POST /admin/omnibus/pause
    pub async fn pause_omnibus(&self, paused: bool) -> Result<OmnibusPauseResult> {
        let env: Envelope<OmnibusPauseResult> = self
            .post("/admin/omnibus/pause", &PauseBody { paused })
            .await?;
        Ok(env.data)
    }

    /// POST /admin/cold/deposit - Move ETH from the omnibus into the cold vault.
    pub async fn cold_deposit(&self, amount_eth: &str) -> Result<ColdDeposit> {
        let env: Envelope<ColdDeposit> = self
            .post("/admin/cold/deposit", &AmountEthBody { amount_eth })
            .await?;
        Ok(env.data)
    }

    /// POST /admin/cold/move/request
    pub async fn cold_request_move(&self, amount_eth: &str) -> Result<ColdMoveRequested> {
        let env: Envelope<ColdMoveRequested> = self
            .post("/admin/cold/move/request", &AmountEthBody { amount_eth })
            .await?;
        Ok(env.data)
    }

    /// POST /admin/cold/move/approve
    pub async fn cold_approve_move(&self, move_id: &str) -> Result<ColdMoveApproved> {
        let env: Envelope<ColdMoveApproved> = self
            .post("/admin/cold/move/approve", &MoveIdBody { move_id })
            .await?;
        Ok(env.data)
    }

    /// POST /admin/cold/move/execute
    pub async fn cold_execute_move(&self, move_id: &str) -> Result<ColdMoveExecuted> {
        let env: Envelope<ColdMoveExecuted> = self
            .post("/admin/cold/move/execute", &MoveIdBody { move_id })
            .await?;
        Ok(env.data)
    }

    // --- Admin: withdrawals ---

    /// GET /admin/withdrawals/pending?limit=
    pub async fn get_pending_withdrawals(&self, limit: Option<u32>) -> Result<PendingWithdrawals> {
        let limit = limit.map(|l| l.to_string());
        let query: Vec<(&str, &str)> = limit
            .as_deref()
            .map(|l| vec![("limit", l)])
            .unwrap_or_default();
        let env: Envelope<PendingWithdrawals> =
            self.get("/admin/withdrawals/pending", &query).await?;
        Ok(env.data)
    }

    /// GET /admin/withdrawals/{txId}
    pub async fn get_withdrawal_request(&self, tx_id: &str) -> Result<WithdrawalRequestInfo> {
        let env: Envelope<WithdrawalRequestInfo> = self
            .get(&Self::path_with_segment("/admin/withdrawals", tx_id), &[])
            .await?;
        Ok(env.data)
    }

    /// POST /admin/withdrawals/approve - Manager approval.
    pub async fn approve_user_withdrawal(&self, tx_id: &str) -> Result<ManagerApproval> {
        let env: Envelope<ManagerApproval> = self
            .post("/admin/withdrawals/approve", &TxIdBody { tx_id })
            .await?;
        Ok(env.data)
    }

    /// POST /admin/withdrawals/execute
    pub async fn execute_user_withdrawal(&self, tx_id: &str) -> Result<AdminWithdrawalExecution> {
        let env: Envelope<AdminWithdrawalExecution> = self
            .post("/admin/withdrawals/execute", &TxIdBody { tx_id })
            .await?;
        Ok(env.data)
    }
}
