//! Integration tests for the withdrawal flow driven by the request page.
//!
//! The backend is mocked with wiremock; call counts on the execute endpoint
//! prove that a withdrawal parked for manager approval is never executed.

use std::sync::Arc;

use custody::pages::{WithdrawForm, WithdrawRequestPage, WithdrawSettingsPage};
use custody::store::NewSession;
use custody::{
    AccountStatus, Custody, CustodyConfig, CustodyError, MemoryStorage, NotificationKind,
    WithdrawState,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RECIPIENT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

fn context(server: &MockServer, status: AccountStatus) -> Custody {
    let ctx = Custody::with_storage(
        CustodyConfig::new(server.uri()),
        Arc::new(MemoryStorage::new()),
    )
    .unwrap();
    ctx.session
        .set_session(NewSession {
            access_token: "tok".into(),
            user_id: "user-1".into(),
            email: Some("alice@example.com".into()),
            role: Some("user".into()),
            status: Some(status),
        })
        .unwrap();
    ctx
}

fn form() -> WithdrawForm {
    WithdrawForm {
        to: RECIPIENT.to_lowercase(),
        amount: "0.5".into(),
        password: "hunter22".into(),
    }
}

async fn mount_submit(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/tx/withdraw/submit"))
        .and(body_json(json!({
            "to": RECIPIENT,
            "amount": "0.5",
            "password": "hunter22"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "submitted",
            "data": { "txId": "tx-42", "txHash": "0xsubmit", "amount": "0.5", "status": "SUBMITTED" }
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_approve(server: &MockServer, requires_manager: bool) {
    Mock::given(method("POST"))
        .and(path("/tx/withdraw/approve"))
        .and(body_json(json!({ "txId": "tx-42" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "approved",
            "data": {
                "txHash": "0xapprove",
                "managerTxHash": if requires_manager { json!(null) } else { json!("0xmanager") },
                "status": "APPROVED",
                "isSmallTx": !requires_manager,
                "requiresManagerApproval": requires_manager
            }
        })))
        .expect(1)
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Happy paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_small_withdrawal_executes_once() {
    let server = MockServer::start().await;
    mount_submit(&server).await;
    mount_approve(&server, false).await;
    Mock::given(method("POST"))
        .and(path("/tx/withdraw/execute"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "executed",
            "data": { "txHash": "0xexecute", "status": "EXECUTED" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server, AccountStatus::Active);
    let mut page = WithdrawRequestPage::new(&ctx);
    let state = page.submit(&form()).await.unwrap().clone();

    let WithdrawState::Executed(receipt) = state else {
        panic!("expected Executed, got {state:?}");
    };
    assert_eq!(receipt.tx_id, "tx-42");
    assert_eq!(receipt.submit_hash.as_deref(), Some("0xsubmit"));
    assert_eq!(receipt.approve_hash.as_deref(), Some("0xapprove"));
    assert_eq!(receipt.execute_hash.as_deref(), Some("0xexecute"));

    let last = ctx.ui.active().pop().unwrap();
    assert_eq!(last.kind, NotificationKind::Success);

    page.reset();
    assert!(matches!(page.state(), WithdrawState::Form { error: None }));
}

#[tokio::test]
async fn test_manager_approval_skips_execute() {
    let server = MockServer::start().await;
    mount_submit(&server).await;
    mount_approve(&server, true).await;
    Mock::given(method("POST"))
        .and(path("/tx/withdraw/execute"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server, AccountStatus::Active);
    let mut page = WithdrawRequestPage::new(&ctx);
    let state = page.submit(&form()).await.unwrap();

    assert!(matches!(state, WithdrawState::WaitingManager(_)));
    assert!(ctx
        .ui
        .active()
        .iter()
        .any(|n| n.kind == NotificationKind::Warning));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_execute_failure_returns_to_form() {
    let server = MockServer::start().await;
    mount_submit(&server).await;
    mount_approve(&server, false).await;
    Mock::given(method("POST"))
        .and(path("/tx/withdraw/execute"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": { "code": "NONCE_CONFLICT", "message": "nonce" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server, AccountStatus::Active);
    let mut page = WithdrawRequestPage::new(&ctx);
    let err = page.submit(&form()).await.unwrap_err();
    assert!(matches!(err, CustodyError::Api(_)));

    let WithdrawState::Form { error: Some(message) } = page.state() else {
        panic!("expected Form with error, got {:?}", page.state());
    };
    assert!(message.starts_with("Withdrawal execution failed."));
}

#[tokio::test]
async fn test_approve_failure_returns_to_form() {
    let server = MockServer::start().await;
    mount_submit(&server).await;
    Mock::given(method("POST"))
        .and(path("/tx/withdraw/approve"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": "POLICY_CHECK_FAIL", "message": "policy" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/tx/withdraw/execute"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server, AccountStatus::Active);
    let mut page = WithdrawRequestPage::new(&ctx);
    let err = page.submit(&form()).await.unwrap_err();
    assert!(matches!(err, CustodyError::Api(_)));

    let WithdrawState::Form { error: Some(message) } = page.state() else {
        panic!("expected Form with error, got {:?}", page.state());
    };
    assert!(message.starts_with("Withdrawal approval failed."));
    assert!(ctx
        .ui
        .active()
        .iter()
        .any(|n| n.kind == NotificationKind::Error));
}

#[tokio::test]
async fn test_submit_without_tx_id_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tx/withdraw/submit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "submitted",
            "data": { "txHash": "0xsubmit" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/tx/withdraw/approve"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server, AccountStatus::Active);
    let mut page = WithdrawRequestPage::new(&ctx);
    assert!(page.submit(&form()).await.is_err());
    assert!(matches!(page.state(), WithdrawState::Form { error: Some(_) }));
}

#[tokio::test]
async fn test_frozen_account_cannot_withdraw() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server, AccountStatus::Frozen);
    let mut page = WithdrawRequestPage::new(&ctx);
    let err = page.submit(&form()).await.unwrap_err();
    assert!(matches!(err, CustodyError::AccountFrozen));
}

#[tokio::test]
async fn test_invalid_amount_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server, AccountStatus::Active);
    let mut page = WithdrawRequestPage::new(&ctx);
    for amount in ["0", "-1", "80", "0.1234567"] {
        let mut f = form();
        f.amount = amount.into();
        let err = page.submit(&f).await.unwrap_err();
        assert!(matches!(err, CustodyError::Validation(_)), "{amount}");
    }
}

// ---------------------------------------------------------------------------
// Whitelist
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_loaded_whitelist_is_enforced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/setting/withdraw-whitelist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "ok",
            "data": [{
                "id": "w-1",
                "to_address": "0x0000000000000000000000000000000000000001",
                "created_at": "2026-10-01T00:00:00Z"
            }]
        })))
        .mount(&server)
        .await;

    let ctx = context(&server, AccountStatus::Active);
    let mut page = WithdrawRequestPage::new(&ctx);
    page.load().await;
    assert_eq!(page.whitelist().len(), 1);

    let err = page.submit(&form()).await.unwrap_err();
    assert!(matches!(err, CustodyError::Validation(_)));
}

#[tokio::test]
async fn test_duplicate_whitelist_entry_skips_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/setting/withdraw-whitelist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "ok",
            "data": [{
                "id": "w-1",
                "to_address": RECIPIENT.to_lowercase(),
                "created_at": "2026-10-01T00:00:00Z"
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/setting/daily-limit"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/setting/withdraw-whitelist"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server, AccountStatus::Active);
    let mut page = WithdrawSettingsPage::new(&ctx);
    page.load().await.unwrap();
    assert_eq!(page.whitelist(), [RECIPIENT.to_string()]);
    assert!(page.daily_limit().is_none());

    assert!(!page.add_address(RECIPIENT).await.unwrap());
}
