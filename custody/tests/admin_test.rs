//! Integration tests for the administrator dashboard.

use std::sync::Arc;

use custody::pages::{AdminPage, WithdrawalApproval};
use custody::store::NewSession;
use custody::{
    AccountStatus, ColdMoveState, Custody, CustodyConfig, CustodyError, MemoryStorage,
    NotificationKind, Route, TransferKind,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MOVE_ID: &str = "0x00000000000000000000000000000000000000000000000000000000000000aa";

fn context(server: &MockServer, role: &str) -> Custody {
    let ctx = Custody::with_storage(
        CustodyConfig::new(server.uri()),
        Arc::new(MemoryStorage::new()),
    )
    .unwrap();
    ctx.session
        .set_session(NewSession {
            access_token: "tok".into(),
            user_id: "admin-1".into(),
            email: Some("ops@example.com".into()),
            role: Some(role.into()),
            status: Some(AccountStatus::Active),
        })
        .unwrap();
    ctx
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "message": "ok", "data": data }))
}

async fn mount_get(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Access + overview
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_non_admin_redirected_to_dashboard() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server, "user");
    let mut page = AdminPage::new(&ctx);
    let err = page.open().await.unwrap_err();

    assert!(matches!(err, CustodyError::Validation(_)));
    assert_eq!(ctx.navigator.current_route(), Some(Route::Dashboard));
    assert_eq!(ctx.ui.active()[0].kind, NotificationKind::Error);
}

#[tokio::test]
async fn test_overview_falls_back_per_section() {
    let server = MockServer::start().await;
    mount_get(
        &server,
        "/admin/omnibus-balance",
        ok(json!({ "balance": "2000000000000000000", "balanceEth": "2.0" })),
    )
    .await;
    mount_get(&server, "/admin/cold-balance", ResponseTemplate::new(500)).await;
    mount_get(
        &server,
        "/admin/omnibus/paused",
        ok(json!({ "paused": true, "status": "PAUSED" })),
    )
    .await;
    mount_get(
        &server,
        "/admin/users",
        ok(json!([{
            "id": "user-1",
            "email": "alice@example.com",
            "role": "user",
            "status": "ACTIVE",
            "balance": "0",
            "balanceEth": "0",
            "createdAt": "2026-10-01T00:00:00Z"
        }])),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/admin/transactions"))
        .and(query_param("limit", "100"))
        .respond_with(ok(json!({
            "total": 2,
            "limit": 100,
            "transactions": [
                { "type": "DEPOSIT", "email": "alice@example.com", "amount": "1", "timestamp": 1760000000 },
                { "type": "WITHDRAW", "email": "bob@example.com", "to": "0x01", "amount": "0.5", "timestamp": 1760000100 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/withdrawals/pending"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server, "ADMIN");
    let mut page = AdminPage::new(&ctx);
    let overview = page.open().await.unwrap().clone();

    assert_eq!(overview.omnibus.balance_eth, "2.0");
    assert_eq!(overview.cold.balance_eth, "");
    assert!(overview.paused.paused);
    assert_eq!(overview.users.len(), 1);
    assert_eq!(overview.transactions.total, 2);
    assert!(overview.pending.requests.is_empty());
    assert!(!ctx.ui.is_loading());

    let withdrawals = page.filtered_transactions(Some(TransferKind::Withdraw), "");
    assert_eq!(withdrawals.len(), 1);
    assert_eq!(page.filtered_transactions(None, "ALICE").len(), 1);
}

// ---------------------------------------------------------------------------
// Cold move
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_cold_move_needs_both_admins() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/cold/move/request"))
        .and(body_json(json!({ "amountEth": "1.5" })))
        .respond_with(ok(json!({
            "txHash": "0xreq",
            "moveId": MOVE_ID,
            "amount": "1500000000000000000",
            "amountEth": "1.5"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/cold/move/approve"))
        .and(body_json(json!({ "moveId": MOVE_ID })))
        .respond_with(ok(json!({
            "txHash": "0xapprove",
            "moveId": MOVE_ID,
            "approvedAdmin1": true,
            "approvedAdmin2": false,
            "isExecutable": false
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/cold/move/approve"))
        .respond_with(ok(json!({
            "txHash": "0xapprove2",
            "moveId": MOVE_ID,
            "approvedAdmin1": true,
            "approvedAdmin2": true,
            "isExecutable": true
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/cold/move/execute"))
        .respond_with(ok(json!({
            "txHash": "0xexec",
            "moveId": MOVE_ID,
            "amount": "1500000000000000000",
            "amountEth": "1.5",
            "executed": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server, "admin");
    let mut page = AdminPage::new(&ctx);

    page.cold_move_request("1.5").await.unwrap();
    assert_eq!(page.cold_move().move_id(), Some(MOVE_ID));

    page.cold_move_approve().await.unwrap();
    assert!(matches!(
        page.cold_move(),
        ColdMoveState::Approve {
            approved_admin1: true,
            approved_admin2: false,
            ..
        }
    ));
    assert!(page.cold_move_execute().await.is_err());

    page.cold_move_approve().await.unwrap();
    assert!(matches!(page.cold_move(), ColdMoveState::Execute { .. }));

    let executed = page.cold_move_execute().await.unwrap();
    assert!(executed.executed);
    assert_eq!(page.cold_move(), &ColdMoveState::Idle);
}

#[tokio::test]
async fn test_cold_move_failure_keeps_step() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/cold/move/approve"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "tss offline" })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server, "admin");
    let mut page = AdminPage::new(&ctx);
    let approving = ColdMoveState::Approve {
        move_id: MOVE_ID.into(),
        approved_admin1: false,
        approved_admin2: false,
    };
    page.resume_cold_move(approving.clone());

    assert!(page.cold_move_approve().await.is_err());
    assert_eq!(page.cold_move(), &approving);
    assert!(ctx.ui.active().iter().any(|n| n.message == "tss offline"));
}

#[tokio::test]
async fn test_cold_deposit_rejects_non_positive_amount() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server, "admin");
    let mut page = AdminPage::new(&ctx);
    for amount in ["0", "-2", "abc", ""] {
        assert!(page.cold_deposit(amount).await.is_err(), "{amount}");
    }
}

// ---------------------------------------------------------------------------
// Pending withdrawals
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_approved_but_not_executed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/withdrawals/approve"))
        .and(body_json(json!({ "txId": "tx-9" })))
        .respond_with(ok(json!({
            "txHash": "0xmgr",
            "txId": "tx-9",
            "amount": "5000000000000000000",
            "amountEth": "5.0",
            "approvedTss": true,
            "approvedManager": true,
            "executed": false,
            "status": "APPROVED"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/withdrawals/execute"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": "INSUFFICIENT_FUNDS", "message": "vault empty" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server, "admin");
    let mut page = AdminPage::new(&ctx);
    let outcome = page.approve_withdrawal("tx-9").await.unwrap();

    let WithdrawalApproval::ApprovedOnly { approval, error } = outcome else {
        panic!("expected ApprovedOnly");
    };
    assert!(approval.approved_manager);
    assert_eq!(
        error,
        "The vault has insufficient funds. Please try again later."
    );
    assert!(ctx
        .ui
        .active()
        .iter()
        .any(|n| n.kind == NotificationKind::Warning && n.message.contains("approved but not executed")));
}

#[tokio::test]
async fn test_withdrawal_id_is_one_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/withdrawals/tx%2F9"))
        .respond_with(ok(json!({
            "txId": "tx/9",
            "to": "0x0000000000000000000000000000000000000001",
            "amount": "5000000000000000000",
            "amountEth": "5.0",
            "approvedTss": true,
            "approvedManager": false,
            "executed": false,
            "isSmallTx": false,
            "requiresManagerApproval": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server, "admin");
    let info = AdminPage::new(&ctx).withdrawal_info("tx/9").await.unwrap();
    assert_eq!(info.tx_id, "tx/9");
    assert!(info.requires_manager_approval);
}
