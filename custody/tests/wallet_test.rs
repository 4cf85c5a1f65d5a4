//! Integration tests for the wallet JSON-RPC client, the network guard and
//! the deposit page. One mock server plays both the wallet and the backend.

use std::sync::Arc;
use std::time::Duration;

use custody::pages::{DashboardPage, DepositPage, ReportStatus};
use custody::store::NewSession;
use custody::wallet::encode_deposit;
use custody::wallet::user_key_from_email;
use custody::{
    AccountStatus, Custody, CustodyConfig, CustodyError, MemoryStorage, NotificationKind,
    SEPOLIA_CHAIN_ID,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACCOUNT: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
const VAULT: &str = "0x0000000000000000000000000000000000000010";

fn tx_hash() -> String {
    format!("0x{}", "ab".repeat(32))
}

fn context(server: &MockServer) -> Custody {
    let mut config = CustodyConfig::new(format!("{}/api", server.uri()));
    config.wallet_rpc_url = format!("{}/rpc", server.uri());
    config.omnibus_vault = VAULT.parse().unwrap();
    config.receipt_poll_interval = Duration::from_millis(10);
    config.receipt_timeout = Duration::from_secs(5);

    let ctx = Custody::with_storage(config, Arc::new(MemoryStorage::new())).unwrap();
    ctx.session
        .set_session(NewSession {
            access_token: "tok".into(),
            user_id: "user-1".into(),
            email: Some("alice@example.com".into()),
            role: Some("user".into()),
            status: Some(AccountStatus::Active),
        })
        .unwrap();
    ctx
}

fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "result": result }))
}

async fn mount_rpc(server: &MockServer, rpc_method: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(json!({ "method": rpc_method })))
        .respond_with(response)
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Network guard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_connect_on_expected_chain() {
    let server = MockServer::start().await;
    mount_rpc(&server, "eth_requestAccounts", rpc_result(json!([ACCOUNT]))).await;
    mount_rpc(&server, "eth_chainId", rpc_result(json!("0xaa36a7"))).await;

    let ctx = context(&server);
    let state = DashboardPage::new(&ctx).connect_wallet().await.unwrap();

    assert!(state.connected);
    assert_eq!(state.chain_id, Some(SEPOLIA_CHAIN_ID));
    assert_eq!(state.address, Some(ACCOUNT.parse().unwrap()));
}

#[tokio::test]
async fn test_wrong_network_after_rejected_switch() {
    let server = MockServer::start().await;
    mount_rpc(&server, "eth_requestAccounts", rpc_result(json!([ACCOUNT]))).await;
    mount_rpc(&server, "eth_chainId", rpc_result(json!("0x1"))).await;
    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(json!({ "method": "wallet_switchEthereumChain" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": 4001, "message": "User rejected the request." }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let err = DashboardPage::new(&ctx).connect_wallet().await.unwrap_err();

    assert!(matches!(
        err,
        CustodyError::WrongNetwork {
            expected: SEPOLIA_CHAIN_ID,
            actual: 1
        }
    ));
    // Exactly one notice: the guard's warning.
    let notices = ctx.ui.active();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NotificationKind::Warning);
    assert!(!ctx.chain.snapshot().is_on(SEPOLIA_CHAIN_ID));
}

// ---------------------------------------------------------------------------
// Deposit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_deposit_sends_calldata_and_reports_once() {
    let server = MockServer::start().await;
    mount_rpc(&server, "eth_requestAccounts", rpc_result(json!([ACCOUNT]))).await;
    mount_rpc(&server, "eth_chainId", rpc_result(json!("0xaa36a7"))).await;

    let key = user_key_from_email("alice@example.com").unwrap();
    let calldata = format!("0x{}", hex::encode(encode_deposit(key)));
    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(json!({
            "method": "eth_sendTransaction",
            "params": [{
                "to": VAULT,
                "value": "0x6f05b59d3b20000",
                "data": calldata
            }]
        })))
        .respond_with(rpc_result(json!(tx_hash())))
        .expect(1)
        .mount(&server)
        .await;

    // Not mined on the first poll.
    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(json!({ "method": "eth_getTransactionReceipt" })))
        .respond_with(rpc_result(json!(null)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_rpc(
        &server,
        "eth_getTransactionReceipt",
        rpc_result(json!({
            "transactionHash": tx_hash(),
            "blockNumber": "0x2a",
            "status": "0x1"
        })),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/api/tx/deposit"))
        .and(body_partial_json(json!({ "txHash": tx_hash() })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Deposit recorded." })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    DashboardPage::new(&ctx).connect_wallet().await.unwrap();

    let mut page = DepositPage::new(&ctx);
    let outcome = page.deposit("0.5").await.unwrap();
    assert_eq!(outcome.block_number, Some(alloy::primitives::U256::from(42)));
    assert_eq!(
        outcome.report,
        ReportStatus::Reported("Deposit recorded.".into())
    );

    // A second report attempt is a no-op.
    page.report_deposit().await;
    assert!(matches!(page.report_status(), ReportStatus::Reported(_)));
}

#[tokio::test]
async fn test_deposit_requires_connected_wallet() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let mut page = DepositPage::new(&ctx);
    let err = page.deposit("0.5").await.unwrap_err();
    assert!(matches!(err, CustodyError::Validation(_)));
}

#[tokio::test]
async fn test_reverted_deposit_is_not_reported() {
    let server = MockServer::start().await;
    mount_rpc(&server, "eth_requestAccounts", rpc_result(json!([ACCOUNT]))).await;
    mount_rpc(&server, "eth_chainId", rpc_result(json!("0xaa36a7"))).await;
    mount_rpc(&server, "eth_sendTransaction", rpc_result(json!(tx_hash()))).await;
    mount_rpc(
        &server,
        "eth_getTransactionReceipt",
        rpc_result(json!({ "transactionHash": tx_hash(), "status": "0x0" })),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/tx/deposit"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server);
    DashboardPage::new(&ctx).connect_wallet().await.unwrap();

    let mut page = DepositPage::new(&ctx);
    let err = page.deposit("1").await.unwrap_err();
    assert!(matches!(err, CustodyError::Wallet(_)));
    assert_eq!(page.report_status(), &ReportStatus::Idle);
}
