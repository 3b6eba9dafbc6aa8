//! Tests for `RpcBalanceOracle` and `OracleChain` against a mock JSON-RPC
//! endpoint.

use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zkvip_core::WalletAddress;
use std::time::Duration;

use zkvip_oracle::{
    BalanceOracle, Environment, OracleChain, OracleConfig, OracleError, RetryPolicy,
    RpcBalanceOracle, RPC_LIMIT_EXCEEDED,
};

const HOLDER: &str = "0x1111111111111111111111111111111111111111";

fn holder() -> WalletAddress {
    WalletAddress::parse(HOLDER).unwrap()
}

fn config(server: &MockServer) -> OracleConfig {
    OracleConfig::local_mock(&server.uri()).unwrap()
}

fn rpc_result(hex: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": hex,
    }))
}

// ── balanceOf ────────────────────────────────────────────────────────

#[tokio::test]
async fn balance_of_sends_selector_and_padded_address() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("eth_call"))
        .and(body_string_contains(
            "0x70a082310000000000000000000000001111111111111111111111111111111111111111",
        ))
        // 1.2 * 10^18
        .respond_with(rpc_result("0x10a741a462780000"))
        .expect(1)
        .mount(&server)
        .await;

    let oracle = RpcBalanceOracle::new(&config(&server)).unwrap();
    let reading = oracle.balance_of(&holder()).await.unwrap();
    assert_eq!(reading.amount.to_string(), "1.2");
    assert_eq!(reading.source, "rpc");
    assert!(!reading.placeholder);
}

#[tokio::test]
async fn queries_decimals_when_not_configured() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("0x313ce567"))
        .respond_with(rpc_result("0x06"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("0x70a08231"))
        // 2.5 with 6 decimals
        .respond_with(rpc_result("0x2625a0"))
        .expect(2)
        .mount(&server)
        .await;

    let mut cfg = config(&server);
    cfg.token_decimals = None;
    let oracle = RpcBalanceOracle::new(&cfg).unwrap();

    let first = oracle.balance_of(&holder()).await.unwrap();
    assert_eq!(first.amount.to_string(), "2.5");
    assert_eq!(
        first.amount.base_units().to_string(),
        "2500000000000000000"
    );
    // Decimals are cached after the first lookup.
    oracle.balance_of(&holder()).await.unwrap();
}

#[tokio::test]
async fn rpc_error_object_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32000, "message": "execution reverted" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let oracle = RpcBalanceOracle::new(&config(&server)).unwrap();
    let err = oracle.balance_of(&holder()).await.unwrap_err();
    match err {
        OracleError::Rpc { code, message, .. } => {
            assert_eq!(code, -32000);
            assert_eq!(message, "execution reverted");
        }
        other => panic!("expected Rpc error, got {other}"),
    }
}

#[tokio::test]
async fn http_status_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let oracle = RpcBalanceOracle::new(&config(&server)).unwrap();
    let err = oracle.balance_of(&holder()).await.unwrap_err();
    assert!(matches!(err, OracleError::Status { status: 503, .. }));
}

#[tokio::test]
async fn empty_result_is_invalid() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(rpc_result("0x"))
        .mount(&server)
        .await;

    let oracle = RpcBalanceOracle::new(&config(&server)).unwrap();
    let err = oracle.balance_of(&holder()).await.unwrap_err();
    assert!(matches!(err, OracleError::InvalidResult { .. }));
}

#[tokio::test]
async fn malformed_body_is_a_deserialization_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let oracle = RpcBalanceOracle::new(&config(&server)).unwrap();
    let err = oracle.balance_of(&holder()).await.unwrap_err();
    assert!(matches!(err, OracleError::Deserialization { .. }));
}

// ── Backoff ──────────────────────────────────────────────────────────

#[tokio::test]
async fn http_429_is_retried_until_the_node_answers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(rpc_result("0x0de0b6b3a7640000"))
        .expect(1)
        .mount(&server)
        .await;

    let oracle = RpcBalanceOracle::new(&config(&server)).unwrap();
    let reading = oracle.balance_of(&holder()).await.unwrap();
    assert_eq!(reading.amount.to_string(), "1");
}

#[tokio::test]
async fn rpc_limit_exceeded_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": RPC_LIMIT_EXCEEDED, "message": "request limit reached" }
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(rpc_result("0x10a741a462780000"))
        .expect(1)
        .mount(&server)
        .await;

    let oracle = RpcBalanceOracle::new(&config(&server)).unwrap();
    let reading = oracle.balance_of(&holder()).await.unwrap();
    assert_eq!(reading.amount.to_string(), "1.2");
}

#[tokio::test]
async fn persistent_rate_limit_exhausts_the_policy() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .expect(4)
        .mount(&server)
        .await;

    let mut cfg = config(&server);
    cfg.retry = RetryPolicy {
        max_retries: 3,
        base_delay: Duration::from_millis(1),
    };
    let oracle = RpcBalanceOracle::new(&cfg).unwrap();
    let err = oracle.balance_of(&holder()).await.unwrap_err();
    assert!(matches!(err, OracleError::Status { status: 429, .. }));
}

#[tokio::test]
async fn disabled_policy_makes_one_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let mut cfg = config(&server);
    cfg.retry = RetryPolicy::none();
    let oracle = RpcBalanceOracle::new(&cfg).unwrap();
    assert!(oracle.balance_of(&holder()).await.is_err());
}

#[tokio::test]
async fn unreachable_node_is_a_transport_error() {
    // Nothing listens on port 1.
    let mut cfg = OracleConfig::local_mock("http://127.0.0.1:1").unwrap();
    cfg.retry = RetryPolicy {
        max_retries: 1,
        base_delay: Duration::ZERO,
    };
    let oracle = RpcBalanceOracle::new(&cfg).unwrap();
    let err = oracle.balance_of(&holder()).await.unwrap_err();
    assert!(matches!(err, OracleError::Http { .. }));
    assert!(err.is_transient());
}

// ── OracleChain ──────────────────────────────────────────────────────

#[tokio::test]
async fn production_chain_surfaces_rpc_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let chain = OracleChain::from_config(&config(&server)).unwrap();
    assert_eq!(chain.environment(), Environment::Production);
    let err = chain.balance_of(&holder()).await.unwrap_err();
    assert!(matches!(err, OracleError::Exhausted(_)));
}

#[tokio::test]
async fn development_chain_falls_back_to_placeholder() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut cfg = config(&server);
    cfg.environment = Environment::Development;
    let chain = OracleChain::from_config(&cfg).unwrap();
    let reading = chain.balance_of(&holder()).await.unwrap();
    assert!(reading.placeholder);
    assert_eq!(reading.amount.to_string(), "1.5");
}
