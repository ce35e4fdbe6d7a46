//! Custody signer behaviour against a mocked custody service.

use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use tessera_crypto::Keypair;
use tessera_signer::{
    CancellationToken, Credential, CustodiedSigner, CustodyClient, CustodyConfig, CustodyKeyRef,
    Signer, SignerError, SignerKind,
};
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REFRESH: &str = "refresh-token";
const ACCESS: &str = "access-token";

fn key_ref() -> CustodyKeyRef {
    CustodyKeyRef {
        custody_domain_id: Uuid::new_v4(),
        key_id: Uuid::new_v4(),
    }
}

fn key_path(key: &CustodyKeyRef, suffix: &str) -> String {
    format!(
        "/api/v1/vaults/{}/keys/{}{suffix}",
        key.custody_domain_id, key.key_id
    )
}

fn client(server: &MockServer) -> CustodyClient {
    CustodyClient::new(CustodyConfig::new(server.uri())).unwrap()
}

fn signer(server: &MockServer, key: CustodyKeyRef) -> CustodiedSigner {
    CustodiedSigner::new(client(server), key, Credential::new(REFRESH))
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/tokens"))
        .and(header("Authorization", format!("Bearer {REFRESH}").as_str()))
        .and(body_partial_json(json!({"grant_type": "refresh_token"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": ACCESS})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sign_returns_custody_signature() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let keypair = Keypair::generate();
    let message = b"canonical vote bytes";
    let expected = keypair.sign(message);
    let key = key_ref();

    Mock::given(method("POST"))
        .and(path(key_path(&key, "/sign")))
        .and(header("Authorization", format!("Bearer {ACCESS}").as_str()))
        .and(body_partial_json(json!({"message": hex::encode(message)})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"signature": format!("0x{}", hex::encode(expected.as_bytes()))})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let signer = signer(&server, key);
    let signature = signer.sign(message).await.unwrap();

    assert_eq!(signature, expected);
    assert!(keypair.public_key().verify(message, &signature).is_ok());
    assert_eq!(signer.kind(), SignerKind::Custodied);
}

#[tokio::test]
async fn test_token_rejection_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/tokens"))
        .respond_with(ResponseTemplate::new(401).set_body_string("refresh token expired"))
        .mount(&server)
        .await;

    let key = key_ref();
    Mock::given(method("POST"))
        .and(path(key_path(&key, "/sign")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = signer(&server, key).sign(b"m").await.unwrap_err();
    assert!(matches!(err, SignerError::Auth(_)), "got {err:?}");
}

#[tokio::test]
async fn test_sign_failure_is_reported_once() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let key = key_ref();
    Mock::given(method("POST"))
        .and(path(key_path(&key, "/sign")))
        .respond_with(ResponseTemplate::new(503).set_body_string("vault sealed"))
        .expect(1)
        .mount(&server)
        .await;

    let err = signer(&server, key).sign(b"m").await.unwrap_err();
    match err {
        SignerError::Remote { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "vault sealed");
        }
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_signature_is_decode_error() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let key = key_ref();
    Mock::given(method("POST"))
        .and(path(key_path(&key, "/sign")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"signature": "0xnothex"})))
        .mount(&server)
        .await;

    let err = signer(&server, key).sign(b"m").await.unwrap_err();
    assert!(matches!(err, SignerError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn test_verify_distinguishes_invalid_from_unavailable() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let key = key_ref();
    let signature = Keypair::generate().sign(b"m");

    Mock::given(method("POST"))
        .and(path(key_path(&key, "/verify")))
        .and(body_partial_json(json!({"signature": hex::encode(signature.as_bytes())})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"verified": false})))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let signer = signer(&server, key);
    assert!(!signer.verify(b"m", &signature).await.unwrap());

    Mock::given(method("POST"))
        .and(path(key_path(&key, "/verify")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = signer.verify(b"m", &signature).await.unwrap_err();
    assert!(err.is_remote());
}

#[tokio::test]
async fn test_fetch_unknown_key_is_missing_key() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let key = key_ref();
    Mock::given(method("GET"))
        .and(path(key_path(&key, "")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = CustodiedSigner::fetch(client(&server), key, Credential::new(REFRESH))
        .await
        .unwrap_err();

    match err {
        SignerError::MissingKey {
            custody_domain_id,
            key_id,
        } => {
            assert_eq!(custody_domain_id, key.custody_domain_id);
            assert_eq!(key_id, key.key_id);
        }
        other => panic!("expected missing key, got {other:?}"),
    }
}

#[tokio::test]
async fn test_public_key_is_fetched_once() {
    let server = MockServer::start().await;
    let pk = Keypair::generate().public_key();
    let key = key_ref();

    Mock::given(method("POST"))
        .and(path("/api/v1/tokens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": ACCESS})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(key_path(&key, "")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": key.key_id,
            "public_key": format!("0x{pk}"),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let signer = signer(&server, key);
    assert_eq!(signer.public_key().await.unwrap(), pk);
    assert_eq!(signer.public_key().await.unwrap(), pk);
}

#[tokio::test]
async fn test_create_key_uses_returned_identifiers() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let domain = Uuid::new_v4();
    let key_id = Uuid::new_v4();
    let pk = Keypair::generate().public_key();

    Mock::given(method("POST"))
        .and(path(format!("/api/v1/vaults/{domain}/keys")))
        .and(body_partial_json(json!({
            "type": "asymmetric",
            "usage": "sign/verify",
            "spec": "Ed25519",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": key_id,
            "public_key": format!("0x{pk}"),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let signer = CustodiedSigner::create(client(&server), domain, Credential::new(REFRESH), "validator")
        .await
        .unwrap();

    assert_eq!(signer.key_ref().custody_domain_id, domain);
    assert_eq!(signer.key_ref().key_id, key_id);
    assert_eq!(signer.public_key().await.unwrap(), pk);
}

#[tokio::test]
async fn test_deadline_yields_cancelled() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let key = key_ref();
    Mock::given(method("POST"))
        .and(path(key_path(&key, "/sign")))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let config =
        CustodyConfig::new(server.uri()).with_request_timeout(Duration::from_millis(100));
    let signer = CustodiedSigner::new(
        CustodyClient::new(config).unwrap(),
        key,
        Credential::new(REFRESH),
    );

    let err = signer.sign(b"m").await.unwrap_err();
    assert!(err.is_cancelled(), "got {err:?}");
}

#[tokio::test]
async fn test_cancellation_aborts_in_flight_request() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let key = key_ref();
    Mock::given(method("POST"))
        .and(path(key_path(&key, "/sign")))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    let signer = CustodiedSigner::new(
        client(&server).with_cancellation(token.clone()),
        key,
        Credential::new(REFRESH),
    );

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
    });

    let err = signer.sign(b"m").await.unwrap_err();
    canceller.await.unwrap();
    assert!(err.is_cancelled(), "got {err:?}");
}

#[tokio::test]
async fn test_cancelled_token_fails_fast() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/tokens"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    token.cancel();

    let signer = CustodiedSigner::new(
        client(&server).with_cancellation(token),
        key_ref(),
        Credential::new(REFRESH),
    );

    let err = signer.sign(b"m").await.unwrap_err();
    assert!(err.is_cancelled(), "got {err:?}");
}
