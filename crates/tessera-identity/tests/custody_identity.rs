//! Identity creation against a mocked custody service.

use pretty_assertions::assert_eq;
use serde_json::json;
use tessera_crypto::Keypair;
use tessera_identity::{load_or_create, CustodyOptions, IdentityError, NodeId};
use tessera_signer::{
    Credential, CustodyClient, CustodyConfig, CustodyKeyRef, SignerError, SignerKind,
};
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/tokens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "a"})))
        .mount(server)
        .await;
}

fn client(server: &MockServer) -> CustodyClient {
    CustodyClient::new(CustodyConfig::new(server.uri())).unwrap()
}

#[tokio::test]
async fn test_create_in_custody_persists_reference_only() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let domain = Uuid::new_v4();
    let key_id = Uuid::new_v4();
    let pk = Keypair::generate().public_key();

    Mock::given(method("POST"))
        .and(path(format!("/api/v1/vaults/{domain}/keys")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": key_id,
            "public_key": format!("0x{pk}"),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("validator.json");
    let options = CustodyOptions::create(Credential::new("refresh-secret"), domain);

    let identity = load_or_create(&file, &options, &client(&server))
        .await
        .unwrap();
    assert_eq!(identity.kind(), SignerKind::Custodied);
    assert_eq!(identity.node_id().await.unwrap(), NodeId::from_public_key(&pk));

    let stored = std::fs::read_to_string(&file).unwrap();
    assert!(!stored.contains("refresh-secret"));
    let stored: serde_json::Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(stored["type"], "custodied");
    assert_eq!(stored["key_id"], key_id.to_string());

    // Restart: the record is reused and no second key is created.
    let reloaded = load_or_create(&file, &options, &client(&server))
        .await
        .unwrap();
    assert_eq!(
        reloaded.custody_ref(),
        Some(CustodyKeyRef {
            custody_domain_id: domain,
            key_id
        })
    );
}

#[tokio::test]
async fn test_unwritable_record_reports_created_key() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let domain = Uuid::new_v4();
    let key_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path(format!("/api/v1/vaults/{domain}/keys")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": key_id,
            "public_key": Keypair::generate().public_key().to_string(),
        })))
        .expect(1)
        .mount(&server)
        .await;

    // A regular file where the record's directory should be.
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("config");
    std::fs::write(&blocker, b"").unwrap();
    let file = blocker.join("validator.json");

    let options = CustodyOptions::create(Credential::new("refresh-secret"), domain);
    let err = load_or_create(&file, &options, &client(&server))
        .await
        .unwrap_err();

    match err {
        IdentityError::UnrecordedKey { key, path, source } => {
            assert_eq!(
                key,
                CustodyKeyRef {
                    custody_domain_id: domain,
                    key_id
                }
            );
            assert_eq!(path, file);
            assert!(matches!(*source, IdentityError::Io { .. }));
        }
        other => panic!("expected unrecorded key, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_missing_key_leaves_no_record() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let key = CustodyKeyRef {
        custody_domain_id: Uuid::new_v4(),
        key_id: Uuid::new_v4(),
    };
    Mock::given(method("GET"))
        .and(path(format!(
            "/api/v1/vaults/{}/keys/{}",
            key.custody_domain_id, key.key_id
        )))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("validator.json");
    let options = CustodyOptions::fetch(Credential::new("r"), key);

    let err = load_or_create(&file, &options, &client(&server))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        IdentityError::Signer(SignerError::MissingKey { .. })
    ));
    assert!(!file.exists());
}

#[tokio::test]
async fn test_public_key_failure_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tokens"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let key = CustodyKeyRef {
        custody_domain_id: Uuid::new_v4(),
        key_id: Uuid::new_v4(),
    };
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("validator.json");
    std::fs::write(
        &file,
        json!({
            "type": "custodied",
            "custody_domain_id": key.custody_domain_id,
            "key_id": key.key_id,
        })
        .to_string(),
    )
    .unwrap();

    let identity = load_or_create(&file, &CustodyOptions::fetch(Credential::new("r"), key), &client(&server))
        .await
        .unwrap();

    let err = identity.address().await.unwrap_err();
    assert!(matches!(err, IdentityError::Signer(SignerError::Auth(_))));
}
