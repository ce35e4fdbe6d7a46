//! CLI command implementations.

use crate::settings::TesseraConfig;
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::path::Path;
use tessera_crypto::{Address, PublicKey};
use tessera_identity::{load_or_create, NodeId};
use tessera_privval::{LastSignState, Validator, KEY_FILE, STATE_FILE};
use tessera_signer::{CustodyClient, SignerKind};

/// Validator key summary printed by `show-validator`.
#[derive(Debug, Serialize)]
pub struct ValidatorInfo {
    /// Validator address.
    pub address: Address,
    /// Validator public key.
    pub pub_key: PublicKey,
    /// Where the key material lives.
    pub kind: SignerKind,
}

/// Creates the node identity and the validator if they do not exist.
pub async fn init(config: &TesseraConfig, client: &CustodyClient) -> Result<()> {
    let options = config.custody_options();
    let node_key = config.node_key_path();
    let root = config.privval_root();

    tracing::info!(home = %config.home.display(), "Initializing node");

    let identity = load_or_create(&node_key, &options, client)
        .await
        .with_context(|| format!("failed to initialize node key {}", node_key.display()))?;
    let validator = Validator::load_or_create(&root, &options, client)
        .await
        .with_context(|| format!("failed to initialize validator in {}", root.display()))?;

    println!("Node ID:           {}", identity.node_id().await?);
    println!("Validator address: {}", validator.address().await?);
    println!("Node key:          {}", node_key.display());
    println!("Validator state:   {}", root.join(STATE_FILE).display());

    Ok(())
}

/// Prints the node's peer identifier.
pub async fn show_node_id(config: &TesseraConfig, client: &CustodyClient) -> Result<()> {
    let node_key = config.node_key_path();
    require(&node_key)?;

    let identity = load_or_create(&node_key, &config.custody_options(), client).await?;
    let node_id: NodeId = identity.node_id().await?;
    println!("{node_id}");

    Ok(())
}

/// Prints the validator's public key and address as JSON.
pub async fn show_validator(config: &TesseraConfig, client: &CustodyClient) -> Result<()> {
    let key_file = config.privval_root().join(KEY_FILE);
    require(&key_file)?;

    let identity = load_or_create(&key_file, &config.custody_options(), client).await?;
    let pub_key = identity.public_key().await?;
    let info = ValidatorInfo {
        address: pub_key.address(),
        pub_key,
        kind: identity.kind(),
    };

    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

/// Prints the persisted sign state as JSON.
pub fn inspect_state(config: &TesseraConfig) -> Result<()> {
    let state_file = config.privval_root().join(STATE_FILE);
    require(&state_file)?;

    let state = LastSignState::load(&state_file)?;
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

fn require(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!(
            "{} does not exist; run `tessera init` first",
            path.display()
        );
    }
    Ok(())
}
