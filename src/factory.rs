// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Factory
//!
//! Resolves, validates and constructs [`Wallet`] handles. Client-side
//! keys go through `get_or_create_wallet` (session-scoped `me:`
//! locators, reconciling against whatever the backend already has);
//! server-side keys address wallets explicitly through `get_wallet`.
//!
//! Reconciliation against an existing wallet enforces, in order: owner
//! match (email-normalized), chain-family compatibility, admin signer
//! kind and deep field equality, and the delegated-signer subset law.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::info;

use crate::api::{ApiClient, CreateWalletRequest, HttpApiClient, WalletResponse};
use crate::chains::Chain;
use crate::config::{ApiEnvironment, SdkConfig};
use crate::error::WalletError;
use crate::signers::validation::{
    compare_signer_configs, normalize_email, validate_delegated_signers,
};
use crate::signers::{signer_for_config, Signer, SignerConfig};
use crate::wallet::Wallet;

const SMART_WALLET_TYPE: &str = "smart";

/// Arguments for resolving or creating a wallet.
#[derive(Debug, Clone)]
pub struct WalletArgs {
    pub chain: Chain,
    pub signer: SignerConfig,
    /// Linked-user locator recorded as the wallet owner.
    pub owner: Option<String>,
    pub alias: Option<String>,
    /// Delegated signer locators expected to exist on the wallet.
    pub delegated_signers: Vec<String>,
}

impl WalletArgs {
    /// Arguments for `chain` with the default api-key admin signer.
    pub fn new(chain: Chain) -> Self {
        Self {
            chain,
            signer: SignerConfig::default(),
            owner: None,
            alias: None,
            delegated_signers: Vec::new(),
        }
    }

    pub fn with_signer(mut self, signer: SignerConfig) -> Self {
        self.signer = signer;
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_delegated_signers(mut self, locators: Vec<String>) -> Self {
        self.delegated_signers = locators;
        self
    }
}

pub struct WalletFactory {
    api: Arc<dyn ApiClient>,
    environment: ApiEnvironment,
}

impl WalletFactory {
    pub fn new(api: Arc<dyn ApiClient>, environment: ApiEnvironment) -> Self {
        Self { api, environment }
    }

    /// Build a factory backed by the HTTP client for `config`.
    pub fn from_config(config: SdkConfig) -> Result<Self, WalletError> {
        let environment = config.environment;
        let api: Arc<dyn ApiClient> = Arc::new(HttpApiClient::new(config)?);
        Ok(Self { api, environment })
    }

    /// Resolve the session wallet for the chain family, creating it on
    /// first use. Client-side keys only.
    pub async fn get_or_create_wallet(&self, args: WalletArgs) -> Result<Wallet, WalletError> {
        if self.api.is_server_side() {
            return Err(WalletError::WalletCreation(
                "get_or_create_wallet is not supported on server side".to_string(),
            ));
        }
        self.environment.ensure_chain_allowed(args.chain)?;

        let locator = SdkConfig::self_locator(args.chain.family(), args.alias.as_deref());
        match self.api.get_wallet(&locator).await.into_result() {
            Ok(existing) => {
                self.validate_existing_wallet_config(&existing, &args)?;
                self.bind_wallet(existing, args)
            }
            Err(_) => self.create_wallet(args).await,
        }
    }

    /// Fetch a wallet by explicit locator. Server-side keys only.
    pub async fn get_wallet(
        &self,
        wallet_locator: &str,
        args: WalletArgs,
    ) -> Result<Wallet, WalletError> {
        if !self.api.is_server_side() {
            return Err(WalletError::WalletCreation(
                "get_wallet is not supported on client side, use get_or_create_wallet instead"
                    .to_string(),
            ));
        }
        self.environment.ensure_chain_allowed(args.chain)?;

        let wallet = self
            .api
            .get_wallet(wallet_locator)
            .await
            .into_result()
            .map_err(|failure| WalletError::WalletNotAvailable(failure.describe()))?;
        self.validate_existing_wallet_config(&wallet, &args)?;
        self.bind_wallet(wallet, args)
    }

    /// Create a new remote wallet. Passkey signers materialize their
    /// WebAuthn credential before the admin-signer config is sent.
    pub async fn create_wallet(&self, mut args: WalletArgs) -> Result<Wallet, WalletError> {
        self.environment.ensure_chain_allowed(args.chain)?;
        args.signer = self.materialize_signer(args.signer).await?;

        let request = CreateWalletRequest {
            chain_type: args.chain.family(),
            wallet_type: SMART_WALLET_TYPE.to_string(),
            config: json!({ "adminSigner": declared_signer_payload(&args.signer) }),
            linked_user: args.owner.clone(),
            alias: args.alias.clone(),
        };
        let wallet = self
            .api
            .create_wallet(&request)
            .await
            .into_result()
            .map_err(|failure| WalletError::WalletCreation(failure.describe()))?;
        info!(address = %wallet.address, chain = %args.chain, "wallet created");
        self.bind_wallet(wallet, args)
    }

    // -- Reconciliation -------------------------------------------------

    /// Validate caller args against an existing wallet record.
    fn validate_existing_wallet_config(
        &self,
        wallet: &WalletResponse,
        args: &WalletArgs,
    ) -> Result<(), WalletError> {
        // Owner comparison, email-normalized.
        if let (Some(declared), Some(existing)) = (&args.owner, &wallet.owner) {
            if normalize_email(declared) != normalize_email(existing) {
                return Err(WalletError::WalletCreation(format!(
                    "declared owner \"{declared}\" does not match existing wallet owner \
                     \"{existing}\""
                )));
            }
        }

        // Chain-family compatibility.
        if wallet.chain_type != args.chain.family() {
            return Err(WalletError::WalletCreation(format!(
                "chain {} is not compatible with an existing {} wallet",
                args.chain, wallet.chain_type
            )));
        }

        // Smart wallets: admin signer kind, then deep field comparison.
        if wallet.wallet_type == SMART_WALLET_TYPE {
            if let Some(existing_signer) = &wallet.config.admin_signer {
                let declared_kind = args.signer.kind();
                if let Some(existing_kind) = existing_signer.get("type").and_then(Value::as_str) {
                    if existing_kind != declared_kind.as_str() {
                        return Err(WalletError::WalletCreation(format!(
                            "declared signer kind \"{declared_kind}\" does not match existing \
                             admin signer kind \"{existing_kind}\""
                        )));
                    }
                }
                compare_signer_configs(&declared_signer_payload(&args.signer), existing_signer)?;
            }
        }

        // Delegated-signer subset law.
        let existing_delegated = wallet
            .config
            .delegated_signers
            .clone()
            .unwrap_or_default();
        validate_delegated_signers(&args.delegated_signers, &wallet.address, &existing_delegated)
    }

    // -- Signer materialization -----------------------------------------

    /// Fill in backend-assigned signer state missing from the caller's
    /// declaration. Passkeys without a credential id create one through
    /// the WebAuthn callbacks.
    async fn materialize_signer(&self, config: SignerConfig) -> Result<SignerConfig, WalletError> {
        match config {
            SignerConfig::Passkey {
                name,
                id: None,
                callbacks,
            } => {
                let callbacks = callbacks.ok_or_else(|| {
                    WalletError::InvalidSigner(
                        "passkey signer requires WebAuthn callbacks".to_string(),
                    )
                })?;
                let display_name = name.clone().unwrap_or_else(|| "Relational Wallet".to_string());
                let credential = callbacks.create_credential(&display_name).await?;
                Ok(SignerConfig::Passkey {
                    name: Some(display_name),
                    id: Some(credential.id),
                    callbacks: Some(callbacks),
                })
            }
            other => Ok(other),
        }
    }

    /// Merge the backend's admin-signer record with the caller's signer
    /// declaration into a concrete signer.
    fn to_internal_signer_config(
        &self,
        existing_record: Option<&Value>,
        config: &SignerConfig,
    ) -> Result<Arc<dyn Signer>, WalletError> {
        let Some(record) = existing_record else {
            return signer_for_config(config);
        };

        if let Some(recorded_kind) = record.get("type").and_then(Value::as_str) {
            if recorded_kind != config.kind().as_str() {
                return Err(WalletError::WalletCreation(format!(
                    "declared signer kind \"{}\" does not match wallet admin signer kind \
                     \"{recorded_kind}\"",
                    config.kind()
                )));
            }
        }

        // Passkey credential ids live on the wallet record.
        if let SignerConfig::Passkey {
            name,
            id: None,
            callbacks,
        } = config
        {
            let id = record
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    WalletError::WalletCreation(
                        "existing passkey admin signer has no credential id".to_string(),
                    )
                })?;
            return signer_for_config(&SignerConfig::Passkey {
                name: name.clone(),
                id: Some(id),
                callbacks: callbacks.clone(),
            });
        }

        signer_for_config(config)
    }

    fn bind_wallet(&self, wallet: WalletResponse, args: WalletArgs) -> Result<Wallet, WalletError> {
        let signer =
            self.to_internal_signer_config(wallet.config.admin_signer.as_ref(), &args.signer)?;
        Wallet::new(
            args.chain,
            wallet.address,
            wallet.owner.or(args.owner),
            args.alias.or(wallet.alias),
            signer,
            self.api.clone(),
        )
    }
}

/// Admin-signer payload as declared by the caller, in the wire shape
/// used for both creation and reconciliation. Absent optional fields are
/// omitted entirely so reconciliation only compares what the caller
/// actually declared.
fn declared_signer_payload(config: &SignerConfig) -> Value {
    match config {
        SignerConfig::ApiKey => json!({ "type": "api-key" }),
        SignerConfig::Passkey { name, id, .. } => {
            let mut payload = serde_json::Map::new();
            payload.insert("type".to_string(), json!("passkey"));
            if let Some(name) = name {
                payload.insert("name".to_string(), json!(name));
            }
            if let Some(id) = id {
                payload.insert("id".to_string(), json!(id));
            }
            Value::Object(payload)
        }
        SignerConfig::ExternalWallet { address, .. } => json!({
            "type": "external-wallet",
            "address": address,
        }),
        SignerConfig::Email { email, .. } => json!({
            "type": "email",
            "email": email.trim().to_lowercase(),
        }),
        SignerConfig::Phone { phone, .. } => json!({
            "type": "phone",
            "phone": phone.trim(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApiClient;
    use crate::api::{ApiFailure, ApiResponse, DelegatedSignerDto, WalletConfigDto};
    use crate::chains::{Chain, ChainFamily, EvmChain};
    use crate::signers::{PasskeyCallbacks, PasskeyCredential, PasskeyPublicKey, PasskeySignature};
    use async_trait::async_trait;

    const EVM_ADDRESS: &str = "0x1111111111111111111111111111111111111111";
    const SOLANA_ADDRESS: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

    fn evm_args() -> WalletArgs {
        WalletArgs {
            chain: Chain::Evm(EvmChain::BaseSepolia),
            signer: SignerConfig::ApiKey,
            owner: None,
            alias: None,
            delegated_signers: Vec::new(),
        }
    }

    fn api_key_wallet_response(address: &str, family: ChainFamily) -> WalletResponse {
        WalletResponse {
            chain_type: family,
            wallet_type: SMART_WALLET_TYPE.to_string(),
            address: address.to_string(),
            owner: None,
            alias: None,
            config: WalletConfigDto {
                admin_signer: Some(json!({ "type": "api-key" })),
                delegated_signers: None,
            },
            created_at: Some(1),
        }
    }

    fn client_factory(api: Arc<MockApiClient>) -> WalletFactory {
        WalletFactory::new(api, ApiEnvironment::Staging)
    }

    #[tokio::test]
    async fn get_or_create_is_client_side_only() {
        let api = Arc::new(MockApiClient::server_side());
        let factory = WalletFactory::new(api, ApiEnvironment::Staging);
        let err = factory.get_or_create_wallet(evm_args()).await.unwrap_err();
        match err {
            WalletError::WalletCreation(message) => {
                assert!(message.contains("not supported on server side"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn get_wallet_is_server_side_only() {
        let api = Arc::new(MockApiClient::new());
        let factory = client_factory(api);
        let err = factory
            .get_wallet(EVM_ADDRESS, evm_args())
            .await
            .unwrap_err();
        match err {
            WalletError::WalletCreation(message) => {
                assert!(message.contains("use get_or_create_wallet instead"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let api = Arc::new(MockApiClient::new());
        // First resolution: nothing exists yet, the wallet is created.
        api.queue_wallet(ApiResponse::Failure(ApiFailure::from_message("not found")));
        api.queue_created_wallet(ApiResponse::Success(api_key_wallet_response(
            EVM_ADDRESS,
            ChainFamily::Evm,
        )));
        // Second resolution: the wallet is fetched.
        api.queue_wallet(ApiResponse::Success(api_key_wallet_response(
            EVM_ADDRESS,
            ChainFamily::Evm,
        )));

        let factory = client_factory(api.clone());
        let first = factory.get_or_create_wallet(evm_args()).await.unwrap();
        let second = factory.get_or_create_wallet(evm_args()).await.unwrap();

        assert_eq!(first.address(), EVM_ADDRESS);
        assert_eq!(second.address(), EVM_ADDRESS);
        assert_eq!(api.call_count("createWallet"), 1);
        assert_eq!(api.call_count("getWallet"), 2);
    }

    #[tokio::test]
    async fn environment_law_is_enforced_before_any_api_call() {
        let api = Arc::new(MockApiClient::new());
        let factory = WalletFactory::new(api.clone(), ApiEnvironment::Production);
        let err = factory.get_or_create_wallet(evm_args()).await.unwrap_err();
        assert!(matches!(err, WalletError::InvalidEnvironment { .. }));
        assert_eq!(api.call_count("getWallet"), 0);
    }

    #[tokio::test]
    async fn mismatched_admin_signer_kind_is_fatal() {
        let api = Arc::new(MockApiClient::new());
        let mut response = api_key_wallet_response(EVM_ADDRESS, ChainFamily::Evm);
        response.config.admin_signer = Some(json!({
            "type": "external-wallet",
            "address": "0xExisting",
        }));
        api.queue_wallet(ApiResponse::Success(response));

        let factory = client_factory(api);
        let err = factory.get_or_create_wallet(evm_args()).await.unwrap_err();
        match err {
            WalletError::WalletCreation(message) => {
                assert!(message.contains("does not match existing admin signer kind"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn gmail_spellings_of_the_same_owner_reconcile() {
        let api = Arc::new(MockApiClient::new());
        let mut response = api_key_wallet_response(EVM_ADDRESS, ChainFamily::Evm);
        response.owner = Some("email:jercoffey@gmail.com".to_string());
        api.queue_wallet(ApiResponse::Success(response));

        let factory = client_factory(api);
        let mut args = evm_args();
        args.owner = Some("email:jer.coffey@gmail.com".to_string());
        let wallet = factory.get_or_create_wallet(args).await.unwrap();
        assert_eq!(wallet.owner(), Some("email:jercoffey@gmail.com"));
    }

    #[tokio::test]
    async fn different_owners_do_not_reconcile() {
        let api = Arc::new(MockApiClient::new());
        let mut response = api_key_wallet_response(EVM_ADDRESS, ChainFamily::Evm);
        response.owner = Some("email:alice@example.com".to_string());
        api.queue_wallet(ApiResponse::Success(response));

        let factory = client_factory(api);
        let mut args = evm_args();
        args.owner = Some("email:bob@example.com".to_string());
        let err = factory.get_or_create_wallet(args).await.unwrap_err();
        assert!(matches!(err, WalletError::WalletCreation(_)));
    }

    #[tokio::test]
    async fn chain_family_mismatch_is_fatal() {
        let api = Arc::new(MockApiClient::new());
        api.queue_wallet(ApiResponse::Success(api_key_wallet_response(
            SOLANA_ADDRESS,
            ChainFamily::Solana,
        )));

        let factory = client_factory(api);
        let err = factory.get_or_create_wallet(evm_args()).await.unwrap_err();
        match err {
            WalletError::WalletCreation(message) => {
                assert!(message.contains("not compatible"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn delegated_signer_subset_violation_is_fatal() {
        let api = Arc::new(MockApiClient::new());
        let mut response = api_key_wallet_response(EVM_ADDRESS, ChainFamily::Evm);
        response.config.delegated_signers = Some(vec![DelegatedSignerDto {
            locator: "external-wallet:0xAAA".to_string(),
            signer_type: None,
            address: None,
        }]);
        api.queue_wallet(ApiResponse::Success(response));

        let factory = client_factory(api);
        let mut args = evm_args();
        args.delegated_signers = vec!["external-wallet:0xMISSING".to_string()];
        let err = factory.get_or_create_wallet(args).await.unwrap_err();
        match err {
            WalletError::WalletCreation(message) => {
                assert!(message.contains("does not exist in wallet"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn subset_of_existing_delegated_signers_is_accepted() {
        let api = Arc::new(MockApiClient::new());
        let mut response = api_key_wallet_response(EVM_ADDRESS, ChainFamily::Evm);
        response.config.delegated_signers = Some(vec![
            DelegatedSignerDto {
                locator: "external-wallet:0xAAA".to_string(),
                signer_type: None,
                address: None,
            },
            DelegatedSignerDto {
                locator: "external-wallet:0xBBB".to_string(),
                signer_type: None,
                address: None,
            },
        ]);
        api.queue_wallet(ApiResponse::Success(response));

        let factory = client_factory(api);
        let mut args = evm_args();
        args.delegated_signers = vec!["external-wallet:0xBBB".to_string()];
        assert!(factory.get_or_create_wallet(args).await.is_ok());
    }

    struct TestPasskey;

    #[async_trait]
    impl PasskeyCallbacks for TestPasskey {
        async fn create_credential(&self, _name: &str) -> Result<PasskeyCredential, WalletError> {
            Ok(PasskeyCredential {
                id: "cred-77".to_string(),
                public_key: PasskeyPublicKey {
                    x: "11".to_string(),
                    y: "22".to_string(),
                },
            })
        }

        async fn sign(&self, _challenge: &str) -> Result<PasskeySignature, WalletError> {
            Ok(PasskeySignature {
                r: "r".to_string(),
                s: "s".to_string(),
                metadata: None,
            })
        }
    }

    #[tokio::test]
    async fn passkey_creation_materializes_a_credential_first() {
        let api = Arc::new(MockApiClient::new());
        let mut response = api_key_wallet_response(EVM_ADDRESS, ChainFamily::Evm);
        response.config.admin_signer = Some(json!({
            "type": "passkey",
            "id": "cred-77",
            "name": "main",
        }));
        api.queue_created_wallet(ApiResponse::Success(response));

        let factory = client_factory(api.clone());
        let mut args = evm_args();
        args.signer = SignerConfig::Passkey {
            name: Some("main".to_string()),
            id: None,
            callbacks: Some(Arc::new(TestPasskey)),
        };
        let wallet = factory.create_wallet(args).await.unwrap();

        assert_eq!(wallet.signer_locator(), "passkey:cred-77");
        let create = &api.calls()[0];
        assert_eq!(create.args["config"]["adminSigner"]["type"], "passkey");
        assert_eq!(create.args["config"]["adminSigner"]["id"], "cred-77");
    }

    #[tokio::test]
    async fn existing_passkey_wallet_supplies_the_credential_id() {
        let api = Arc::new(MockApiClient::new());
        let mut response = api_key_wallet_response(EVM_ADDRESS, ChainFamily::Evm);
        response.config.admin_signer = Some(json!({
            "type": "passkey",
            "id": "cred-88",
        }));
        api.queue_wallet(ApiResponse::Success(response));

        let factory = client_factory(api);
        let mut args = evm_args();
        args.signer = SignerConfig::Passkey {
            name: None,
            id: None,
            callbacks: Some(Arc::new(TestPasskey)),
        };
        let wallet = factory.get_or_create_wallet(args).await.unwrap();
        assert_eq!(wallet.signer_locator(), "passkey:cred-88");
    }

    #[tokio::test]
    async fn server_side_get_wallet_maps_missing_wallets() {
        let api = Arc::new(MockApiClient::server_side());
        api.queue_wallet(ApiResponse::Failure(ApiFailure::from_message("not found")));

        let factory = WalletFactory::new(api, ApiEnvironment::Staging);
        let err = factory
            .get_wallet(EVM_ADDRESS, evm_args())
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::WalletNotAvailable(_)));
    }
}
