// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Engine
//!
//! Drives the two-phase remote resource lifecycle uniformly across
//! chains: *create* a transaction or signature resource, then
//! *approve-and-wait* until the backend reports a terminal state.
//!
//! ```text
//! CREATED --(no pending approvals)--> SUCCESS | FAILED
//! CREATED --(pending approvals exist)--> AWAITING_APPROVAL
//! AWAITING_APPROVAL --(local signers sign each approval)--> SUBMITTED
//! SUBMITTED --(poll)--> SUCCESS | FAILED | (pending, repeat poll)
//! ```
//!
//! Resources are never mutated locally; every state transition is
//! observed by polling the remote record. The poll loop waits one fixed
//! initial delay, then backs off geometrically via [`next_delay`] until
//! the status leaves `pending` or the timeout elapses.

pub mod evm;
pub mod solana;
pub mod stellar;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::{
    ApiClient, ApprovalSubmission, ApprovalsDto, CreateResourceRequest, DelegatedSignerDto,
    RegisterSignerRequest, RegisterSignerResponse, ResourceStatus, SendTokenRequest,
    SubmittedApprovalDto, TokenBalanceItem, TransactionResponse,
};
use crate::chains::Chain;
use crate::config::SdkConfig;
use crate::error::WalletError;
use crate::signers::{Signer, SignerKind};

pub use evm::EvmWallet;
pub use solana::SolanaWallet;
pub use stellar::StellarWallet;

// =============================================================================
// Polling
// =============================================================================

/// Completion-poll tuning. The defaults match the backend's typical
/// confirmation latency; callers override per wallet when needed.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Fixed wait before the first poll; the resource is essentially
    /// never terminal this early.
    pub initial_delay: Duration,
    /// First inter-poll interval.
    pub interval: Duration,
    /// Geometric growth factor applied after each pending poll.
    pub multiplier: f64,
    /// Upper bound on the inter-poll interval.
    pub max_interval: Duration,
    /// Total confirmation budget.
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(1_000),
            interval: Duration::from_millis(500),
            multiplier: 1.5,
            max_interval: Duration::from_secs(5),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Next inter-poll delay: grow by `multiplier`, never past `cap`.
pub fn next_delay(current: Duration, multiplier: f64, cap: Duration) -> Duration {
    current.mul_f64(multiplier).min(cap)
}

// =============================================================================
// Results & options
// =============================================================================

/// Terminal result of a confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionResult {
    pub hash: String,
    pub transaction_id: String,
    pub explorer_link: Option<String>,
}

/// Reshaped balance view: native token and usdc are always present,
/// further requested tokens follow in request order.
#[derive(Debug, Clone)]
pub struct Balances {
    pub native_token: TokenBalanceItem,
    pub usdc: TokenBalanceItem,
    pub tokens: Vec<TokenBalanceItem>,
}

/// Options for [`Wallet::send_with_options`].
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    /// Stop after remote resource creation, returning its id without
    /// driving local signing or polling.
    pub experimental_prepare_only: bool,
}

/// Outcome of a send that may have stopped at the prepare stage.
#[derive(Debug, Clone)]
pub enum SendOutcome {
    Prepared { transaction_id: String },
    Completed(TransactionResult),
}

/// The resource an approval call operates on. Exactly one id per call
/// is enforced structurally.
#[derive(Debug, Clone)]
pub enum ApprovalTarget {
    Transaction(String),
    Signature(String),
}

/// Options for [`Wallet::approve`].
#[derive(Debug, Clone, Default)]
pub struct ApproveOptions {
    /// Externally produced approval submitted verbatim instead of
    /// signing locally.
    pub experimental_approval: Option<SubmittedApprovalDto>,
}

/// Options for [`Wallet::add_delegated_signer`].
#[derive(Debug, Clone, Default)]
pub struct RegisterOptions {
    pub experimental_prepare_only: bool,
}

/// Outcome of a delegated-signer registration.
#[derive(Debug, Clone)]
pub enum RegistrationOutcome {
    /// Prepare-only: the pending resource id, nothing driven further.
    Prepared { id: String },
    /// Registration completed without an on-chain transaction result.
    Registered,
    /// Registration completed through an on-chain transaction.
    Completed(TransactionResult),
}

// =============================================================================
// Wallet
// =============================================================================

/// A bound remote wallet. Immutable once constructed; all operations go
/// through the shared [`ApiClient`] handle.
#[derive(Clone)]
pub struct Wallet {
    chain: Chain,
    address: String,
    owner: Option<String>,
    alias: Option<String>,
    signer: Arc<dyn Signer>,
    additional_signers: Vec<Arc<dyn Signer>>,
    api: Arc<dyn ApiClient>,
    poll: PollConfig,
}

// Not derived: `Arc<dyn Signer>` has no `Debug`; the signer is shown by
// its locator instead.
impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("chain", &self.chain)
            .field("address", &self.address)
            .field("owner", &self.owner)
            .field("alias", &self.alias)
            .field("signer", &self.signer.locator())
            .finish_non_exhaustive()
    }
}

impl Wallet {
    pub(crate) fn new(
        chain: Chain,
        address: String,
        owner: Option<String>,
        alias: Option<String>,
        signer: Arc<dyn Signer>,
        api: Arc<dyn ApiClient>,
    ) -> Result<Self, WalletError> {
        if !chain.is_valid_address(&address) {
            return Err(WalletError::WalletCreation(format!(
                "address \"{address}\" is not valid for chain {chain}"
            )));
        }
        Ok(Self {
            chain,
            address,
            owner,
            alias,
            signer,
            additional_signers: Vec::new(),
            api,
            poll: PollConfig::default(),
        })
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn signer_locator(&self) -> String {
        self.signer.locator()
    }

    /// Secondary local signers considered during approval matching.
    pub fn with_additional_signers(mut self, signers: Vec<Arc<dyn Signer>>) -> Self {
        self.additional_signers = signers;
        self
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Wallet locator used on every API path: the literal address on
    /// server-side keys, a `me:` session locator on client-side keys.
    pub fn wallet_locator(&self) -> String {
        if self.api.is_server_side() {
            self.address.clone()
        } else {
            SdkConfig::self_locator(self.chain.family(), self.alias.as_deref())
        }
    }

    /// Token locator for a send: pass-through when already qualified,
    /// otherwise `<chain>:<symbol-or-contract>`.
    pub(crate) fn token_locator(&self, token: &str) -> String {
        if token.contains(':') {
            token.to_string()
        } else {
            format!("{}:{}", self.chain.id(), token.to_lowercase())
        }
    }

    // -- Balances -------------------------------------------------------

    /// Fetch balances for the native token, usdc and any further
    /// requested tokens. A token missing from the response yields a
    /// zero-valued placeholder, never an error.
    pub async fn balances(&self, tokens: &[&str]) -> Result<Balances, WalletError> {
        let native_symbol = self.chain.native_token_symbol();
        let mut requested: Vec<String> = vec![native_symbol.to_string(), "usdc".to_string()];
        for token in tokens {
            let token = token.to_lowercase();
            if !requested.contains(&token) {
                requested.push(token);
            }
        }

        let chains = vec![self.chain.id().to_string()];
        let items = self
            .api
            .get_balance(&self.address, &chains, &requested)
            .await
            .into_result()
            .map_err(|failure| WalletError::WalletNotAvailable(failure.describe()))?;

        let find = |symbol: &str| {
            items
                .iter()
                .find(|item| item.symbol.eq_ignore_ascii_case(symbol))
                .cloned()
                .unwrap_or_else(|| zero_balance(symbol))
        };

        Ok(Balances {
            native_token: find(native_symbol),
            usdc: find("usdc"),
            tokens: requested.iter().skip(2).map(|s| find(s)).collect(),
        })
    }

    // -- Sends ----------------------------------------------------------

    /// Send `amount` of `token` to `recipient` and wait for on-chain
    /// confirmation. The recipient is a chain-native address or a
    /// prefixed locator (`email:`, `phoneNumber:`, `userId:`, ...).
    pub async fn send(
        &self,
        recipient: &str,
        token: &str,
        amount: &str,
    ) -> Result<TransactionResult, WalletError> {
        let transaction_id = self.create_send(recipient, token, amount).await?;
        self.approve_and_wait_transaction(&transaction_id).await
    }

    pub async fn send_with_options(
        &self,
        recipient: &str,
        token: &str,
        amount: &str,
        options: SendOptions,
    ) -> Result<SendOutcome, WalletError> {
        let transaction_id = self.create_send(recipient, token, amount).await?;
        if options.experimental_prepare_only {
            return Ok(SendOutcome::Prepared { transaction_id });
        }
        let result = self.approve_and_wait_transaction(&transaction_id).await?;
        Ok(SendOutcome::Completed(result))
    }

    async fn create_send(
        &self,
        recipient: &str,
        token: &str,
        amount: &str,
    ) -> Result<String, WalletError> {
        let token_locator = self.token_locator(token);
        let request = SendTokenRequest {
            recipient: recipient.to_string(),
            amount: amount.to_string(),
            signer: Some(self.signer.locator()),
        };
        let response = self
            .api
            .send_token(&self.wallet_locator(), &token_locator, &request)
            .await
            .into_result()
            .map_err(|failure| WalletError::TransactionNotCreated(failure.describe()))?;
        info!(transaction_id = %response.id, token = %token_locator, "transfer created");
        Ok(response.id)
    }

    // -- Approvals ------------------------------------------------------

    /// Approve a transaction or signature resource, including ones
    /// created out of band.
    pub async fn approve(
        &self,
        target: ApprovalTarget,
        options: ApproveOptions,
    ) -> Result<(), WalletError> {
        match target {
            ApprovalTarget::Transaction(id) => {
                self.approve_transaction_resource(&id, options.experimental_approval)
                    .await
            }
            ApprovalTarget::Signature(id) => {
                self.approve_signature_resource(&id, options.experimental_approval)
                    .await
            }
        }
    }

    pub(crate) async fn approve_and_wait_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<TransactionResult, WalletError> {
        self.approve_transaction_resource(transaction_id, None)
            .await?;
        self.wait_for_transaction(transaction_id).await
    }

    pub(crate) async fn approve_and_wait_signature(
        &self,
        signature_id: &str,
    ) -> Result<String, WalletError> {
        self.approve_signature_resource(signature_id, None).await?;
        self.wait_for_signature(signature_id).await
    }

    async fn approve_transaction_resource(
        &self,
        transaction_id: &str,
        injected: Option<SubmittedApprovalDto>,
    ) -> Result<(), WalletError> {
        let locator = self.wallet_locator();
        let transaction = self
            .api
            .get_transaction(&locator, transaction_id)
            .await
            .into_result()
            .map_err(|failure| WalletError::TransactionNotAvailable(failure.describe()))?;

        let Some(submission) = self.build_submission(transaction.approvals, injected).await? else {
            return Ok(());
        };

        debug!(
            transaction_id = %transaction_id,
            approvals = submission.approvals.len(),
            "submitting approvals"
        );
        self.api
            .approve_transaction(&locator, transaction_id, &submission)
            .await
            .into_result()
            .map_err(|failure| WalletError::TransactionFailed(failure.describe()))?;
        Ok(())
    }

    async fn approve_signature_resource(
        &self,
        signature_id: &str,
        injected: Option<SubmittedApprovalDto>,
    ) -> Result<(), WalletError> {
        let locator = self.wallet_locator();
        let signature = self
            .api
            .get_signature(&locator, signature_id)
            .await
            .into_result()
            .map_err(|failure| WalletError::SignatureNotAvailable(failure.describe()))?;

        let Some(submission) = self.build_submission(signature.approvals, injected).await? else {
            return Ok(());
        };

        debug!(
            signature_id = %signature_id,
            approvals = submission.approvals.len(),
            "submitting approvals"
        );
        self.api
            .approve_signature(&locator, signature_id, &submission)
            .await
            .into_result()
            .map_err(|failure| WalletError::SignatureFailed(failure.describe()))?;
        Ok(())
    }

    /// Sign every pending approval and batch the results into a single
    /// submission. All approvals for one resource go out in one call;
    /// partial submission would strand the resource in an inconsistent
    /// multi-signer state. Returns `None` when there is nothing to
    /// submit (api-key signer, or no pending approvals).
    async fn build_submission(
        &self,
        approvals: Option<ApprovalsDto>,
        injected: Option<SubmittedApprovalDto>,
    ) -> Result<Option<ApprovalSubmission>, WalletError> {
        if let Some(approval) = injected {
            return Ok(Some(ApprovalSubmission {
                approvals: vec![approval],
            }));
        }

        // API key signers approve on the backend automatically.
        if self.signer.kind() == SignerKind::ApiKey {
            debug!("api-key signer, skipping local approval");
            return Ok(None);
        }

        let pending = match approvals {
            Some(approvals) if !approvals.pending.is_empty() => approvals.pending,
            _ => return Ok(None),
        };

        let mut submissions = Vec::with_capacity(pending.len());
        for approval in pending {
            let signer = self.matching_signer(&approval.signer)?;
            let output = match &approval.transaction {
                // Solana approvals sign the full on-chain transaction
                // payload rather than a digest.
                Some(transaction) if self.chain == Chain::Solana => {
                    signer.sign_transaction(transaction).await?
                }
                _ => signer.sign_message(&approval.message).await?,
            };
            let (signature, metadata) = output.into_wire();
            submissions.push(SubmittedApprovalDto {
                signer: approval.signer,
                signature,
                metadata,
            });
        }
        Ok(Some(ApprovalSubmission {
            approvals: submissions,
        }))
    }

    fn matching_signer(&self, locator: &str) -> Result<&Arc<dyn Signer>, WalletError> {
        std::iter::once(&self.signer)
            .chain(self.additional_signers.iter())
            .find(|signer| signer.locator() == locator)
            .ok_or_else(|| {
                WalletError::InvalidSigner(format!(
                    "signer {locator} not found in pending approvals"
                ))
            })
    }

    // -- Polling --------------------------------------------------------

    /// Poll a transaction to its terminal state.
    pub async fn wait_for_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<TransactionResult, WalletError> {
        let locator = self.wallet_locator();
        let started = tokio::time::Instant::now();
        tokio::time::sleep(self.poll.initial_delay).await;
        let mut delay = self.poll.interval;

        loop {
            if started.elapsed() >= self.poll.timeout {
                warn!(transaction_id = %transaction_id, "confirmation poll budget exceeded");
                return Err(WalletError::TransactionConfirmationTimeout {
                    timeout_ms: self.poll.timeout.as_millis() as u64,
                });
            }

            let transaction = self
                .api
                .get_transaction(&locator, transaction_id)
                .await
                .into_result()
                .map_err(|failure| WalletError::TransactionNotAvailable(failure.describe()))?;

            match transaction.status {
                ResourceStatus::Pending => {
                    debug!(
                        transaction_id = %transaction_id,
                        delay_ms = delay.as_millis() as u64,
                        "transaction still pending"
                    );
                    tokio::time::sleep(delay).await;
                    delay = next_delay(delay, self.poll.multiplier, self.poll.max_interval);
                }
                ResourceStatus::AwaitingApproval => {
                    return Err(WalletError::TransactionAwaitingApproval);
                }
                ResourceStatus::Failed => {
                    return Err(WalletError::TransactionSendingFailed(error_payload(
                        &transaction,
                    )));
                }
                ResourceStatus::Success => {
                    let on_chain = transaction.on_chain.unwrap_or_default();
                    let hash = on_chain
                        .tx_id
                        .ok_or(WalletError::TransactionHashNotFound)?;
                    info!(transaction_id = %transaction_id, hash = %hash, "transaction confirmed");
                    return Ok(TransactionResult {
                        hash,
                        transaction_id: transaction_id.to_string(),
                        explorer_link: on_chain.explorer_link,
                    });
                }
            }
        }
    }

    /// Poll a signature to its terminal state, returning the produced
    /// signature.
    pub async fn wait_for_signature(&self, signature_id: &str) -> Result<String, WalletError> {
        let locator = self.wallet_locator();
        let started = tokio::time::Instant::now();
        tokio::time::sleep(self.poll.initial_delay).await;
        let mut delay = self.poll.interval;

        loop {
            if started.elapsed() >= self.poll.timeout {
                warn!(signature_id = %signature_id, "confirmation poll budget exceeded");
                return Err(WalletError::TransactionConfirmationTimeout {
                    timeout_ms: self.poll.timeout.as_millis() as u64,
                });
            }

            let signature = self
                .api
                .get_signature(&locator, signature_id)
                .await
                .into_result()
                .map_err(|failure| WalletError::SignatureNotAvailable(failure.describe()))?;

            match signature.status {
                ResourceStatus::Pending => {
                    debug!(
                        signature_id = %signature_id,
                        delay_ms = delay.as_millis() as u64,
                        "signature still pending"
                    );
                    tokio::time::sleep(delay).await;
                    delay = next_delay(delay, self.poll.multiplier, self.poll.max_interval);
                }
                ResourceStatus::AwaitingApproval => {
                    return Err(WalletError::TransactionAwaitingApproval);
                }
                ResourceStatus::Failed => {
                    let payload = signature
                        .error
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "signature failed".to_string());
                    return Err(WalletError::SigningFailed(payload));
                }
                ResourceStatus::Success => {
                    let output = signature.output_signature.ok_or_else(|| {
                        WalletError::SignatureNotAvailable(
                            "signature succeeded without an output signature".to_string(),
                        )
                    })?;
                    info!(signature_id = %signature_id, "signature confirmed");
                    return Ok(output);
                }
            }
        }
    }

    // -- Delegated signers ----------------------------------------------

    /// Register a delegated signer. The backend response shape differs
    /// by chain family: EVM returns a per-chain registration map, Solana
    /// and Stellar a single transaction to approve.
    pub async fn add_delegated_signer(
        &self,
        signer: &str,
        options: RegisterOptions,
    ) -> Result<RegistrationOutcome, WalletError> {
        let request = RegisterSignerRequest {
            signer: signer.to_string(),
            chain: match self.chain {
                Chain::Evm(_) => Some(self.chain.id().to_string()),
                Chain::Solana | Chain::Stellar => None,
            },
        };
        let response = self
            .api
            .register_signer(&self.wallet_locator(), &request)
            .await
            .into_result()
            .map_err(|failure| WalletError::TransactionNotCreated(failure.describe()))?;

        match response {
            RegisterSignerResponse::Evm { chains } => {
                let entry = chains.get(self.chain.id()).ok_or_else(|| {
                    WalletError::TransactionNotCreated(format!(
                        "no registration entry for chain {}",
                        self.chain
                    ))
                })?;
                if options.experimental_prepare_only {
                    return Ok(RegistrationOutcome::Prepared {
                        id: entry.id.clone(),
                    });
                }
                match entry.status {
                    ResourceStatus::Success => Ok(RegistrationOutcome::Registered),
                    ResourceStatus::AwaitingApproval => {
                        self.approve_and_wait_signature(&entry.id).await?;
                        Ok(RegistrationOutcome::Registered)
                    }
                    ResourceStatus::Pending => {
                        self.wait_for_signature(&entry.id).await?;
                        Ok(RegistrationOutcome::Registered)
                    }
                    ResourceStatus::Failed => Err(WalletError::SigningFailed(format!(
                        "delegated signer registration failed for {signer}"
                    ))),
                }
            }
            RegisterSignerResponse::Transaction { transaction } => {
                if options.experimental_prepare_only {
                    return Ok(RegistrationOutcome::Prepared { id: transaction.id });
                }
                let result = self.approve_and_wait_transaction(&transaction.id).await?;
                Ok(RegistrationOutcome::Completed(result))
            }
        }
    }

    /// List the wallet's configured delegated signers. Requires a smart
    /// wallet record.
    pub async fn delegated_signers(&self) -> Result<Vec<DelegatedSignerDto>, WalletError> {
        let wallet = self
            .api
            .get_wallet(&self.wallet_locator())
            .await
            .into_result()
            .map_err(|failure| WalletError::WalletNotAvailable(failure.describe()))?;
        if wallet.wallet_type != "smart" {
            return Err(WalletError::WalletTypeNotSupported(format!(
                "wallet type {} not supported",
                wallet.wallet_type
            )));
        }
        Ok(wallet.config.delegated_signers.unwrap_or_default())
    }

    // -- Misc -----------------------------------------------------------

    /// List the wallet's transactions.
    pub async fn experimental_transactions(
        &self,
    ) -> Result<Vec<TransactionResponse>, WalletError> {
        self.api
            .get_transactions(&self.wallet_locator())
            .await
            .into_result()
            .map_err(|failure| WalletError::TransactionNotAvailable(failure.describe()))
    }

    /// Request test funds from the faucet. Staging and development only.
    pub async fn fund_wallet(&self, amount: &str, token: &str) -> Result<(), WalletError> {
        self.api
            .fund_wallet(&self.address, amount, token)
            .await
            .into_result()
            .map(|_| ())
            .map_err(|failure| WalletError::TransactionNotCreated(failure.describe()))
    }

    /// List the wallet's NFTs, paginated.
    pub async fn experimental_nfts(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Value>, WalletError> {
        self.api
            .get_nfts(self.chain.id(), &self.address, page, per_page)
            .await
            .into_result()
            .map_err(|failure| WalletError::WalletNotAvailable(failure.describe()))
    }

    // -- Internals shared with the chain adapters -----------------------

    pub(crate) fn api(&self) -> &Arc<dyn ApiClient> {
        &self.api
    }

    pub(crate) async fn create_transaction_with_params(
        &self,
        params: Value,
    ) -> Result<TransactionResponse, WalletError> {
        let request = CreateResourceRequest {
            params,
            resource_type: None,
        };
        let transaction = self
            .api
            .create_transaction(&self.wallet_locator(), &request)
            .await
            .into_result()
            .map_err(|failure| WalletError::TransactionNotCreated(failure.describe()))?;
        info!(transaction_id = %transaction.id, chain = %self.chain, "transaction created");
        Ok(transaction)
    }

    pub(crate) async fn create_signature_with_params(
        &self,
        resource_type: &str,
        params: Value,
    ) -> Result<String, WalletError> {
        let request = CreateResourceRequest {
            params,
            resource_type: Some(resource_type.to_string()),
        };
        let signature = self
            .api
            .create_signature(&self.wallet_locator(), &request)
            .await
            .into_result()
            .map_err(|failure| WalletError::SignatureNotCreated(failure.describe()))?;
        info!(signature_id = %signature.id, chain = %self.chain, "signature created");
        Ok(signature.id)
    }
}

fn zero_balance(symbol: &str) -> TokenBalanceItem {
    TokenBalanceItem {
        symbol: symbol.to_string(),
        name: String::new(),
        amount: "0".to_string(),
        raw_amount: "0".to_string(),
        decimals: 0,
        chains: HashMap::new(),
    }
}

fn error_payload(transaction: &TransactionResponse) -> String {
    transaction
        .error
        .as_ref()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "transaction failed".to_string())
}
