// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Solana Wallet Adapter
//!
//! Solana transactions are assembled by the caller and submitted as a
//! base58-encoded payload. Uniquely among the three chain families, the
//! signing target of a pending approval is the *full on-chain
//! transaction bytes* when the backend includes them, not a digest; the
//! engine handles that branch in its approval matching.

use std::ops::Deref;

use serde_json::json;

use crate::chains::ChainFamily;
use crate::error::WalletError;

use super::{TransactionResult, Wallet};

/// Caller-side transaction input: raw serialized bytes, or an
/// already-base58-encoded payload.
#[derive(Debug, Clone)]
pub enum SolanaTransactionInput {
    Serialized(Vec<u8>),
    Base58(String),
}

impl SolanaTransactionInput {
    fn into_base58(self) -> String {
        match self {
            SolanaTransactionInput::Serialized(bytes) => bs58::encode(bytes).into_string(),
            SolanaTransactionInput::Base58(encoded) => encoded,
        }
    }
}

/// A [`Wallet`] bound to Solana.
#[derive(Debug, Clone)]
pub struct SolanaWallet {
    inner: Wallet,
}

impl Deref for SolanaWallet {
    type Target = Wallet;

    fn deref(&self) -> &Wallet {
        &self.inner
    }
}

impl SolanaWallet {
    pub fn from(wallet: Wallet) -> Result<Self, WalletError> {
        if wallet.chain().family() != ChainFamily::Solana {
            return Err(WalletError::WalletCreation(format!(
                "wallet chain {} is not solana",
                wallet.chain()
            )));
        }
        Ok(Self { inner: wallet })
    }

    /// Create, approve and wait for a Solana transaction.
    pub async fn send_transaction(
        &self,
        input: SolanaTransactionInput,
    ) -> Result<TransactionResult, WalletError> {
        let transaction_id = self.prepare_transaction(input).await?;
        self.inner.approve_and_wait_transaction(&transaction_id).await
    }

    /// Create the remote transaction and return its id without driving
    /// approval or polling.
    pub async fn prepare_transaction(
        &self,
        input: SolanaTransactionInput,
    ) -> Result<String, WalletError> {
        let params = json!({
            "transaction": input.into_base58(),
            "signer": self.inner.signer_locator(),
        });
        let transaction = self.inner.create_transaction_with_params(params).await?;
        Ok(transaction.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApiClient;
    use crate::api::{
        ApiResponse, ApprovalsDto, OnChainDto, PendingApprovalDto, ResourceStatus,
        TransactionResponse,
    };
    use crate::chains::Chain;
    use crate::signers::{
        signer_for_config, ExternalSigningCallback, SignerConfig,
    };
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    const ADDRESS: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

    /// Records every payload it was asked to sign.
    struct RecordingCallback {
        message_payloads: Mutex<Vec<String>>,
        transaction_payloads: Mutex<Vec<String>>,
    }

    impl RecordingCallback {
        fn new() -> Self {
            Self {
                message_payloads: Mutex::new(Vec::new()),
                transaction_payloads: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ExternalSigningCallback for RecordingCallback {
        async fn sign_message(&self, message: &str) -> Result<String, WalletError> {
            self.message_payloads
                .lock()
                .unwrap()
                .push(message.to_string());
            Ok("sig".to_string())
        }

        async fn sign_transaction(&self, transaction: &str) -> Result<String, WalletError> {
            self.transaction_payloads
                .lock()
                .unwrap()
                .push(transaction.to_string());
            Ok("sig".to_string())
        }
    }

    fn solana_wallet(api: Arc<MockApiClient>, callback: Arc<RecordingCallback>) -> SolanaWallet {
        let signer = signer_for_config(&SignerConfig::ExternalWallet {
            address: "DelegateKey11111111111111111111".to_string(),
            callback,
        })
        .unwrap();
        let wallet = Wallet::new(
            Chain::Solana,
            ADDRESS.to_string(),
            None,
            None,
            signer,
            api,
        )
        .unwrap();
        SolanaWallet::from(wallet).unwrap()
    }

    #[test]
    fn serialized_input_is_base58_encoded() {
        let input = SolanaTransactionInput::Serialized(vec![0x01, 0x02, 0x03]);
        assert_eq!(input.into_base58(), bs58::encode([1u8, 2, 3]).into_string());
        let passthrough = SolanaTransactionInput::Base58("3yZe7d".to_string());
        assert_eq!(passthrough.into_base58(), "3yZe7d");
    }

    #[tokio::test(start_paused = true)]
    async fn pending_approval_with_transaction_signs_the_full_payload() {
        let api = Arc::new(MockApiClient::new());
        api.queue_created_transaction(ApiResponse::Success(TransactionResponse {
            id: "tx1".to_string(),
            status: ResourceStatus::AwaitingApproval,
            params: None,
            approvals: None,
            on_chain: None,
            error: None,
        }));
        api.queue_transaction(ApiResponse::Success(TransactionResponse {
            id: "tx1".to_string(),
            status: ResourceStatus::AwaitingApproval,
            params: None,
            approvals: Some(ApprovalsDto {
                pending: vec![PendingApprovalDto {
                    signer: "external-wallet:DelegateKey11111111111111111111".to_string(),
                    message: "digest".to_string(),
                    transaction: Some("full-onchain-payload".to_string()),
                }],
                submitted: vec![],
            }),
            on_chain: None,
            error: None,
        }));
        api.queue_approved_transaction(ApiResponse::Success(TransactionResponse {
            id: "tx1".to_string(),
            status: ResourceStatus::Pending,
            params: None,
            approvals: None,
            on_chain: None,
            error: None,
        }));
        api.queue_transaction(ApiResponse::Success(TransactionResponse {
            id: "tx1".to_string(),
            status: ResourceStatus::Success,
            params: None,
            approvals: None,
            on_chain: Some(OnChainDto {
                tx_id: Some("5sig".to_string()),
                explorer_link: None,
            }),
            error: None,
        }));

        let callback = Arc::new(RecordingCallback::new());
        let wallet = solana_wallet(api.clone(), callback.clone());
        let result = wallet
            .send_transaction(SolanaTransactionInput::Serialized(vec![9, 9, 9]))
            .await
            .unwrap();

        assert_eq!(result.hash, "5sig");
        // The full payload was the signing target, not the digest.
        assert_eq!(
            callback.transaction_payloads.lock().unwrap().as_slice(),
            ["full-onchain-payload"]
        );
        assert!(callback.message_payloads.lock().unwrap().is_empty());
    }
}
