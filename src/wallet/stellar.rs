// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Stellar Wallet Adapter
//!
//! Stellar transactions are either Soroban contract calls, assembled
//! into a `contract-call` envelope, or pre-serialized transaction
//! envelopes. Memos ride along as a tagged `{type, value}` pair.

use std::ops::Deref;

use serde_json::{json, Value};

use crate::chains::ChainFamily;
use crate::error::WalletError;

use super::{TransactionResult, Wallet};

/// Caller-side transaction input.
#[derive(Debug, Clone)]
pub enum StellarTransactionInput {
    /// Invoke a contract method.
    ContractCall {
        contract_id: String,
        method: String,
        /// Method arguments as chain-native JSON.
        args: Value,
        /// Optional text memo.
        memo: Option<String>,
    },
    /// A pre-serialized transaction envelope (XDR).
    Serialized {
        contract_id: Option<String>,
        transaction: String,
    },
}

impl StellarTransactionInput {
    fn into_envelope(self) -> Value {
        match self {
            StellarTransactionInput::ContractCall {
                contract_id,
                method,
                args,
                memo,
            } => {
                let memo = memo.map(|value| json!({ "type": "text", "value": value }));
                json!({
                    "type": "contract-call",
                    "contractId": contract_id,
                    "method": method,
                    "args": args,
                    "memo": memo,
                })
            }
            StellarTransactionInput::Serialized {
                contract_id,
                transaction,
            } => json!({
                "type": "serialized-transaction",
                "serializedTransaction": transaction,
                "contractId": contract_id,
            }),
        }
    }
}

/// A [`Wallet`] bound to Stellar.
#[derive(Debug, Clone)]
pub struct StellarWallet {
    inner: Wallet,
}

impl Deref for StellarWallet {
    type Target = Wallet;

    fn deref(&self) -> &Wallet {
        &self.inner
    }
}

impl StellarWallet {
    pub fn from(wallet: Wallet) -> Result<Self, WalletError> {
        if wallet.chain().family() != ChainFamily::Stellar {
            return Err(WalletError::WalletCreation(format!(
                "wallet chain {} is not stellar",
                wallet.chain()
            )));
        }
        Ok(Self { inner: wallet })
    }

    /// Create, approve and wait for a Stellar transaction.
    pub async fn send_transaction(
        &self,
        input: StellarTransactionInput,
    ) -> Result<TransactionResult, WalletError> {
        let transaction_id = self.prepare_transaction(input).await?;
        self.inner.approve_and_wait_transaction(&transaction_id).await
    }

    /// Create the remote transaction and return its id without driving
    /// approval or polling.
    pub async fn prepare_transaction(
        &self,
        input: StellarTransactionInput,
    ) -> Result<String, WalletError> {
        let params = json!({
            "transaction": input.into_envelope(),
            "signer": self.inner.signer_locator(),
        });
        let transaction = self.inner.create_transaction_with_params(params).await?;
        Ok(transaction.id)
    }
}
