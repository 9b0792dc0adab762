// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # EVM Wallet Adapter
//!
//! Translates caller transactions into the account-abstraction call
//! envelope the backend expects:
//!
//! ```json
//! { "signer": "...", "chain": "base-sepolia",
//!   "calls": [{ "to": "0x...", "value": "0", "data": "0x..." }] }
//! ```
//!
//! Callers pass either raw calldata or a human-readable function
//! signature plus arguments; arguments are ABI-encoded locally.

use std::ops::Deref;

use alloy::dyn_abi::{DynSolType, DynSolValue, JsonAbiExt};
use alloy::json_abi::Function;
use alloy::primitives::U256;
use serde_json::{json, Value};

use crate::chains::ChainFamily;
use crate::error::WalletError;

use super::{TransactionResult, Wallet};

/// Caller-side transaction input. `data` and `abi`/`function_name` are
/// mutually exclusive ways of producing calldata.
#[derive(Debug, Clone, Default)]
pub struct EvmTransactionInput {
    pub to: String,
    /// Native value in wei; serialized as a decimal string.
    pub value: Option<U256>,
    /// Pre-encoded calldata.
    pub data: Option<String>,
    /// Human-readable function signature, e.g.
    /// `transfer(address,uint256)`.
    pub abi: Option<String>,
    pub function_name: Option<String>,
    /// Arguments in string form, coerced against the signature's
    /// parameter types.
    pub args: Vec<String>,
}

/// A [`Wallet`] bound to an EVM chain. Dereferences to the generic
/// engine for everything chain-agnostic.
#[derive(Debug, Clone)]
pub struct EvmWallet {
    inner: Wallet,
}

impl Deref for EvmWallet {
    type Target = Wallet;

    fn deref(&self) -> &Wallet {
        &self.inner
    }
}

impl EvmWallet {
    pub fn from(wallet: Wallet) -> Result<Self, WalletError> {
        if wallet.chain().family() != ChainFamily::Evm {
            return Err(WalletError::WalletCreation(format!(
                "wallet chain {} is not an EVM chain",
                wallet.chain()
            )));
        }
        Ok(Self { inner: wallet })
    }

    /// Create, approve and wait for an EVM transaction.
    pub async fn send_transaction(
        &self,
        input: EvmTransactionInput,
    ) -> Result<TransactionResult, WalletError> {
        let transaction_id = self.prepare_transaction(input).await?;
        self.inner.approve_and_wait_transaction(&transaction_id).await
    }

    /// Create the remote transaction and return its id without driving
    /// approval or polling.
    pub async fn prepare_transaction(
        &self,
        input: EvmTransactionInput,
    ) -> Result<String, WalletError> {
        let call = build_call(input)?;
        let params = json!({
            "signer": self.inner.signer_locator(),
            "chain": self.inner.chain().id(),
            "calls": [call],
        });
        let transaction = self.inner.create_transaction_with_params(params).await?;
        Ok(transaction.id)
    }

    /// Sign an arbitrary message with the wallet's admin signer through
    /// the backend signature flow.
    pub async fn sign_message(&self, message: &str) -> Result<String, WalletError> {
        let params = json!({
            "message": message,
            "signer": self.inner.signer_locator(),
            "chain": self.inner.chain().id(),
        });
        let signature_id = self
            .inner
            .create_signature_with_params("evm-message", params)
            .await?;
        self.inner.approve_and_wait_signature(&signature_id).await
    }
}

fn build_call(input: EvmTransactionInput) -> Result<Value, WalletError> {
    let value = input
        .value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "0".to_string());

    let data = match (&input.abi, &input.function_name) {
        (None, None) => input.data.unwrap_or_else(|| "0x".to_string()),
        (Some(abi), Some(function_name)) => {
            encode_function_data(abi, function_name, &input.args)?
        }
        (Some(_), None) => {
            return Err(WalletError::TransactionNotCreated(
                "an abi was provided without a function name".to_string(),
            ));
        }
        (None, Some(_)) => {
            return Err(WalletError::TransactionNotCreated(
                "a function name was provided without an abi".to_string(),
            ));
        }
    };

    Ok(json!({
        "to": input.to,
        "value": value,
        "data": data,
    }))
}

fn encode_function_data(
    abi: &str,
    function_name: &str,
    args: &[String],
) -> Result<String, WalletError> {
    let function = Function::parse(abi).map_err(|e| {
        WalletError::TransactionNotCreated(format!("invalid function signature \"{abi}\": {e}"))
    })?;
    if function.name != function_name {
        return Err(WalletError::TransactionNotCreated(format!(
            "function name \"{function_name}\" does not match signature \"{abi}\""
        )));
    }
    if function.inputs.len() != args.len() {
        return Err(WalletError::TransactionNotCreated(format!(
            "function \"{function_name}\" takes {} argument(s), got {}",
            function.inputs.len(),
            args.len()
        )));
    }

    let mut values = Vec::with_capacity(args.len());
    for (param, arg) in function.inputs.iter().zip(args) {
        let ty: DynSolType = param.ty.parse().map_err(|e| {
            WalletError::TransactionNotCreated(format!(
                "unsupported parameter type \"{}\": {e}",
                param.ty
            ))
        })?;
        let value: DynSolValue = ty.coerce_str(arg).map_err(|e| {
            WalletError::TransactionNotCreated(format!(
                "argument \"{arg}\" does not coerce to {}: {e}",
                param.ty
            ))
        })?;
        values.push(value);
    }

    let encoded = function.abi_encode_input(&values).map_err(|e| {
        WalletError::TransactionNotCreated(format!("abi encoding failed: {e}"))
    })?;
    Ok(format!("0x{}", hex::encode(encoded)))
}
