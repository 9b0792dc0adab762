// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Error Taxonomy
//!
//! Every failure mode of the SDK maps to one named variant of
//! [`WalletError`]; nothing is reported through a generic catch-all. The
//! engine never surfaces transport errors directly — the API layer folds
//! them into `{error}`-shaped payloads and the engine raises the typed
//! variant for the operation that observed them.

use crate::chains::Chain;

/// Closed error taxonomy for wallet operations.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// Signer/owner/chain mismatch against an existing wallet, delegated
    /// signer subset violation, or server-side misuse of a client-only call.
    #[error("wallet creation failed: {0}")]
    WalletCreation(String),

    /// The remote wallet record does not exist.
    #[error("wallet not available: {0}")]
    WalletNotAvailable(String),

    /// The remote wallet is not a smart wallet where one is required.
    #[error("wallet type not supported: {0}")]
    WalletTypeNotSupported(String),

    /// API key environment does not match the chain's network class.
    #[error("chain {chain} requires a {required} API key")]
    InvalidEnvironment { chain: Chain, required: &'static str },

    /// No local signer matches a required pending approval.
    #[error("invalid signer: {0}")]
    InvalidSigner(String),

    /// Transaction creation returned an error payload.
    #[error("transaction not created: {0}")]
    TransactionNotCreated(String),

    /// Signature creation returned an error payload.
    #[error("signature not created: {0}")]
    SignatureNotCreated(String),

    /// Transaction poll/get returned an error payload.
    #[error("transaction not available: {0}")]
    TransactionNotAvailable(String),

    /// Signature poll/get returned an error payload.
    #[error("signature not available: {0}")]
    SignatureNotAvailable(String),

    /// Transaction approval submission was rejected.
    #[error("transaction approval rejected: {0}")]
    TransactionFailed(String),

    /// Signature approval submission was rejected.
    #[error("signature approval rejected: {0}")]
    SignatureFailed(String),

    /// The transaction reached terminal `failed` status.
    #[error("transaction sending failed: {0}")]
    TransactionSendingFailed(String),

    /// The signature reached terminal `failed` status.
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// Approvals were still outstanding when completion was expected.
    #[error("transaction is awaiting approval; submit required approvals before waiting for completion")]
    TransactionAwaitingApproval,

    /// The confirmation poll budget was exceeded.
    #[error("transaction confirmation timed out after {timeout_ms} ms")]
    TransactionConfirmationTimeout { timeout_ms: u64 },

    /// Terminal success without an on-chain id. Should not occur.
    #[error("transaction hash not found on transaction response")]
    TransactionHashNotFound,
}
