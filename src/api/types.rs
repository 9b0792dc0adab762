// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Wire-format request and response structures for the wallet API. All
//! types use camelCase on the wire. Responses that can carry either a
//! success payload or an `{error}` / `{message}` shaped failure are
//! modeled as the untagged [`ApiResponse`] envelope; the engine inspects
//! the discriminant and raises a typed error, it never sees transport
//! failures directly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chains::ChainFamily;

// =============================================================================
// Response Envelope
// =============================================================================

/// Success-or-failure envelope returned by every API method.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Success(T),
    Failure(ApiFailure),
}

impl<T> ApiResponse<T> {
    /// Unwrap into a result, handing the failure payload to the caller.
    pub fn into_result(self) -> Result<T, ApiFailure> {
        match self {
            ApiResponse::Success(value) => Ok(value),
            ApiResponse::Failure(failure) => Err(failure),
        }
    }
}

/// An `{error}` or `{message}` shaped failure payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiFailure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiFailure {
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            error: None,
            message: Some(message.into()),
        }
    }

    /// Render the payload for inclusion in a typed error.
    pub fn describe(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "unrenderable API failure".to_string())
    }
}

// =============================================================================
// Wallet Records
// =============================================================================

/// A delegated signer entry on a remote wallet record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DelegatedSignerDto {
    pub locator: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub signer_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Signer configuration block of a remote wallet record.
///
/// The admin signer is kept as raw JSON: reconciliation deep-compares it
/// field by field against the caller's declared signer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WalletConfigDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_signer: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegated_signers: Option<Vec<DelegatedSignerDto>>,
}

/// A remote wallet record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletResponse {
    pub chain_type: ChainFamily,
    #[serde(rename = "type")]
    pub wallet_type: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default)]
    pub config: WalletConfigDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
}

/// Request payload for wallet creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWalletRequest {
    pub chain_type: ChainFamily,
    #[serde(rename = "type")]
    pub wallet_type: String,
    pub config: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

// =============================================================================
// Transactions & Signatures
// =============================================================================

/// Lifecycle status of a remote transaction or signature resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceStatus {
    Pending,
    AwaitingApproval,
    Success,
    Failed,
}

impl ResourceStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResourceStatus::Success | ResourceStatus::Failed)
    }
}

/// A backend-reported requirement that a specific signer must approve.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingApprovalDto {
    /// Locator of the signer that must produce the approval.
    pub signer: String,
    /// Message to sign (digest or encoded payload).
    pub message: String,
    /// Full on-chain transaction payload; when present (Solana), this is
    /// the signing target instead of `message`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
}

/// An approval submitted back to the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedApprovalDto {
    pub signer: String,
    /// Signature payload; shape depends on the signer kind (hex string
    /// for most kinds, `{r, s}` pair for passkeys).
    pub signature: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Pending / submitted approval split on a remote resource.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalsDto {
    #[serde(default)]
    pub pending: Vec<PendingApprovalDto>,
    #[serde(default)]
    pub submitted: Vec<SubmittedApprovalDto>,
}

/// On-chain result attached to a successful resource.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OnChainDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_link: Option<String>,
}

/// A remote transaction resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: String,
    pub status: ResourceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approvals: Option<ApprovalsDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_chain: Option<OnChainDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

/// A remote signature resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureResponse {
    pub id: String,
    pub status: ResourceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approvals: Option<ApprovalsDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

/// Request payload for transaction or signature creation; `params` is
/// chain-specific and assembled by the chain adapters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest {
    pub params: Value,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}

/// Batched approval submission. All approvals for one resource go in a
/// single call; partial submission could strand the resource in an
/// inconsistent multi-signer state.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalSubmission {
    pub approvals: Vec<SubmittedApprovalDto>,
}

// =============================================================================
// Token Sends
// =============================================================================

/// Parameters for the token-send endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTokenRequest {
    pub recipient: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signer: Option<String>,
}

/// Response of the token-send endpoint: a created transaction resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTokenResponse {
    pub id: String,
    #[serde(default)]
    pub status: Option<ResourceStatus>,
    #[serde(default)]
    pub approvals: Option<ApprovalsDto>,
}

// =============================================================================
// Balances
// =============================================================================

/// Per-chain entry of a balance response item.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChainBalanceDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mint_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<String>,
}

/// One token of a flat balance response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalanceItem {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub amount: String,
    pub raw_amount: String,
    pub decimals: u8,
    #[serde(default)]
    pub chains: HashMap<String, ChainBalanceDto>,
}

/// Response of the staging faucet endpoint. `status` is required so
/// that, inside the untagged [`ApiResponse`] envelope, `{error}` shaped
/// bodies fall through to the failure variant instead of matching here.
#[derive(Debug, Clone, Deserialize)]
pub struct FaucetResponse {
    pub status: String,
}

// =============================================================================
// Delegated Signer Registration
// =============================================================================

/// Per-chain registration entry of an EVM register-signer response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainRegistrationDto {
    pub id: String,
    pub status: ResourceStatus,
    #[serde(default)]
    pub approvals: Option<ApprovalsDto>,
}

/// Reference to a created transaction inside a register-signer response.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRefDto {
    pub id: String,
}

/// The register-signer response shape differs by chain family: EVM
/// returns a per-chain map, Solana and Stellar a single transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RegisterSignerResponse {
    Evm {
        chains: HashMap<String, ChainRegistrationDto>,
    },
    Transaction {
        transaction: TransactionRefDto,
    },
}

/// Request payload for delegated-signer registration.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterSignerRequest {
    pub signer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
}
