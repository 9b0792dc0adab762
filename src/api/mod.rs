// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet API Boundary
//!
//! The [`ApiClient`] trait is the black-box boundary to the wallet
//! backend. The engine drives it exclusively through locators and the
//! DTOs in [`types`]; request plumbing, auth-header injection and any
//! transport-level retries are the implementation's concern.
//!
//! Every method returns the [`ApiResponse`] envelope: implementations
//! fold transport failures into the `{error}` payload shape so the
//! engine only ever inspects the discriminant.

pub mod http;
#[cfg(test)]
pub(crate) mod mock;
pub mod types;

use async_trait::async_trait;
use serde_json::Value;

pub use http::HttpApiClient;
pub use types::*;

/// Black-box client for the remote wallet API.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Whether this client authenticates with a server-side key.
    fn is_server_side(&self) -> bool;

    // -- Wallets --------------------------------------------------------

    async fn get_wallet(&self, wallet_locator: &str) -> ApiResponse<WalletResponse>;

    async fn create_wallet(&self, request: &CreateWalletRequest) -> ApiResponse<WalletResponse>;

    // -- Transactions ---------------------------------------------------

    async fn create_transaction(
        &self,
        wallet_locator: &str,
        request: &CreateResourceRequest,
    ) -> ApiResponse<TransactionResponse>;

    async fn get_transaction(
        &self,
        wallet_locator: &str,
        transaction_id: &str,
    ) -> ApiResponse<TransactionResponse>;

    async fn approve_transaction(
        &self,
        wallet_locator: &str,
        transaction_id: &str,
        submission: &ApprovalSubmission,
    ) -> ApiResponse<TransactionResponse>;

    async fn get_transactions(&self, wallet_locator: &str) -> ApiResponse<Vec<TransactionResponse>>;

    // -- Signatures -----------------------------------------------------

    async fn create_signature(
        &self,
        wallet_locator: &str,
        request: &CreateResourceRequest,
    ) -> ApiResponse<SignatureResponse>;

    async fn get_signature(
        &self,
        wallet_locator: &str,
        signature_id: &str,
    ) -> ApiResponse<SignatureResponse>;

    async fn approve_signature(
        &self,
        wallet_locator: &str,
        signature_id: &str,
        submission: &ApprovalSubmission,
    ) -> ApiResponse<SignatureResponse>;

    // -- Tokens & Balances ----------------------------------------------

    async fn get_balance(
        &self,
        address: &str,
        chains: &[String],
        tokens: &[String],
    ) -> ApiResponse<Vec<TokenBalanceItem>>;

    async fn send_token(
        &self,
        wallet_locator: &str,
        token_locator: &str,
        request: &SendTokenRequest,
    ) -> ApiResponse<SendTokenResponse>;

    // -- Signers --------------------------------------------------------

    async fn register_signer(
        &self,
        wallet_locator: &str,
        request: &RegisterSignerRequest,
    ) -> ApiResponse<RegisterSignerResponse>;

    // -- NFTs -----------------------------------------------------------

    async fn get_nfts(
        &self,
        chain: &str,
        address: &str,
        page: u32,
        per_page: u32,
    ) -> ApiResponse<Vec<Value>>;

    // -- Faucet (staging only) ------------------------------------------

    async fn fund_wallet(
        &self,
        address: &str,
        amount: &str,
        token: &str,
    ) -> ApiResponse<FaucetResponse>;
}
