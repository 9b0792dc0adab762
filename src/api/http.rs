// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Reqwest-backed [`ApiClient`] implementation.
//!
//! Transport failures and non-JSON bodies are folded into the `{error}`
//! payload shape here; callers never see a reqwest error.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::{ApiEnvironment, SdkConfig};

use super::types::*;
use super::ApiClient;
use async_trait::async_trait;

const API_PREFIX: &str = "/api/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client for the wallet API.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    config: SdkConfig,
    http: Client,
}

impl HttpApiClient {
    pub fn new(config: SdkConfig) -> Result<Self, crate::error::WalletError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                crate::error::WalletError::WalletCreation(format!(
                    "failed to build HTTP client: {e}"
                ))
            })?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}{API_PREFIX}{path}",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResponse<T> {
        debug!(path = %path, "GET");
        let result = self
            .http
            .get(self.endpoint(path))
            .header("X-API-KEY", &self.config.api_key)
            .header("Content-Type", "application/json")
            .send()
            .await;
        Self::decode(path, result).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResponse<T> {
        debug!(path = %path, "POST");
        let result = self
            .http
            .post(self.endpoint(path))
            .header("X-API-KEY", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await;
        Self::decode(path, result).await
    }

    /// Decode a response body into the success-or-failure envelope. The
    /// HTTP status is intentionally ignored when the body parses: error
    /// bodies carry the `{error}` discriminant the engine branches on.
    async fn decode<T: DeserializeOwned>(
        path: &str,
        result: Result<reqwest::Response, reqwest::Error>,
    ) -> ApiResponse<T> {
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                return ApiResponse::Failure(ApiFailure::from_message(format!(
                    "request to {path} failed: {e}"
                )));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return ApiResponse::Failure(ApiFailure::from_message(format!(
                    "reading response from {path} failed: {e}"
                )));
            }
        };

        match serde_json::from_str::<ApiResponse<T>>(&body) {
            Ok(parsed) => parsed,
            Err(_) => ApiResponse::Failure(ApiFailure::from_message(format!(
                "{path} returned {status}: {body}"
            ))),
        }
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    fn is_server_side(&self) -> bool {
        self.config.is_server_side()
    }

    async fn get_wallet(&self, wallet_locator: &str) -> ApiResponse<WalletResponse> {
        self.get_json(&format!("/wallets/{wallet_locator}")).await
    }

    async fn create_wallet(&self, request: &CreateWalletRequest) -> ApiResponse<WalletResponse> {
        self.post_json("/wallets", request).await
    }

    async fn create_transaction(
        &self,
        wallet_locator: &str,
        request: &CreateResourceRequest,
    ) -> ApiResponse<TransactionResponse> {
        self.post_json(&format!("/wallets/{wallet_locator}/transactions"), request)
            .await
    }

    async fn get_transaction(
        &self,
        wallet_locator: &str,
        transaction_id: &str,
    ) -> ApiResponse<TransactionResponse> {
        self.get_json(&format!(
            "/wallets/{wallet_locator}/transactions/{transaction_id}"
        ))
        .await
    }

    async fn approve_transaction(
        &self,
        wallet_locator: &str,
        transaction_id: &str,
        submission: &ApprovalSubmission,
    ) -> ApiResponse<TransactionResponse> {
        self.post_json(
            &format!("/wallets/{wallet_locator}/transactions/{transaction_id}/approvals"),
            submission,
        )
        .await
    }

    async fn get_transactions(&self, wallet_locator: &str) -> ApiResponse<Vec<TransactionResponse>> {
        self.get_json(&format!("/wallets/{wallet_locator}/transactions"))
            .await
    }

    async fn create_signature(
        &self,
        wallet_locator: &str,
        request: &CreateResourceRequest,
    ) -> ApiResponse<SignatureResponse> {
        self.post_json(&format!("/wallets/{wallet_locator}/signatures"), request)
            .await
    }

    async fn get_signature(
        &self,
        wallet_locator: &str,
        signature_id: &str,
    ) -> ApiResponse<SignatureResponse> {
        self.get_json(&format!(
            "/wallets/{wallet_locator}/signatures/{signature_id}"
        ))
        .await
    }

    async fn approve_signature(
        &self,
        wallet_locator: &str,
        signature_id: &str,
        submission: &ApprovalSubmission,
    ) -> ApiResponse<SignatureResponse> {
        self.post_json(
            &format!("/wallets/{wallet_locator}/signatures/{signature_id}/approvals"),
            submission,
        )
        .await
    }

    async fn get_balance(
        &self,
        address: &str,
        chains: &[String],
        tokens: &[String],
    ) -> ApiResponse<Vec<TokenBalanceItem>> {
        let chains_param: String = chains.join(",");
        let tokens_param: String = tokens.join(",");
        let encoded: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("chains", &chains_param)
            .append_pair("tokens", &tokens_param)
            .finish();
        self.get_json(&format!("/wallets/{address}/balances?{encoded}"))
            .await
    }

    async fn send_token(
        &self,
        wallet_locator: &str,
        token_locator: &str,
        request: &SendTokenRequest,
    ) -> ApiResponse<SendTokenResponse> {
        self.post_json(
            &format!("/wallets/{wallet_locator}/tokens/{token_locator}/transfers"),
            request,
        )
        .await
    }

    async fn register_signer(
        &self,
        wallet_locator: &str,
        request: &RegisterSignerRequest,
    ) -> ApiResponse<RegisterSignerResponse> {
        self.post_json(&format!("/wallets/{wallet_locator}/signers"), request)
            .await
    }

    async fn get_nfts(
        &self,
        chain: &str,
        address: &str,
        page: u32,
        per_page: u32,
    ) -> ApiResponse<Vec<Value>> {
        let encoded: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("page", &page.to_string())
            .append_pair("perPage", &per_page.to_string())
            .finish();
        self.get_json(&format!("/wallets/{chain}:{address}/nfts?{encoded}"))
            .await
    }

    async fn fund_wallet(
        &self,
        address: &str,
        amount: &str,
        token: &str,
    ) -> ApiResponse<FaucetResponse> {
        if self.config.environment == ApiEnvironment::Production {
            return ApiResponse::Failure(ApiFailure::from_message(
                "fundWallet is only available in staging and development environments",
            ));
        }
        self.post_json(
            &format!("/wallets/{address}/balances/{token}/faucet"),
            &json!({ "amount": amount }),
        )
        .await
    }
}
