// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Scripted [`ApiClient`] for tests.
//!
//! Responses are queued per method and popped in order; the last queued
//! response is sticky so poll loops can observe a stable terminal state.
//! Every call is recorded for assertion.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::types::*;
use super::ApiClient;

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub method: &'static str,
    pub args: Value,
}

struct Script<T> {
    queue: VecDeque<T>,
    sticky: Option<T>,
}

// Not derived: that would demand `T: Default`, which the response
// envelopes never implement.
impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            sticky: None,
        }
    }
}

impl<T: Clone> Script<T> {
    fn push(&mut self, response: T) {
        self.queue.push_back(response);
    }

    fn next(&mut self) -> Option<T> {
        match self.queue.pop_front() {
            Some(response) => {
                self.sticky = Some(response.clone());
                Some(response)
            }
            None => self.sticky.clone(),
        }
    }
}

#[derive(Default)]
pub(crate) struct MockApiClient {
    pub server_side: bool,
    calls: Mutex<Vec<RecordedCall>>,
    wallets: Mutex<Script<ApiResponse<WalletResponse>>>,
    created_wallets: Mutex<Script<ApiResponse<WalletResponse>>>,
    transactions: Mutex<Script<ApiResponse<TransactionResponse>>>,
    created_transactions: Mutex<Script<ApiResponse<TransactionResponse>>>,
    approved_transactions: Mutex<Script<ApiResponse<TransactionResponse>>>,
    signatures: Mutex<Script<ApiResponse<SignatureResponse>>>,
    created_signatures: Mutex<Script<ApiResponse<SignatureResponse>>>,
    approved_signatures: Mutex<Script<ApiResponse<SignatureResponse>>>,
    balances: Mutex<Script<ApiResponse<Vec<TokenBalanceItem>>>>,
    sends: Mutex<Script<ApiResponse<SendTokenResponse>>>,
    registrations: Mutex<Script<ApiResponse<RegisterSignerResponse>>>,
    faucets: Mutex<Script<ApiResponse<FaucetResponse>>>,
    nfts: Mutex<Script<ApiResponse<Vec<Value>>>>,
}

impl MockApiClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server_side() -> Self {
        Self {
            server_side: true,
            ..Self::default()
        }
    }

    fn record(&self, method: &'static str, args: Value) {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall { method, args });
    }

    fn no_script<T>(&self, method: &'static str) -> ApiResponse<T> {
        ApiResponse::Failure(ApiFailure::from_message(format!(
            "no scripted response for {method}"
        )))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.method == method)
            .count()
    }

    // -- Scripting ------------------------------------------------------

    pub fn queue_wallet(&self, response: ApiResponse<WalletResponse>) {
        self.wallets.lock().unwrap().push(response);
    }

    pub fn queue_created_wallet(&self, response: ApiResponse<WalletResponse>) {
        self.created_wallets.lock().unwrap().push(response);
    }

    pub fn queue_transaction(&self, response: ApiResponse<TransactionResponse>) {
        self.transactions.lock().unwrap().push(response);
    }

    pub fn queue_created_transaction(&self, response: ApiResponse<TransactionResponse>) {
        self.created_transactions.lock().unwrap().push(response);
    }

    pub fn queue_approved_transaction(&self, response: ApiResponse<TransactionResponse>) {
        self.approved_transactions.lock().unwrap().push(response);
    }

    pub fn queue_signature(&self, response: ApiResponse<SignatureResponse>) {
        self.signatures.lock().unwrap().push(response);
    }

    pub fn queue_created_signature(&self, response: ApiResponse<SignatureResponse>) {
        self.created_signatures.lock().unwrap().push(response);
    }

    pub fn queue_approved_signature(&self, response: ApiResponse<SignatureResponse>) {
        self.approved_signatures.lock().unwrap().push(response);
    }

    pub fn queue_balance(&self, response: ApiResponse<Vec<TokenBalanceItem>>) {
        self.balances.lock().unwrap().push(response);
    }

    pub fn queue_send(&self, response: ApiResponse<SendTokenResponse>) {
        self.sends.lock().unwrap().push(response);
    }

    pub fn queue_registration(&self, response: ApiResponse<RegisterSignerResponse>) {
        self.registrations.lock().unwrap().push(response);
    }

    pub fn queue_faucet(&self, response: ApiResponse<FaucetResponse>) {
        self.faucets.lock().unwrap().push(response);
    }

    pub fn queue_nfts(&self, response: ApiResponse<Vec<Value>>) {
        self.nfts.lock().unwrap().push(response);
    }
}

#[async_trait]
impl ApiClient for MockApiClient {
    fn is_server_side(&self) -> bool {
        self.server_side
    }

    async fn get_wallet(&self, wallet_locator: &str) -> ApiResponse<WalletResponse> {
        self.record("getWallet", json!({ "locator": wallet_locator }));
        self.wallets
            .lock()
            .unwrap()
            .next()
            .unwrap_or_else(|| self.no_script("getWallet"))
    }

    async fn create_wallet(&self, request: &CreateWalletRequest) -> ApiResponse<WalletResponse> {
        self.record(
            "createWallet",
            serde_json::to_value(request).unwrap_or(Value::Null),
        );
        self.created_wallets
            .lock()
            .unwrap()
            .next()
            .unwrap_or_else(|| self.no_script("createWallet"))
    }

    async fn create_transaction(
        &self,
        wallet_locator: &str,
        request: &CreateResourceRequest,
    ) -> ApiResponse<TransactionResponse> {
        self.record(
            "createTransaction",
            json!({ "locator": wallet_locator, "params": request.params }),
        );
        self.created_transactions
            .lock()
            .unwrap()
            .next()
            .unwrap_or_else(|| self.no_script("createTransaction"))
    }

    async fn get_transaction(
        &self,
        wallet_locator: &str,
        transaction_id: &str,
    ) -> ApiResponse<TransactionResponse> {
        self.record(
            "getTransaction",
            json!({ "locator": wallet_locator, "id": transaction_id }),
        );
        self.transactions
            .lock()
            .unwrap()
            .next()
            .unwrap_or_else(|| self.no_script("getTransaction"))
    }

    async fn approve_transaction(
        &self,
        wallet_locator: &str,
        transaction_id: &str,
        submission: &ApprovalSubmission,
    ) -> ApiResponse<TransactionResponse> {
        self.record(
            "approveTransaction",
            json!({
                "locator": wallet_locator,
                "id": transaction_id,
                "approvals": serde_json::to_value(&submission.approvals).unwrap_or(Value::Null),
            }),
        );
        self.approved_transactions
            .lock()
            .unwrap()
            .next()
            .unwrap_or_else(|| self.no_script("approveTransaction"))
    }

    async fn get_transactions(&self, wallet_locator: &str) -> ApiResponse<Vec<TransactionResponse>> {
        self.record("getTransactions", json!({ "locator": wallet_locator }));
        ApiResponse::Success(Vec::new())
    }

    async fn create_signature(
        &self,
        wallet_locator: &str,
        request: &CreateResourceRequest,
    ) -> ApiResponse<SignatureResponse> {
        self.record(
            "createSignature",
            json!({ "locator": wallet_locator, "params": request.params }),
        );
        self.created_signatures
            .lock()
            .unwrap()
            .next()
            .unwrap_or_else(|| self.no_script("createSignature"))
    }

    async fn get_signature(
        &self,
        wallet_locator: &str,
        signature_id: &str,
    ) -> ApiResponse<SignatureResponse> {
        self.record(
            "getSignature",
            json!({ "locator": wallet_locator, "id": signature_id }),
        );
        self.signatures
            .lock()
            .unwrap()
            .next()
            .unwrap_or_else(|| self.no_script("getSignature"))
    }

    async fn approve_signature(
        &self,
        wallet_locator: &str,
        signature_id: &str,
        submission: &ApprovalSubmission,
    ) -> ApiResponse<SignatureResponse> {
        self.record(
            "approveSignature",
            json!({
                "locator": wallet_locator,
                "id": signature_id,
                "approvals": serde_json::to_value(&submission.approvals).unwrap_or(Value::Null),
            }),
        );
        self.approved_signatures
            .lock()
            .unwrap()
            .next()
            .unwrap_or_else(|| self.no_script("approveSignature"))
    }

    async fn get_balance(
        &self,
        address: &str,
        chains: &[String],
        tokens: &[String],
    ) -> ApiResponse<Vec<TokenBalanceItem>> {
        self.record(
            "getBalance",
            json!({ "address": address, "chains": chains, "tokens": tokens }),
        );
        self.balances
            .lock()
            .unwrap()
            .next()
            .unwrap_or_else(|| self.no_script("getBalance"))
    }

    async fn send_token(
        &self,
        wallet_locator: &str,
        token_locator: &str,
        request: &SendTokenRequest,
    ) -> ApiResponse<SendTokenResponse> {
        self.record(
            "send",
            json!({
                "locator": wallet_locator,
                "token": token_locator,
                "recipient": request.recipient,
                "amount": request.amount,
            }),
        );
        self.sends
            .lock()
            .unwrap()
            .next()
            .unwrap_or_else(|| self.no_script("send"))
    }

    async fn register_signer(
        &self,
        wallet_locator: &str,
        request: &RegisterSignerRequest,
    ) -> ApiResponse<RegisterSignerResponse> {
        self.record(
            "registerSigner",
            json!({
                "locator": wallet_locator,
                "signer": request.signer,
                "chain": request.chain,
            }),
        );
        self.registrations
            .lock()
            .unwrap()
            .next()
            .unwrap_or_else(|| self.no_script("registerSigner"))
    }

    async fn fund_wallet(
        &self,
        address: &str,
        amount: &str,
        token: &str,
    ) -> ApiResponse<FaucetResponse> {
        self.record(
            "fundWallet",
            json!({ "address": address, "amount": amount, "token": token }),
        );
        self.faucets.lock().unwrap().next().unwrap_or_else(|| {
            ApiResponse::Success(FaucetResponse {
                status: "ok".to_string(),
            })
        })
    }

    async fn get_nfts(
        &self,
        chain: &str,
        address: &str,
        page: u32,
        per_page: u32,
    ) -> ApiResponse<Vec<Value>> {
        self.record(
            "getNfts",
            json!({ "chain": chain, "address": address, "page": page, "perPage": per_page }),
        );
        self.nfts
            .lock()
            .unwrap()
            .next()
            .unwrap_or_else(|| self.no_script("getNfts"))
    }
}
