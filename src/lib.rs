// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Wallet SDK - Multi-Chain Smart Wallet Client
//!
//! This crate is the client library for the Relational wallet-as-a-service
//! API. It creates and operates smart wallets on EVM, Solana and Stellar
//! chains, drives the backend's asynchronous transaction and signature
//! approval protocol, and signs pending approvals with locally-held
//! signers (passkeys, external wallets, email or phone OTP flows).
//!
//! ## Modules
//!
//! - `api` - HTTP transport and wire DTOs (reqwest)
//! - `chains` - Chain registry and address validation
//! - `config` - API key parsing, environment, locators
//! - `error` - The closed [`WalletError`] taxonomy
//! - `factory` - Wallet resolution, creation and reconciliation
//! - `signers` - Signer configs, callbacks and locators
//! - `wallet` - The chain-agnostic engine plus per-chain adapters
//!
//! ## Getting started
//!
//! ```no_run
//! use relational_wallet_sdk::{
//!     Chain, EvmChain, SdkConfig, WalletArgs, WalletFactory,
//! };
//!
//! # async fn run() -> Result<(), relational_wallet_sdk::WalletError> {
//! let config = SdkConfig::from_api_key("ck_staging_...")?;
//! let factory = WalletFactory::from_config(config)?;
//! let wallet = factory
//!     .get_or_create_wallet(WalletArgs::new(Chain::Evm(EvmChain::BaseSepolia)))
//!     .await?;
//! println!("wallet at {}", wallet.address());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod chains;
pub mod config;
pub mod error;
pub mod factory;
pub mod signers;
pub mod wallet;

pub use chains::{Chain, ChainFamily, EvmChain};
pub use config::{ApiEnvironment, ClientSide, SdkConfig};
pub use error::WalletError;
pub use factory::{WalletArgs, WalletFactory};
pub use signers::{
    ExternalSigningCallback, PasskeyCallbacks, PasskeyCredential, PasskeyPublicKey,
    PasskeySignature, SignerConfig,
};
pub use wallet::{
    ApprovalTarget, ApproveOptions, Balances, EvmWallet, PollConfig, RegisterOptions,
    RegistrationOutcome, SendOptions, SendOutcome, SolanaWallet, StellarWallet, TransactionResult,
    Wallet,
};
pub use wallet::evm::EvmTransactionInput;
pub use wallet::solana::SolanaTransactionInput;
pub use wallet::stellar::StellarTransactionInput;
