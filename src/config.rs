// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # SDK Configuration
//!
//! Configuration injected at SDK construction time. The environment
//! (production / staging / development) is an explicit field parsed once
//! from the API key; call sites branch on the enum, never on key-prefix
//! strings.
//!
//! ## API Key Format
//!
//! | Prefix | Meaning |
//! |--------|---------|
//! | `sk_`  | Server-side key |
//! | `ck_`  | Client-side key |
//! | `<sk\|ck>_production_` | Production environment |
//! | `<sk\|ck>_staging_` | Staging environment |
//! | `<sk\|ck>_development_` | Development environment |

use crate::chains::{Chain, ChainFamily};
use crate::error::WalletError;

const PRODUCTION_BASE_URL: &str = "https://api.relational.network";
const STAGING_BASE_URL: &str = "https://staging.api.relational.network";

/// Deployment environment an API key is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiEnvironment {
    Production,
    Staging,
    Development,
}

impl ApiEnvironment {
    /// Parse the environment segment of an API key.
    pub fn from_api_key(api_key: &str) -> Result<Self, WalletError> {
        let rest = api_key
            .strip_prefix("sk_")
            .or_else(|| api_key.strip_prefix("ck_"))
            .ok_or_else(|| {
                WalletError::WalletCreation(format!(
                    "API key must start with sk_ or ck_, got \"{}\"",
                    truncate_key(api_key)
                ))
            })?;

        if rest.starts_with("production_") {
            Ok(ApiEnvironment::Production)
        } else if rest.starts_with("staging_") {
            Ok(ApiEnvironment::Staging)
        } else if rest.starts_with("development_") {
            Ok(ApiEnvironment::Development)
        } else {
            Err(WalletError::WalletCreation(format!(
                "API key environment segment not recognized in \"{}\"",
                truncate_key(api_key)
            )))
        }
    }

    /// Verify that `chain` may be used under this environment.
    ///
    /// Production keys accept only mainnet EVM chain ids; staging and
    /// development keys only testnet ids. Solana and Stellar expose a
    /// single chain id with no testnet split, so they pass under every
    /// environment.
    pub fn ensure_chain_allowed(&self, chain: Chain) -> Result<(), WalletError> {
        let Chain::Evm(evm_chain) = chain else {
            return Ok(());
        };
        match self {
            ApiEnvironment::Production if !evm_chain.is_mainnet() => {
                Err(WalletError::InvalidEnvironment {
                    chain,
                    required: "staging or development",
                })
            }
            ApiEnvironment::Staging | ApiEnvironment::Development if !evm_chain.is_testnet() => {
                Err(WalletError::InvalidEnvironment {
                    chain,
                    required: "production",
                })
            }
            _ => Ok(()),
        }
    }
}

/// Which side of the trust boundary this SDK instance runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientSide {
    /// Browser or mobile app holding a client key; wallets are addressed
    /// through `me:` locators resolved by the backend session.
    Client,
    /// Backend service holding a server key; wallets are addressed by
    /// literal address.
    Server,
}

/// SDK-level configuration shared by every wallet derived from one root.
#[derive(Debug, Clone)]
pub struct SdkConfig {
    pub api_key: String,
    pub environment: ApiEnvironment,
    pub side: ClientSide,
    pub base_url: String,
}

impl SdkConfig {
    /// Build a configuration from an API key, deriving environment, side
    /// and base URL from its prefix.
    pub fn from_api_key(api_key: impl Into<String>) -> Result<Self, WalletError> {
        let api_key = api_key.into();
        let environment = ApiEnvironment::from_api_key(&api_key)?;
        let side = if api_key.starts_with("sk_") {
            ClientSide::Server
        } else {
            ClientSide::Client
        };
        let base_url = match environment {
            ApiEnvironment::Production => PRODUCTION_BASE_URL,
            ApiEnvironment::Staging | ApiEnvironment::Development => STAGING_BASE_URL,
        }
        .to_string();
        Ok(Self {
            api_key,
            environment,
            side,
            base_url,
        })
    }

    /// Override the API base URL (self-hosted gateways, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn is_server_side(&self) -> bool {
        self.side == ClientSide::Server
    }

    /// Client-side wallet locator for a chain family:
    /// `me:<family>:smart[:alias:<alias>]`.
    pub fn self_locator(family: ChainFamily, alias: Option<&str>) -> String {
        match alias {
            Some(alias) => format!("me:{}:smart:alias:{alias}", family.locator_segment()),
            None => format!("me:{}:smart", family.locator_segment()),
        }
    }
}

fn truncate_key(api_key: &str) -> String {
    let shown: String = api_key.chars().take(12).collect();
    if api_key.len() > 12 {
        format!("{shown}…")
    } else {
        shown
    }
}
