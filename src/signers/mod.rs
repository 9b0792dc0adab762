// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Signers
//!
//! Polymorphic signing abstraction. A [`Signer`] produces approval
//! signatures for the wallet engine without the engine knowing which
//! credential kind is behind it. Concrete kinds:
//!
//! | Kind | Locator | Signs via |
//! |------|---------|-----------|
//! | `api-key` | `api-key` | never signs locally, backend approves |
//! | `passkey` | `passkey:<credential-id>` | WebAuthn callback, P-256 `{r, s}` |
//! | `external-wallet` | `external-wallet:<address>` | caller-supplied wallet callback |
//! | `email` | `email:<email>` | OTP-authenticated remote signer |
//! | `phone` | `phone:<number>` | OTP-authenticated remote signer |

pub mod validation;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::WalletError;

// =============================================================================
// Signature outputs
// =============================================================================

/// WebAuthn P-256 signature with its assertion metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PasskeySignature {
    pub r: String,
    pub s: String,
    pub metadata: Option<Value>,
}

/// Result of a local signing operation, in the shape the approvals
/// endpoint expects for the signer's kind.
#[derive(Debug, Clone, PartialEq)]
pub enum SignatureOutput {
    /// A single encoded signature string.
    Simple { signature: String },
    /// A P-256 `{r, s}` pair plus WebAuthn metadata.
    Passkey(PasskeySignature),
}

impl SignatureOutput {
    /// Split into the `signature` payload and optional `metadata` field
    /// of a submitted approval.
    pub fn into_wire(self) -> (Value, Option<Value>) {
        match self {
            SignatureOutput::Simple { signature } => (Value::String(signature), None),
            SignatureOutput::Passkey(PasskeySignature { r, s, metadata }) => {
                (json!({ "r": r, "s": s }), metadata)
            }
        }
    }
}

/// WebAuthn public key coordinates of a newly created credential.
#[derive(Debug, Clone, PartialEq)]
pub struct PasskeyPublicKey {
    pub x: String,
    pub y: String,
}

/// A WebAuthn credential created by the caller's platform authenticator.
#[derive(Debug, Clone, PartialEq)]
pub struct PasskeyCredential {
    pub id: String,
    pub public_key: PasskeyPublicKey,
}

// =============================================================================
// Callback seams
// =============================================================================

/// Caller-supplied signing hooks for an external wallet (browser
/// extension, hardware wallet, local keypair).
#[async_trait]
pub trait ExternalSigningCallback: Send + Sync {
    async fn sign_message(&self, message: &str) -> Result<String, WalletError>;

    /// Sign a serialized transaction payload. Defaults to the message
    /// path; Solana external wallets override this to re-serialize the
    /// fully signed transaction.
    async fn sign_transaction(&self, transaction: &str) -> Result<String, WalletError> {
        self.sign_message(transaction).await
    }
}

/// Caller-supplied WebAuthn hooks. `create_credential` runs once during
/// wallet creation; `sign` runs per approval challenge.
#[async_trait]
pub trait PasskeyCallbacks: Send + Sync {
    async fn create_credential(&self, name: &str) -> Result<PasskeyCredential, WalletError>;

    async fn sign(&self, challenge: &str) -> Result<PasskeySignature, WalletError>;
}

/// Remote signer reached through an OTP-authenticated session (email or
/// phone custody). The session must already be established; this trait
/// only covers the signing call itself.
#[async_trait]
pub trait RemoteSigningCallback: Send + Sync {
    async fn sign(&self, payload: &str) -> Result<String, WalletError>;
}

// =============================================================================
// Signer configuration
// =============================================================================

/// Kind discriminant shared between configs, locators and wire DTOs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerKind {
    ApiKey,
    Passkey,
    ExternalWallet,
    Email,
    Phone,
}

impl SignerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignerKind::ApiKey => "api-key",
            SignerKind::Passkey => "passkey",
            SignerKind::ExternalWallet => "external-wallet",
            SignerKind::Email => "email",
            SignerKind::Phone => "phone",
        }
    }
}

impl fmt::Display for SignerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-declared signer configuration, passed to the wallet factory.
#[derive(Clone, Default)]
pub enum SignerConfig {
    /// The project's API key acts as admin signer; approvals happen on
    /// the backend without a local signing step.
    #[default]
    ApiKey,
    Passkey {
        /// Display name used when creating a new credential.
        name: Option<String>,
        /// Credential id of an already-registered passkey.
        id: Option<String>,
        callbacks: Option<Arc<dyn PasskeyCallbacks>>,
    },
    ExternalWallet {
        address: String,
        callback: Arc<dyn ExternalSigningCallback>,
    },
    Email {
        email: String,
        callback: Option<Arc<dyn RemoteSigningCallback>>,
    },
    Phone {
        phone: String,
        callback: Option<Arc<dyn RemoteSigningCallback>>,
    },
}

impl SignerConfig {
    pub fn kind(&self) -> SignerKind {
        match self {
            SignerConfig::ApiKey => SignerKind::ApiKey,
            SignerConfig::Passkey { .. } => SignerKind::Passkey,
            SignerConfig::ExternalWallet { .. } => SignerKind::ExternalWallet,
            SignerConfig::Email { .. } => SignerKind::Email,
            SignerConfig::Phone { .. } => SignerKind::Phone,
        }
    }
}

impl fmt::Debug for SignerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignerConfig::ApiKey => f.write_str("SignerConfig::ApiKey"),
            SignerConfig::Passkey { name, id, .. } => f
                .debug_struct("SignerConfig::Passkey")
                .field("name", name)
                .field("id", id)
                .finish_non_exhaustive(),
            SignerConfig::ExternalWallet { address, .. } => f
                .debug_struct("SignerConfig::ExternalWallet")
                .field("address", address)
                .finish_non_exhaustive(),
            SignerConfig::Email { email, .. } => f
                .debug_struct("SignerConfig::Email")
                .field("email", email)
                .finish_non_exhaustive(),
            SignerConfig::Phone { phone, .. } => f
                .debug_struct("SignerConfig::Phone")
                .field("phone", phone)
                .finish_non_exhaustive(),
        }
    }
}

// =============================================================================
// Signer trait & concrete kinds
// =============================================================================

/// A credential that can produce approval signatures.
#[async_trait]
pub trait Signer: Send + Sync {
    fn kind(&self) -> SignerKind;

    /// Locator matched against pending approval entries,
    /// `<kind>:<identifier>`.
    fn locator(&self) -> String;

    async fn sign_message(&self, message: &str) -> Result<SignatureOutput, WalletError>;

    /// Sign a serialized transaction payload. Defaults to the message
    /// path for kinds where the two are identical.
    async fn sign_transaction(&self, transaction: &str) -> Result<SignatureOutput, WalletError> {
        self.sign_message(transaction).await
    }
}

struct ApiKeySigner;

#[async_trait]
impl Signer for ApiKeySigner {
    fn kind(&self) -> SignerKind {
        SignerKind::ApiKey
    }

    fn locator(&self) -> String {
        "api-key".to_string()
    }

    async fn sign_message(&self, _message: &str) -> Result<SignatureOutput, WalletError> {
        Err(WalletError::SigningFailed(
            "api-key signers approve on the backend and never sign locally".to_string(),
        ))
    }
}

struct PasskeySigner {
    id: String,
    callbacks: Arc<dyn PasskeyCallbacks>,
}

#[async_trait]
impl Signer for PasskeySigner {
    fn kind(&self) -> SignerKind {
        SignerKind::Passkey
    }

    fn locator(&self) -> String {
        format!("passkey:{}", self.id)
    }

    async fn sign_message(&self, message: &str) -> Result<SignatureOutput, WalletError> {
        let signature = self.callbacks.sign(message).await?;
        Ok(SignatureOutput::Passkey(signature))
    }
}

struct ExternalWalletSigner {
    address: String,
    callback: Arc<dyn ExternalSigningCallback>,
}

#[async_trait]
impl Signer for ExternalWalletSigner {
    fn kind(&self) -> SignerKind {
        SignerKind::ExternalWallet
    }

    fn locator(&self) -> String {
        format!("external-wallet:{}", self.address)
    }

    async fn sign_message(&self, message: &str) -> Result<SignatureOutput, WalletError> {
        let signature = self.callback.sign_message(message).await?;
        Ok(SignatureOutput::Simple { signature })
    }

    async fn sign_transaction(&self, transaction: &str) -> Result<SignatureOutput, WalletError> {
        let signature = self.callback.sign_transaction(transaction).await?;
        Ok(SignatureOutput::Simple { signature })
    }
}

struct RemoteSigner {
    kind: SignerKind,
    identifier: String,
    callback: Arc<dyn RemoteSigningCallback>,
}

#[async_trait]
impl Signer for RemoteSigner {
    fn kind(&self) -> SignerKind {
        self.kind
    }

    fn locator(&self) -> String {
        format!("{}:{}", self.kind, self.identifier)
    }

    async fn sign_message(&self, message: &str) -> Result<SignatureOutput, WalletError> {
        let signature = self.callback.sign(message).await?;
        Ok(SignatureOutput::Simple { signature })
    }
}

/// Build the concrete signer for a configuration.
///
/// Passkey configs must carry a credential id by the time the signer is
/// built (the factory materializes new credentials during wallet
/// creation). Email and phone configs must carry an authenticated
/// signing callback.
pub fn signer_for_config(config: &SignerConfig) -> Result<Arc<dyn Signer>, WalletError> {
    match config {
        SignerConfig::ApiKey => Ok(Arc::new(ApiKeySigner)),
        SignerConfig::Passkey { id, callbacks, .. } => {
            let id = id.clone().ok_or_else(|| {
                WalletError::InvalidSigner(
                    "passkey signer has no credential id; create the wallet first".to_string(),
                )
            })?;
            let callbacks = callbacks.clone().ok_or_else(|| {
                WalletError::InvalidSigner(
                    "passkey signer requires WebAuthn callbacks".to_string(),
                )
            })?;
            Ok(Arc::new(PasskeySigner { id, callbacks }))
        }
        SignerConfig::ExternalWallet { address, callback } => Ok(Arc::new(ExternalWalletSigner {
            address: address.clone(),
            callback: callback.clone(),
        })),
        SignerConfig::Email { email, callback } => {
            let callback = callback.clone().ok_or_else(|| {
                WalletError::InvalidSigner(
                    "email signer requires an authenticated signing callback".to_string(),
                )
            })?;
            Ok(Arc::new(RemoteSigner {
                kind: SignerKind::Email,
                identifier: email.trim().to_lowercase(),
                callback,
            }))
        }
        SignerConfig::Phone { phone, callback } => {
            let callback = callback.clone().ok_or_else(|| {
                WalletError::InvalidSigner(
                    "phone signer requires an authenticated signing callback".to_string(),
                )
            })?;
            Ok(Arc::new(RemoteSigner {
                kind: SignerKind::Phone,
                identifier: phone.trim().to_string(),
                callback,
            }))
        }
    }
}
