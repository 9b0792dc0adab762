// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Chain Registry
//!
//! Static mapping of supported chain identifiers to their family
//! (EVM / Solana / Stellar) and, for EVM chains, to network parameters.
//! Chain-family branching elsewhere in the SDK is driven by the
//! [`ChainFamily`] sum type so that every branch is checked exhaustively
//! at compile time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// EVM network parameters for a single chain id.
#[derive(Debug, Clone)]
pub struct EvmNetworkConfig {
    /// Chain identifier as used on the wire
    pub id: &'static str,
    /// Numeric chain ID
    pub chain_id: u64,
    /// Block explorer URL
    pub explorer_url: &'static str,
    /// Whether this is a testnet
    pub testnet: bool,
}

/// Supported EVM account-abstraction chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvmChain {
    Base,
    BaseSepolia,
    Polygon,
    PolygonAmoy,
    Optimism,
    OptimismSepolia,
    Arbitrum,
    ArbitrumSepolia,
    EthereumSepolia,
}

impl EvmChain {
    /// All supported EVM chains, in declaration order.
    pub const ALL: [EvmChain; 9] = [
        EvmChain::Base,
        EvmChain::BaseSepolia,
        EvmChain::Polygon,
        EvmChain::PolygonAmoy,
        EvmChain::Optimism,
        EvmChain::OptimismSepolia,
        EvmChain::Arbitrum,
        EvmChain::ArbitrumSepolia,
        EvmChain::EthereumSepolia,
    ];

    /// Network parameters for this chain.
    pub fn network(&self) -> EvmNetworkConfig {
        match self {
            EvmChain::Base => EvmNetworkConfig {
                id: "base",
                chain_id: 8453,
                explorer_url: "https://basescan.org",
                testnet: false,
            },
            EvmChain::BaseSepolia => EvmNetworkConfig {
                id: "base-sepolia",
                chain_id: 84532,
                explorer_url: "https://sepolia.basescan.org",
                testnet: true,
            },
            EvmChain::Polygon => EvmNetworkConfig {
                id: "polygon",
                chain_id: 137,
                explorer_url: "https://polygonscan.com",
                testnet: false,
            },
            EvmChain::PolygonAmoy => EvmNetworkConfig {
                id: "polygon-amoy",
                chain_id: 80002,
                explorer_url: "https://amoy.polygonscan.com",
                testnet: true,
            },
            EvmChain::Optimism => EvmNetworkConfig {
                id: "optimism",
                chain_id: 10,
                explorer_url: "https://optimistic.etherscan.io",
                testnet: false,
            },
            EvmChain::OptimismSepolia => EvmNetworkConfig {
                id: "optimism-sepolia",
                chain_id: 11155420,
                explorer_url: "https://sepolia-optimism.etherscan.io",
                testnet: true,
            },
            EvmChain::Arbitrum => EvmNetworkConfig {
                id: "arbitrum",
                chain_id: 42161,
                explorer_url: "https://arbiscan.io",
                testnet: false,
            },
            EvmChain::ArbitrumSepolia => EvmNetworkConfig {
                id: "arbitrum-sepolia",
                chain_id: 421614,
                explorer_url: "https://sepolia.arbiscan.io",
                testnet: true,
            },
            EvmChain::EthereumSepolia => EvmNetworkConfig {
                id: "ethereum-sepolia",
                chain_id: 11155111,
                explorer_url: "https://sepolia.etherscan.io",
                testnet: true,
            },
        }
    }

    pub fn is_testnet(&self) -> bool {
        self.network().testnet
    }

    pub fn is_mainnet(&self) -> bool {
        !self.network().testnet
    }
}

impl fmt::Display for EvmChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.network().id)
    }
}

/// Chain family driving response-shape and signing-target branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    Evm,
    Solana,
    Stellar,
}

impl ChainFamily {
    /// Wire segment used in `me:<family>:smart` wallet locators.
    pub fn locator_segment(&self) -> &'static str {
        match self {
            ChainFamily::Evm => "evm",
            ChainFamily::Solana => "solana",
            ChainFamily::Stellar => "stellar",
        }
    }
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.locator_segment())
    }
}

/// A supported chain identifier, tagged by family.
///
/// Serializes as the bare wire id (`"base-sepolia"`, `"solana"`, ...);
/// serde derives cannot express that for a mixed tuple/unit enum, so the
/// impls go through [`Chain::id`] and [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chain {
    Evm(EvmChain),
    Solana,
    Stellar,
}

impl Serialize for Chain {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

impl<'de> Deserialize<'de> for Chain {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        id.parse().map_err(serde::de::Error::custom)
    }
}

impl Chain {
    pub fn family(&self) -> ChainFamily {
        match self {
            Chain::Evm(_) => ChainFamily::Evm,
            Chain::Solana => ChainFamily::Solana,
            Chain::Stellar => ChainFamily::Stellar,
        }
    }

    /// Chain identifier as used on the wire.
    pub fn id(&self) -> &'static str {
        match self {
            Chain::Evm(chain) => chain.network().id,
            Chain::Solana => "solana",
            Chain::Stellar => "stellar",
        }
    }

    /// Native token symbol, lowercase as the balance API reports it.
    pub fn native_token_symbol(&self) -> &'static str {
        match self {
            Chain::Evm(chain) => match chain {
                EvmChain::Polygon | EvmChain::PolygonAmoy => "pol",
                _ => "eth",
            },
            Chain::Solana => "sol",
            Chain::Stellar => "xlm",
        }
    }

    /// Whether `address` is syntactically valid for this chain's family.
    pub fn is_valid_address(&self, address: &str) -> bool {
        match self.family() {
            ChainFamily::Evm => is_valid_evm_address(address),
            ChainFamily::Solana => is_valid_solana_address(address),
            ChainFamily::Stellar => is_valid_stellar_address(address),
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Chain {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "solana" => return Ok(Chain::Solana),
            "stellar" => return Ok(Chain::Stellar),
            _ => {}
        }
        for chain in EvmChain::ALL {
            if chain.network().id == value {
                return Ok(Chain::Evm(chain));
            }
        }
        Err(format!("unknown chain: {value}"))
    }
}

/// `0x` followed by 40 hexadecimal characters.
pub fn is_valid_evm_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .is_some_and(|hex_part| hex_part.len() == 40 && hex_part.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Base58-encoded 32-byte public key.
pub fn is_valid_solana_address(address: &str) -> bool {
    bs58::decode(address)
        .into_vec()
        .is_ok_and(|bytes| bytes.len() == 32)
}

/// Stellar account (`G…`) or contract (`C…`) strkey, 56 characters.
pub fn is_valid_stellar_address(address: &str) -> bool {
    address.len() == 56
        && (address.starts_with('G') || address.starts_with('C'))
        && address.chars().all(|c| c.is_ascii_alphanumeric())
}
