// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Pure comparison logic for signer configurations.
//!
//! Used by the wallet factory when `get_or_create_wallet` races against
//! an existing wallet record: the caller-declared configuration must be
//! compatible with what the backend already stores.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::api::DelegatedSignerDto;
use crate::error::WalletError;

/// Canonicalize an email address for comparison.
///
/// Gmail ignores dots in the local part and serves `googlemail.com` as
/// an alias of `gmail.com`, so two spellings of the same mailbox must
/// compare equal. Every other domain keeps its local part verbatim,
/// lowercased.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim().to_lowercase();
    let Some((local, domain)) = email.split_once('@') else {
        return email;
    };
    match domain {
        "gmail.com" | "googlemail.com" => {
            let local: String = local.chars().filter(|c| *c != '.').collect();
            format!("{local}@gmail.com")
        }
        _ => email,
    }
}

/// Deep-compare a caller-declared signer config against the stored one.
///
/// Only keys present on both sides are compared; one-sided keys carry
/// no conflict (the backend adds fields the caller never declares, such
/// as `locator`). String pairs that both look like email addresses
/// compare after [`normalize_email`]; every other string pair compares
/// case-insensitively. The first mismatch fails with the dotted path to
/// the offending field.
pub fn compare_signer_configs(new: &Value, existing: &Value) -> Result<(), WalletError> {
    compare_values(new, existing, "")
}

fn compare_values(new: &Value, existing: &Value, path: &str) -> Result<(), WalletError> {
    match (new, existing) {
        (Value::Object(new_map), Value::Object(existing_map)) => {
            for (key, new_value) in new_map {
                let Some(existing_value) = existing_map.get(key) else {
                    continue;
                };
                compare_values(new_value, existing_value, &join_path(path, key))?;
            }
            Ok(())
        }
        (Value::Array(new_items), Value::Array(existing_items)) => {
            if new_items.len() != existing_items.len() {
                return Err(mismatch(path));
            }
            for (index, (new_item, existing_item)) in
                new_items.iter().zip(existing_items).enumerate()
            {
                compare_values(new_item, existing_item, &join_path(path, &index.to_string()))?;
            }
            Ok(())
        }
        (Value::String(new_str), Value::String(existing_str)) => {
            if strings_equivalent(new_str, existing_str) {
                Ok(())
            } else {
                Err(mismatch(path))
            }
        }
        (new, existing) if new == existing => Ok(()),
        _ => Err(mismatch(path)),
    }
}

fn strings_equivalent(new: &str, existing: &str) -> bool {
    if looks_like_email(new) && looks_like_email(existing) {
        normalize_email(new) == normalize_email(existing)
    } else {
        new.eq_ignore_ascii_case(existing)
    }
}

/// Loose syntactic check: a non-empty local part and a dotted domain.
fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn mismatch(path: &str) -> WalletError {
    WalletError::WalletCreation(format!(
        "Wallet signer configuration mismatch at \"{path}\""
    ))
}

const SUBSET_RULE: &str = "When 'delegatedSigners' is provided to a method that may fetch an \
     existing wallet, each specified delegated signer must exist in that wallet's configuration.";

/// Enforce the delegated-signer subset law against an existing wallet.
///
/// Every specified locator must already be registered on the wallet;
/// the wallet may carry more. An empty specification never conflicts.
pub fn validate_delegated_signers(
    specified: &[String],
    wallet_address: &str,
    existing: &[DelegatedSignerDto],
) -> Result<(), WalletError> {
    if specified.is_empty() {
        return Ok(());
    }

    if existing.is_empty() {
        return Err(WalletError::WalletCreation(format!(
            "{} delegated signer(s) specified, but wallet \"{wallet_address}\" has no delegated \
             signers. {SUBSET_RULE}",
            specified.len()
        )));
    }

    let registered: BTreeSet<&str> = existing.iter().map(|s| s.locator.as_str()).collect();
    for locator in specified {
        if !registered.contains(locator.as_str()) {
            let available: Vec<&str> = existing.iter().map(|s| s.locator.as_str()).collect();
            return Err(WalletError::WalletCreation(format!(
                "Delegated signer '{locator}' does not exist in wallet \"{wallet_address}\". \
                 Available delegated signers: {}. {SUBSET_RULE}",
                available.join(", ")
            )));
        }
    }
    Ok(())
}
