// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use bon::Builder;
use serde::Deserialize;

use crate::chain::addresses::USDC_DECIMALS;
use crate::chain::aptos::AccountAddress;
use crate::error::{CctpError, Result};
use crate::protocol::DomainId;

/// A USDC amount as typed by a user: `"1.5"`, `1.5` or `2`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HumanAmount {
    Text(String),
    Number(serde_json::Number),
}

impl HumanAmount {
    pub fn to_base_units(&self) -> Result<u64> {
        match self {
            Self::Text(s) => parse_usdc_amount(s),
            Self::Number(n) => parse_usdc_amount(&number_to_decimal(n)?),
        }
    }
}

/// Renders a JSON number in plain decimal. `Number`'s own `Display` switches
/// to exponent form for small floats (`1e-6`).
fn number_to_decimal(n: &serde_json::Number) -> Result<String> {
    if let Some(whole) = n.as_u64() {
        return Ok(whole.to_string());
    }
    let invalid = || CctpError::Validation(format!("Invalid amount '{n}'"));
    let value = n.as_f64().ok_or_else(invalid)?;
    let fixed = format!("{value:.prec$}", prec = USDC_DECIMALS as usize);
    // Anything finer than a base unit does not survive the fixed rendering
    if fixed.parse::<f64>().map_err(|_| invalid())? != value {
        return Err(CctpError::Validation(format!(
            "Amount '{n}' has more than {USDC_DECIMALS} decimal places"
        )));
    }
    Ok(fixed)
}

impl From<&str> for HumanAmount {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Converts a decimal USDC amount to base units (6 decimals).
///
/// Rejects zero, negative values, and more precision than USDC carries;
/// nothing is rounded.
pub fn parse_usdc_amount(value: &str) -> Result<u64> {
    let value = value.trim();
    let invalid = || CctpError::Validation(format!("Invalid amount '{value}'"));

    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }
    if fraction.len() > USDC_DECIMALS as usize {
        return Err(CctpError::Validation(format!(
            "Amount '{value}' has more than {USDC_DECIMALS} decimal places"
        )));
    }

    let scale = 10u64.pow(USDC_DECIMALS);
    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let fraction: u64 = if fraction.is_empty() {
        0
    } else {
        format!("{fraction:0<width$}", width = USDC_DECIMALS as usize)
            .parse()
            .map_err(|_| invalid())?
    };

    let amount = whole
        .checked_mul(scale)
        .and_then(|w| w.checked_add(fraction))
        .ok_or_else(|| CctpError::Validation(format!("Amount '{value}' is too large")))?;

    if amount == 0 {
        return Err(CctpError::Validation(
            "Amount must be greater than zero".to_string(),
        ));
    }
    Ok(amount)
}

/// Parameters for burning USDC on Aptos.
///
/// Ephemeral: built per user action and consumed by the burn builder.
#[derive(Builder, Debug, Clone)]
pub struct BurnRequest {
    sender: AccountAddress,
    /// Base units
    amount: u64,
    destination_domain: DomainId,
    /// Destination wallet as the destination chain spells it
    #[builder(into)]
    recipient: String,
    #[builder(default)]
    sponsored: bool,
    /// Fee payer supplied by the caller, lowest configured priority
    fee_payer: Option<AccountAddress>,
    max_gas_amount: Option<u64>,
    gas_unit_price: Option<u64>,
}

impl BurnRequest {
    pub fn sender(&self) -> AccountAddress {
        self.sender
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn destination_domain(&self) -> DomainId {
        self.destination_domain
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn sponsored(&self) -> bool {
        self.sponsored
    }

    pub fn fee_payer(&self) -> Option<AccountAddress> {
        self.fee_payer
    }

    pub fn max_gas_amount(&self) -> Option<u64> {
        self.max_gas_amount
    }

    pub fn gas_unit_price(&self) -> Option<u64> {
        self.gas_unit_price
    }
}
