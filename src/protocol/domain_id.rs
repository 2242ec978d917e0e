// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! CCTP domain ID types for identifying blockchain networks
//!
//! Circle's Cross-Chain Transfer Protocol uses domain IDs as unique identifiers
//! for each supported blockchain network. Only the CCTP v1 domains are listed
//! here, since the Aptos message transmitter speaks v1 messages.
//!
//! Reference: <https://developers.circle.com/stablecoins/supported-domains>

use std::fmt;

/// CCTP domain identifier for blockchain networks
///
/// # Example
///
/// ```rust
/// use cctp_aptos::DomainId;
///
/// let aptos: u32 = DomainId::Aptos.into();
/// assert_eq!(aptos, 9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[non_exhaustive]
pub enum DomainId {
    /// Ethereum mainnet and Sepolia testnet (Domain ID: 0)
    Ethereum = 0,
    /// Avalanche C-Chain (Domain ID: 1)
    Avalanche = 1,
    /// Optimism (Domain ID: 2)
    Optimism = 2,
    /// Arbitrum One and Arbitrum Sepolia (Domain ID: 3)
    Arbitrum = 3,
    /// Noble (Domain ID: 4)
    Noble = 4,
    /// Solana (Domain ID: 5)
    Solana = 5,
    /// Base and Base Sepolia (Domain ID: 6)
    Base = 6,
    /// Polygon PoS (Domain ID: 7)
    Polygon = 7,
    /// Sui (Domain ID: 8)
    Sui = 8,
    /// Aptos (Domain ID: 9)
    Aptos = 9,
    /// Unichain (Domain ID: 10)
    Unichain = 10,
}

/// How a chain spells its account addresses before they are widened to the
/// 32-byte CCTP form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    /// 20-byte hex, left padded with zeros
    Evm,
    /// base58 ed25519 public key
    Solana,
    /// 32-byte hex (Aptos, Sui)
    Move,
    /// bech32, not accepted as a mint recipient here
    Cosmos,
}

impl DomainId {
    /// Returns the numeric domain ID value
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Attempts to create a DomainId from a u32 value
    ///
    /// ```rust
    /// use cctp_aptos::DomainId;
    ///
    /// assert_eq!(DomainId::from_u32(5), Some(DomainId::Solana));
    /// assert_eq!(DomainId::from_u32(9), Some(DomainId::Aptos));
    /// assert_eq!(DomainId::from_u32(999), None);
    /// ```
    #[inline]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Ethereum),
            1 => Some(Self::Avalanche),
            2 => Some(Self::Optimism),
            3 => Some(Self::Arbitrum),
            4 => Some(Self::Noble),
            5 => Some(Self::Solana),
            6 => Some(Self::Base),
            7 => Some(Self::Polygon),
            8 => Some(Self::Sui),
            9 => Some(Self::Aptos),
            10 => Some(Self::Unichain),
            _ => None,
        }
    }

    /// Returns the chain name as a string
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ethereum => "Ethereum",
            Self::Avalanche => "Avalanche",
            Self::Optimism => "Optimism",
            Self::Arbitrum => "Arbitrum",
            Self::Noble => "Noble",
            Self::Solana => "Solana",
            Self::Base => "Base",
            Self::Polygon => "Polygon",
            Self::Sui => "Sui",
            Self::Aptos => "Aptos",
            Self::Unichain => "Unichain",
        }
    }

    #[inline]
    pub const fn address_kind(self) -> AddressKind {
        match self {
            Self::Solana => AddressKind::Solana,
            Self::Aptos | Self::Sui => AddressKind::Move,
            Self::Noble => AddressKind::Cosmos,
            _ => AddressKind::Evm,
        }
    }
}

impl From<DomainId> for u32 {
    #[inline]
    fn from(domain: DomainId) -> Self {
        domain.as_u32()
    }
}

impl TryFrom<u32> for DomainId {
    type Error = InvalidDomainId;

    #[inline]
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_u32(value).ok_or(InvalidDomainId(value))
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u32())
    }
}

/// Error returned when attempting to convert an invalid u32 to a DomainId
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidDomainId(pub u32);

impl fmt::Display for InvalidDomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid CCTP domain ID: {}", self.0)
    }
}

impl std::error::Error for InvalidDomainId {}

impl From<InvalidDomainId> for crate::CctpError {
    fn from(err: InvalidDomainId) -> Self {
        crate::CctpError::UnsupportedDomain(err.0)
    }
}
