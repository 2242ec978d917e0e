// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! CCTP protocol types and definitions
//!
//! This module contains core protocol-level types used in Circle's Cross-Chain
//! Transfer Protocol (CCTP): domain identifiers, chain-agnostic addresses, the
//! message codec and attestation responses.

mod address;
mod attestation;
mod domain_id;
mod message;

pub use address::{
    hex_to_b256, normalize_or_zero, parse_recipient, AddressInput, ADDRESS_LEN,
};
pub use attestation::{
    AttestationLookup, IrisMessage, MessagesResponse, ReadyAttestation,
};
pub use domain_id::{AddressKind, DomainId, InvalidDomainId};
pub use message::{
    AttestedMessage, BurnMessageBody, BurnPayload, BurnPayloadInput, DepositMessage,
    DepositMessageInput, DigestAlgorithm, MessageDigest, Numeric,
};
