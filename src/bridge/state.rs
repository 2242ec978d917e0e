// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Lifecycle of a single burn → attestation → mint operation.

use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::error::{CctpError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BridgeState {
    BurnSubmitted,
    AttestationPending,
    AttestationReady,
    MintSubmitted,
    MintConfirmed,
    Failed,
}

impl BridgeState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BurnSubmitted => "BURN_SUBMITTED",
            Self::AttestationPending => "ATTESTATION_PENDING",
            Self::AttestationReady => "ATTESTATION_READY",
            Self::MintSubmitted => "MINT_SUBMITTED",
            Self::MintConfirmed => "MINT_CONFIRMED",
            Self::Failed => "FAILED",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::MintConfirmed | Self::Failed)
    }

    /// Whether `self → next` is an edge of the lifecycle.
    ///
    /// Polling may leave `AttestationPending` unchanged, and any
    /// non-terminal state may fail.
    pub const fn can_transition_to(self, next: Self) -> bool {
        use BridgeState::*;
        matches!(
            (self, next),
            (BurnSubmitted, AttestationPending)
                | (AttestationPending, AttestationPending)
                | (AttestationPending, AttestationReady)
                | (AttestationReady, MintSubmitted)
                | (MintSubmitted, MintConfirmed)
                | (BurnSubmitted, Failed)
                | (AttestationPending, Failed)
                | (AttestationReady, Failed)
                | (MintSubmitted, Failed)
        )
    }
}

impl fmt::Display for BridgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bridge operation keyed by its source-chain transaction hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeOperation {
    source_tx_hash: String,
    state: BridgeState,
    #[serde(skip_serializing_if = "Option::is_none")]
    mint_tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<String>,
}

impl BridgeOperation {
    /// Starts tracking a burn whose hash is known.
    pub fn burn_submitted(source_tx_hash: impl Into<String>) -> Self {
        Self {
            source_tx_hash: source_tx_hash.into(),
            state: BridgeState::BurnSubmitted,
            mint_tx_hash: None,
            failure: None,
        }
    }

    pub fn source_tx_hash(&self) -> &str {
        &self.source_tx_hash
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn mint_tx_hash(&self) -> Option<&str> {
        self.mint_tx_hash.as_deref()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn transition(&mut self, next: BridgeState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(CctpError::InvalidTransition {
                from: self.state.as_str(),
                to: next.as_str(),
            });
        }
        debug!(
            source_tx_hash = %self.source_tx_hash,
            from = %self.state,
            to = %next,
            "Bridge state transition"
        );
        self.state = next;
        Ok(())
    }

    pub fn mint_submitted(&mut self, mint_tx_hash: impl Into<String>) -> Result<()> {
        self.transition(BridgeState::MintSubmitted)?;
        self.mint_tx_hash = Some(mint_tx_hash.into());
        Ok(())
    }

    /// Moves to `Failed`, recording why. Terminal states are left alone.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.state.is_terminal() {
            return;
        }
        self.state = BridgeState::Failed;
        self.failure = Some(reason.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut op = BridgeOperation::burn_submitted("sig");
        op.transition(BridgeState::AttestationPending).unwrap();
        op.transition(BridgeState::AttestationPending).unwrap();
        op.transition(BridgeState::AttestationReady).unwrap();
        op.mint_submitted("0xmint").unwrap();
        op.transition(BridgeState::MintConfirmed).unwrap();
        assert_eq!(op.state(), BridgeState::MintConfirmed);
        assert_eq!(op.mint_tx_hash(), Some("0xmint"));
    }

    #[test]
    fn test_cannot_mint_before_attestation() {
        let mut op = BridgeOperation::burn_submitted("sig");
        op.transition(BridgeState::AttestationPending).unwrap();
        let err = op.transition(BridgeState::MintSubmitted).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"Invalid state transition from ATTESTATION_PENDING to MINT_SUBMITTED");
    }

    #[test]
    fn test_fail_from_any_non_terminal_state() {
        let mut op = BridgeOperation::burn_submitted("sig");
        op.fail("boom");
        assert_eq!(op.state(), BridgeState::Failed);
        assert_eq!(op.failure(), Some("boom"));
    }

    #[test]
    fn test_confirmed_is_final() {
        let mut op = BridgeOperation::burn_submitted("sig");
        op.transition(BridgeState::AttestationPending).unwrap();
        op.transition(BridgeState::AttestationReady).unwrap();
        op.mint_submitted("0xmint").unwrap();
        op.transition(BridgeState::MintConfirmed).unwrap();
        op.fail("late failure");
        assert_eq!(op.state(), BridgeState::MintConfirmed);
        assert!(op.transition(BridgeState::Failed).is_err());
    }

    #[test]
    fn test_serializes_screaming_state() {
        let op = BridgeOperation::burn_submitted("sig");
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["state"], "BURN_SUBMITTED");
        assert_eq!(json["sourceTxHash"], "sig");
    }
}
