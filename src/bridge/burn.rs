// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Aptos → destination burn: build the `deposit_for_burn` transaction,
//! hand it to a wallet, and submit what comes back.

use alloy_primitives::B256;
use bon::Builder;
use tracing::{debug, error, info, Instrument};

use super::config::{expiration_timestamp_secs, GasConfig};
use super::params::BurnRequest;
use crate::chain::aptos::{
    entry_arg, AccountAddress, AuthenticatorBytes, EntryFunction, ModuleId, RawTransaction,
    Script, SignedTransaction, SimpleTransaction, TransactionArgument, TransactionAuthenticator,
    TransactionPayload,
};
use crate::chain::solana::{mint_recipient_for, pubkey_from_b256};
use crate::chain::Network;
use crate::config::{CCTP_TOOLS_ADDRESS_ENV, GAS_STATION_API_KEY_ENV};
use crate::error::{CctpError, Result};
use crate::protocol::{parse_recipient, AddressKind, DomainId};
use crate::spans;
use crate::traits::{AptosNode, SponsorRelay, TransactionSigner};
use crate::wallet::{FeePayerConfig, FeePayerPurpose, ResolvedFeePayer};

pub const CCTP_TOOLS_MODULE: &str = "cctp_tools";
pub const DEPOSIT_FOR_BURN: &str = "deposit_for_burn";

/// A burn transaction ready for the sender's wallet.
#[derive(Debug, Clone)]
pub struct BuiltBurn {
    pub transaction: SimpleTransaction,
    /// Bytes the sender signs; the fee-payer envelope when sponsored.
    pub signing_message: Vec<u8>,
    pub expiration_timestamp_secs: u64,
    /// `None` when the gas station will fill in its own address.
    pub fee_payer: Option<ResolvedFeePayer>,
    pub mint_recipient: B256,
    pub sponsored: bool,
}

/// Inputs of the wallet signing-message preview for the burn script.
#[derive(Builder, Debug, Clone)]
pub struct ScriptSigningRequest {
    sender: AccountAddress,
    /// Compiled script bytecode
    bytecode: Vec<u8>,
    amount: u64,
    destination_domain: u32,
    mint_recipient: B256,
    burn_token: B256,
    fee_payer: Option<AccountAddress>,
    max_gas_amount: Option<u64>,
    gas_unit_price: Option<u64>,
}

/// Builds and submits Aptos burn transactions.
///
/// The fullnode supplies sequence numbers and the ledger clock; the relay,
/// when configured, sponsors gas. Direct submission co-signs with the
/// configured fee payer key.
///
/// # Example
///
/// ```rust,ignore
/// use cctp_aptos::{AptosBurner, BurnRequest, DomainId, Network};
///
/// let burner = AptosBurner::builder()
///     .node(node)
///     .relay(gas_station)
///     .network(Network::Mainnet)
///     .cctp_tools(cctp_tools_address)
///     .build();
///
/// let request = BurnRequest::builder()
///     .sender(sender)
///     .amount(1_000_000)
///     .destination_domain(DomainId::Solana)
///     .recipient("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM")
///     .sponsored(true)
///     .build();
///
/// let built = burner.build(&request).await?;
/// // hand `built.transaction` to the wallet, then:
/// let tx_hash = burner.submit(&built.transaction, &sender_auth, true).await?;
/// ```
#[derive(Builder, Clone, Debug)]
pub struct AptosBurner<N: AptosNode, R: SponsorRelay> {
    node: N,
    relay: Option<R>,
    network: Network,
    /// Address that publishes the `cctp_tools` module
    cctp_tools: Option<AccountAddress>,
    #[builder(default)]
    fee_payer: FeePayerConfig,
    #[builder(default)]
    gas: GasConfig,
}

impl<N: AptosNode, R: SponsorRelay> AptosBurner<N, R> {
    pub fn network(&self) -> Network {
        self.network
    }

    pub fn fee_payer(&self) -> &FeePayerConfig {
        &self.fee_payer
    }

    fn cctp_tools(&self) -> Result<AccountAddress> {
        self.cctp_tools
            .ok_or_else(|| CctpError::MissingConfig(CCTP_TOOLS_ADDRESS_ENV.to_string()))
    }

    /// `0xaddr::cctp_tools::deposit_for_burn`
    pub fn function_id(&self) -> Result<String> {
        Ok(format!(
            "{}::{CCTP_TOOLS_MODULE}::{DEPOSIT_FOR_BURN}",
            self.cctp_tools()?
        ))
    }

    /// The 32-byte mint recipient for `recipient` on `destination`.
    ///
    /// Solana mints credit a token account, so a Solana wallet is translated
    /// to its USDC associated token account.
    pub fn mint_recipient(&self, destination: DomainId, recipient: &str) -> Result<B256> {
        let owner = parse_recipient(destination, recipient)?;
        Ok(match destination.address_kind() {
            AddressKind::Solana => {
                mint_recipient_for(&pubkey_from_b256(owner), &self.network.solana_usdc())
            }
            _ => owner,
        })
    }

    /// Builds the unsigned burn transaction.
    ///
    /// # Errors
    ///
    /// Rejects a zero amount, a burn to Aptos itself, or an unparseable
    /// recipient before touching the fullnode. Fails when no fee payer can
    /// be resolved for an unsponsored burn.
    pub async fn build(&self, request: &BurnRequest) -> Result<BuiltBurn> {
        let span = spans::build_burn(
            &request.sender(),
            request.destination_domain(),
            request.amount(),
            request.sponsored(),
        );
        async move {
            let result = self.build_inner(request).await;
            if let Err(ref e) = result {
                spans::record_error(e);
                error!(error = %e, event = "burn_build_failed");
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn build_inner(&self, request: &BurnRequest) -> Result<BuiltBurn> {
        if request.amount() == 0 {
            return Err(CctpError::Validation(
                "Amount must be greater than zero".to_string(),
            ));
        }
        if request.destination_domain() == DomainId::Aptos {
            return Err(CctpError::Validation(
                "Destination domain must differ from Aptos".to_string(),
            ));
        }
        let mint_recipient =
            self.mint_recipient(request.destination_domain(), request.recipient())?;
        let cctp_tools = self.cctp_tools()?;

        let fee_payer = if request.sponsored() {
            None
        } else {
            Some(self.fee_payer.resolve(
                request.fee_payer(),
                request.sender(),
                FeePayerPurpose::Submission,
            )?)
        };

        let payload = TransactionPayload::EntryFunction(EntryFunction {
            module: ModuleId {
                address: cctp_tools,
                name: CCTP_TOOLS_MODULE.to_string(),
            },
            function: DEPOSIT_FOR_BURN.to_string(),
            ty_args: vec![],
            args: vec![
                entry_arg(&request.amount())?,
                entry_arg(&request.destination_domain().as_u32())?,
                entry_arg(&AccountAddress::from(mint_recipient))?,
                entry_arg(&AccountAddress::from(self.network.aptos_usdc()))?,
            ],
        });

        let gas = self
            .gas
            .with_overrides(request.max_gas_amount(), request.gas_unit_price());
        let transaction = self
            .assemble(
                request.sender(),
                payload,
                gas,
                request.sponsored(),
                fee_payer.map(|p| p.address),
            )
            .await?;
        let signing_message = transaction.signing_message(request.sponsored())?;

        info!(
            function = %transaction.raw_txn.payload.function_id(),
            mint_recipient = %mint_recipient,
            fee_payer = ?fee_payer.map(|p| p.address),
            expiration_timestamp_secs = transaction.raw_txn.expiration_timestamp_secs,
            signing_message_length_bytes = signing_message.len(),
            event = "burn_transaction_built"
        );

        Ok(BuiltBurn {
            expiration_timestamp_secs: transaction.raw_txn.expiration_timestamp_secs,
            transaction,
            signing_message,
            fee_payer,
            mint_recipient,
            sponsored: request.sponsored(),
        })
    }

    /// Signing message a wallet shows for the compiled burn script.
    ///
    /// Nothing is submitted, so the sender may stand in as its own fee payer
    /// when none is configured.
    pub async fn script_signing_message(&self, request: &ScriptSigningRequest) -> Result<Vec<u8>> {
        let fee_payer = self.fee_payer.resolve(
            request.fee_payer,
            request.sender,
            FeePayerPurpose::SigningPreview,
        )?;
        let payload = TransactionPayload::Script(Script {
            code: request.bytecode.clone(),
            ty_args: vec![],
            args: vec![
                TransactionArgument::U64(request.amount),
                TransactionArgument::U32(request.destination_domain),
                TransactionArgument::Address(request.mint_recipient.into()),
                TransactionArgument::Address(request.burn_token.into()),
            ],
        });
        let gas = self
            .gas
            .with_overrides(request.max_gas_amount, request.gas_unit_price);
        let transaction = self
            .assemble(request.sender, payload, gas, false, Some(fee_payer.address))
            .await
            .map_err(|e| match e {
                CctpError::Build(_) => e,
                other => CctpError::build(other),
            })?;

        debug!(
            sender = %request.sender,
            fee_payer = %fee_payer.address,
            fee_payer_source = ?fee_payer.source,
            bytecode_length_bytes = request.bytecode.len(),
            event = "script_signing_message_built"
        );
        transaction.signing_message(true)
    }

    async fn assemble(
        &self,
        sender: AccountAddress,
        payload: TransactionPayload,
        gas: GasConfig,
        sponsored: bool,
        fee_payer_address: Option<AccountAddress>,
    ) -> Result<SimpleTransaction> {
        let ledger = self.node.ledger_info().await?;
        let expected_chain_id = self.network.aptos_chain_id();
        if ledger.chain_id != expected_chain_id {
            return Err(CctpError::InvalidConfig(format!(
                "Fullnode reports chain id {} but {} expects {expected_chain_id}",
                ledger.chain_id, self.network
            )));
        }
        let sequence_number = self.node.sequence_number(sender).await?;

        Ok(SimpleTransaction {
            raw_txn: RawTransaction {
                sender,
                sequence_number,
                payload,
                max_gas_amount: gas.max_gas_amount,
                gas_unit_price: gas.gas_unit_price,
                expiration_timestamp_secs: expiration_timestamp_secs(
                    ledger.ledger_timestamp_secs(),
                    sponsored,
                ),
                chain_id: ledger.chain_id,
            },
            fee_payer_address,
        })
    }

    /// Submits a transaction the sender has signed.
    ///
    /// Sponsored transactions go to the relay. Otherwise the configured
    /// payer co-signs when the transaction names one, and the result goes
    /// straight to the fullnode.
    pub async fn submit(
        &self,
        transaction: &SimpleTransaction,
        sender_authenticator: &AuthenticatorBytes,
        sponsored: bool,
    ) -> Result<String> {
        let function = transaction.raw_txn.payload.function_id();
        let span = spans::submit_burn(&function, &transaction.raw_txn.sender, sponsored);
        async move {
            let result = self
                .submit_inner(transaction, sender_authenticator, sponsored)
                .await;
            match &result {
                Ok(tx_hash) => {
                    tracing::Span::current().record("tx_hash", tx_hash.as_str());
                    info!(tx_hash = %tx_hash, function = %function, event = "burn_submitted");
                }
                Err(e) => {
                    spans::record_error(e);
                    error!(error = %e, function = %function, event = "burn_submit_failed");
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn submit_inner(
        &self,
        transaction: &SimpleTransaction,
        sender_authenticator: &AuthenticatorBytes,
        sponsored: bool,
    ) -> Result<String> {
        if sponsored {
            let relay = self
                .relay
                .as_ref()
                .ok_or_else(|| CctpError::MissingConfig(GAS_STATION_API_KEY_ENV.to_string()))?;
            return relay
                .sign_and_submit(transaction, sender_authenticator)
                .await;
        }

        let authenticator = match transaction.fee_payer_address {
            Some(fee_payer_address) => {
                let payer = self.fee_payer.signer()?;
                if payer.address() != fee_payer_address {
                    return Err(CctpError::Validation(format!(
                        "Transaction fee payer {fee_payer_address} is not the configured payer {}",
                        payer.address()
                    )));
                }
                TransactionAuthenticator::FeePayer {
                    sender: sender_authenticator.clone(),
                    fee_payer_address,
                    fee_payer: payer.sign_transaction(transaction, true)?.to_bytes()?,
                }
            }
            None => TransactionAuthenticator::SingleSender(sender_authenticator.clone()),
        };

        self.node
            .submit(&SignedTransaction {
                raw_txn: transaction.raw_txn.clone(),
                authenticator,
            })
            .await
    }

    /// Builds, signs with `signer` and submits in one go.
    ///
    /// Used for accounts this process controls, such as a Solana-derived
    /// account whose keypair is at hand.
    pub async fn burn_with_signer<S: TransactionSigner + ?Sized>(
        &self,
        request: &BurnRequest,
        signer: &S,
    ) -> Result<String> {
        if signer.address() != request.sender() {
            return Err(CctpError::Validation(format!(
                "Signer {} cannot sign for sender {}",
                signer.address(),
                request.sender()
            )));
        }
        let built = self.build(request).await?;
        let authenticator = signer
            .sign_transaction(&built.transaction, built.sponsored)?
            .to_bytes()?;
        self.submit(&built.transaction, &authenticator, built.sponsored)
            .await
    }
}
