// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! BCS model of the Aptos transactions this crate builds and submits.
//!
//! Only the shapes the bridge needs are modeled: entry function and script
//! payloads, the fee-payer signing envelope, and the Ed25519 / account
//! abstraction authenticators. Sender authenticators produced by wallets
//! are carried as opaque BCS bytes ([`AuthenticatorBytes`]) so keyless or
//! multi-key wallets pass through untouched.

use alloy_primitives::{hex, B256};
use ed25519_dalek::{Signer, SigningKey};
use serde::{ser::SerializeStructVariant, Deserialize, Serialize, Serializer};
use sha3::{Digest, Sha3_256};
use std::fmt;

use crate::error::{CctpError, Result};

/// Domain separator for plain single-signer transactions.
const RAW_TRANSACTION_SALT: &[u8] = b"APTOS::RawTransaction";
/// Domain separator for multi-agent and fee-payer transactions.
const RAW_TRANSACTION_WITH_DATA_SALT: &[u8] = b"APTOS::RawTransactionWithData";

/// Authentication key scheme bytes appended before hashing.
const ED25519_SCHEME: u8 = 0x00;
const DERIVABLE_ABSTRACTION_SCHEME: u8 = 0x05;

fn sha3(bytes: &[u8]) -> [u8; 32] {
    Sha3_256::digest(bytes).into()
}

/// A 32-byte Aptos account or object address.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountAddress(pub [u8; 32]);

impl AccountAddress {
    pub const ZERO: Self = Self([0u8; 32]);

    /// The `0x1` framework address.
    pub const ONE: Self = {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        Self(bytes)
    };

    pub fn from_hex(value: &str) -> Result<Self> {
        crate::protocol::hex_to_b256(value).map(Self::from)
    }

    /// Address of a single-key Ed25519 account: `sha3(pk ∥ 0x00)`.
    pub fn from_ed25519_public_key(public_key: &[u8; 32]) -> Self {
        let mut input = Vec::with_capacity(33);
        input.extend_from_slice(public_key);
        input.push(ED25519_SCHEME);
        Self(sha3(&input))
    }

    pub fn to_b256(self) -> B256 {
        B256::from(self.0)
    }
}

impl From<B256> for AccountAddress {
    fn from(value: B256) -> Self {
        Self(value.0)
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// ============================================================================
// Payloads
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructTag {
    pub address: AccountAddress,
    pub module: String,
    pub name: String,
    pub type_args: Vec<TypeTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeTag {
    Bool,
    U8,
    U64,
    U128,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
    U16,
    U32,
    U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleId {
    pub address: AccountAddress,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFunction {
    pub module: ModuleId,
    pub function: String,
    pub ty_args: Vec<TypeTag>,
    /// Each argument is individually BCS-encoded.
    pub args: Vec<Vec<u8>>,
}

impl EntryFunction {
    /// `0xaddr::module::function`, the identifier sponsorship rules match on.
    pub fn function_id(&self) -> String {
        format!(
            "{}::{}::{}",
            self.module.address, self.module.name, self.function
        )
    }
}

/// Script argument; variant order is the on-chain enum tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionArgument {
    U8(u8),
    U64(u64),
    U128(u128),
    Address(AccountAddress),
    U8Vector(Vec<u8>),
    Bool(bool),
    U16(u16),
    U32(u32),
    /// Little-endian bytes
    U256([u8; 32]),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub code: Vec<u8>,
    pub ty_args: Vec<TypeTag>,
    pub args: Vec<TransactionArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionPayload {
    Script(Script),
    /// Retired on chain; present so the enum tags line up.
    DeprecatedModuleBundle(Vec<Vec<u8>>),
    EntryFunction(EntryFunction),
}

impl TransactionPayload {
    /// Human-readable name of what the payload executes.
    pub fn function_id(&self) -> String {
        match self {
            Self::EntryFunction(f) => f.function_id(),
            Self::Script(_) => "script".to_string(),
            Self::DeprecatedModuleBundle(_) => "module_bundle".to_string(),
        }
    }
}

// ============================================================================
// Transactions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub sender: AccountAddress,
    pub sequence_number: u64,
    pub payload: TransactionPayload,
    pub max_gas_amount: u64,
    pub gas_unit_price: u64,
    pub expiration_timestamp_secs: u64,
    pub chain_id: u8,
}

/// Envelope signed by every party of a multi-agent or fee-payer transaction.
#[derive(Debug, Clone, Serialize)]
pub enum RawTransactionWithData<'a> {
    MultiAgent {
        raw_txn: &'a RawTransaction,
        secondary_signer_addresses: Vec<AccountAddress>,
    },
    MultiAgentWithFeePayer {
        raw_txn: &'a RawTransaction,
        secondary_signer_addresses: Vec<AccountAddress>,
        fee_payer_address: AccountAddress,
    },
}

/// A raw transaction plus its optional fee payer, built once and never
/// mutated afterwards.
///
/// BCS layout matches the wallet-adapter `SimpleTransaction`, so the hex
/// handed to a wallet round-trips through `submit-burn` unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleTransaction {
    pub raw_txn: RawTransaction,
    pub fee_payer_address: Option<AccountAddress>,
}

impl SimpleTransaction {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bcs::from_bytes(bytes)?)
    }

    /// Bytes every signer of this transaction signs over.
    ///
    /// A sponsored transaction whose payer is not yet known (gas station
    /// flow) is signed with the zero address as fee payer; the sponsor fills
    /// in its own address afterwards.
    pub fn signing_message(&self, sponsored: bool) -> Result<Vec<u8>> {
        match (self.fee_payer_address, sponsored) {
            (Some(fee_payer_address), _) => fee_payer_signing_message(&self.raw_txn, fee_payer_address),
            (None, true) => fee_payer_signing_message(&self.raw_txn, AccountAddress::ZERO),
            (None, false) => {
                let mut message = sha3(RAW_TRANSACTION_SALT).to_vec();
                message.extend(bcs::to_bytes(&self.raw_txn)?);
                Ok(message)
            }
        }
    }
}

fn fee_payer_signing_message(
    raw_txn: &RawTransaction,
    fee_payer_address: AccountAddress,
) -> Result<Vec<u8>> {
    let envelope = RawTransactionWithData::MultiAgentWithFeePayer {
        raw_txn,
        secondary_signer_addresses: Vec::new(),
        fee_payer_address,
    };
    let mut message = sha3(RAW_TRANSACTION_WITH_DATA_SALT).to_vec();
    message.extend(bcs::to_bytes(&envelope)?);
    Ok(message)
}

// ============================================================================
// Authenticators
// ============================================================================

/// A fully BCS-encoded `AccountAuthenticator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatorBytes(pub Vec<u8>);

impl AuthenticatorBytes {
    /// Highest `AccountAuthenticator` tag the chain currently accepts.
    const MAX_VARIANT: u8 = 5;

    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        match bytes.first() {
            Some(tag) if *tag <= Self::MAX_VARIANT => Ok(Self(bytes)),
            Some(tag) => Err(CctpError::Validation(format!(
                "Unknown account authenticator variant {tag}"
            ))),
            None => Err(CctpError::Validation(
                "Account authenticator is empty".to_string(),
            )),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&AccountAuthenticator> for AuthenticatorBytes {
    type Error = CctpError;

    fn try_from(value: &AccountAuthenticator) -> Result<Self> {
        Ok(Self(bcs::to_bytes(value)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub module_address: AccountAddress,
    pub module_name: String,
    pub function_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbstractionAuthData {
    V1 {
        signing_message_digest: Vec<u8>,
        authenticator: Vec<u8>,
    },
    DerivableV1 {
        signing_message_digest: Vec<u8>,
        abstract_signature: Vec<u8>,
        abstract_public_key: Vec<u8>,
    },
}

/// The authenticator shapes this crate produces itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountAuthenticator {
    Ed25519 {
        public_key: Vec<u8>,
        signature: Vec<u8>,
    },
    Abstraction {
        function_info: FunctionInfo,
        auth_data: AbstractionAuthData,
    },
}

impl Serialize for AccountAuthenticator {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        // Variant indices are the on-chain tags, not declaration order.
        match self {
            Self::Ed25519 {
                public_key,
                signature,
            } => {
                let mut state =
                    serializer.serialize_struct_variant("AccountAuthenticator", 0, "Ed25519", 2)?;
                state.serialize_field("public_key", public_key)?;
                state.serialize_field("signature", signature)?;
                state.end()
            }
            Self::Abstraction {
                function_info,
                auth_data,
            } => {
                let mut state = serializer.serialize_struct_variant(
                    "AccountAuthenticator",
                    5,
                    "Abstraction",
                    2,
                )?;
                state.serialize_field("function_info", function_info)?;
                state.serialize_field("auth_data", auth_data)?;
                state.end()
            }
        }
    }
}

impl AccountAuthenticator {
    pub fn to_bytes(&self) -> Result<AuthenticatorBytes> {
        AuthenticatorBytes::try_from(self)
    }
}

/// Address of a derivable-abstraction account:
/// `sha3(bcs(function_info) ∥ bcs(identity) ∥ 0x05)`.
pub fn derivable_account_address(
    function_info: &FunctionInfo,
    account_identity: &[u8],
) -> Result<AccountAddress> {
    let mut input = bcs::to_bytes(function_info)?;
    input.extend(bcs::to_bytes(&account_identity.to_vec())?);
    input.push(DERIVABLE_ABSTRACTION_SCHEME);
    Ok(AccountAddress(sha3(&input)))
}

/// Ed25519 Aptos account held by this process (the fee payer).
#[derive(Clone)]
pub struct LocalAccount {
    signing_key: SigningKey,
    address: AccountAddress,
}

impl fmt::Debug for LocalAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalAccount")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl LocalAccount {
    /// Accepts `0x…` hex or the AIP-80 `ed25519-priv-0x…` form.
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let trimmed = private_key.trim();
        let trimmed = trimmed.strip_prefix("ed25519-priv-").unwrap_or(trimmed);
        let bytes = hex::decode(trimmed.trim_start_matches("0x"))
            .map_err(|e| CctpError::InvalidConfig(format!("Aptos private key is not hex: {e}")))?;
        let secret: [u8; 32] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            CctpError::InvalidConfig(format!(
                "Aptos private key must be 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self::from_signing_key(SigningKey::from_bytes(&secret)))
    }

    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        let address =
            AccountAddress::from_ed25519_public_key(&signing_key.verifying_key().to_bytes());
        Self {
            signing_key,
            address,
        }
    }

    pub fn address(&self) -> AccountAddress {
        self.address
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn sign(&self, message: &[u8]) -> AccountAuthenticator {
        AccountAuthenticator::Ed25519 {
            public_key: self.public_key().to_vec(),
            signature: self.signing_key.sign(message).to_bytes().to_vec(),
        }
    }
}

/// A transaction ready for `POST /v1/transactions`.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub raw_txn: RawTransaction,
    pub authenticator: TransactionAuthenticator,
}

#[derive(Debug, Clone)]
pub enum TransactionAuthenticator {
    SingleSender(AuthenticatorBytes),
    FeePayer {
        sender: AuthenticatorBytes,
        fee_payer_address: AccountAddress,
        fee_payer: AuthenticatorBytes,
    },
}

impl SignedTransaction {
    /// `TransactionAuthenticator` tags
    const FEE_PAYER_TAG: u8 = 3;
    const SINGLE_SENDER_TAG: u8 = 4;

    /// BCS-encodes the transaction. Authenticators are spliced in as
    /// already-encoded bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = bcs::to_bytes(&self.raw_txn)?;
        match &self.authenticator {
            TransactionAuthenticator::SingleSender(sender) => {
                out.push(Self::SINGLE_SENDER_TAG);
                out.extend_from_slice(sender.as_bytes());
            }
            TransactionAuthenticator::FeePayer {
                sender,
                fee_payer_address,
                fee_payer,
            } => {
                out.push(Self::FEE_PAYER_TAG);
                out.extend_from_slice(sender.as_bytes());
                // no secondary signers: empty address and authenticator vectors
                out.extend(bcs::to_bytes(&Vec::<AccountAddress>::new())?);
                out.push(0);
                out.extend(bcs::to_bytes(fee_payer_address)?);
                out.extend_from_slice(fee_payer.as_bytes());
            }
        }
        Ok(out)
    }

    /// Transaction hash as reported by the fullnode.
    pub fn hash(&self) -> Result<B256> {
        let mut input = sha3(b"APTOS::Transaction").to_vec();
        // `Transaction::UserTransaction` tag
        input.push(0);
        input.extend(self.to_bytes()?);
        Ok(B256::from(sha3(&input)))
    }
}

/// Current chain view needed to stamp a new transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerInfo {
    pub chain_id: u8,
    /// Microseconds since the epoch
    pub ledger_timestamp_usecs: u64,
}

impl LedgerInfo {
    pub fn ledger_timestamp_secs(&self) -> u64 {
        self.ledger_timestamp_usecs / 1_000_000
    }
}

/// Committed state of a user transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Committed { success: bool, vm_status: String },
}

/// BCS encoding of a single entry-function argument.
pub fn entry_arg<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bcs::to_bytes(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_transaction() -> RawTransaction {
        RawTransaction {
            sender: AccountAddress::ONE,
            sequence_number: 7,
            payload: TransactionPayload::EntryFunction(EntryFunction {
                module: ModuleId {
                    address: AccountAddress::ONE,
                    name: "cctp_tools".to_string(),
                },
                function: "deposit_for_burn".to_string(),
                ty_args: vec![],
                args: vec![entry_arg(&1_000_000u64).unwrap(), entry_arg(&5u32).unwrap()],
            }),
            max_gas_amount: 200_000,
            gas_unit_price: 100,
            expiration_timestamp_secs: 1_700_000_100,
            chain_id: 1,
        }
    }

    #[test]
    fn test_account_address_display() {
        insta::assert_snapshot!(
            AccountAddress::ONE.to_string(),
            @"0x0000000000000000000000000000000000000000000000000000000000000001"
        );
    }

    #[test]
    fn test_address_is_unprefixed_in_bcs() {
        let bytes = bcs::to_bytes(&AccountAddress::ONE).unwrap();
        assert_eq!(bytes.len(), 32);
    }

    #[test]
    fn test_entry_function_payload_tag() {
        let raw = raw_transaction();
        let bytes = bcs::to_bytes(&raw).unwrap();
        // sender (32) + sequence number (8), then the payload tag
        assert_eq!(bytes[40], 2);
    }

    #[test]
    fn test_script_argument_tags() {
        assert_eq!(bcs::to_bytes(&TransactionArgument::U64(1)).unwrap()[0], 1);
        assert_eq!(
            bcs::to_bytes(&TransactionArgument::Address(AccountAddress::ONE)).unwrap()[0],
            3
        );
        assert_eq!(bcs::to_bytes(&TransactionArgument::U32(5)).unwrap()[0], 7);
    }

    #[test]
    fn test_simple_transaction_roundtrip() {
        let tx = SimpleTransaction {
            raw_txn: raw_transaction(),
            fee_payer_address: Some(AccountAddress::ONE),
        };
        let decoded = SimpleTransaction::from_bytes(&tx.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, tx);
    }

    #[test]
    fn test_fee_payer_signing_message_uses_data_salt() {
        let tx = SimpleTransaction {
            raw_txn: raw_transaction(),
            fee_payer_address: Some(AccountAddress::ONE),
        };
        let message = tx.signing_message(true).unwrap();
        assert_eq!(&message[..32], &sha3(RAW_TRANSACTION_WITH_DATA_SALT));
        // MultiAgentWithFeePayer tag follows the salt
        assert_eq!(message[32], 1);
    }

    #[test]
    fn test_unsponsored_signing_message_uses_raw_salt() {
        let tx = SimpleTransaction {
            raw_txn: raw_transaction(),
            fee_payer_address: None,
        };
        let message = tx.signing_message(false).unwrap();
        assert_eq!(&message[..32], &sha3(RAW_TRANSACTION_SALT));
        assert_eq!(&message[32..], bcs::to_bytes(&tx.raw_txn).unwrap().as_slice());
    }

    #[test]
    fn test_gas_station_signs_over_zero_fee_payer() {
        let unknown = SimpleTransaction {
            raw_txn: raw_transaction(),
            fee_payer_address: None,
        };
        let zero = SimpleTransaction {
            raw_txn: raw_transaction(),
            fee_payer_address: Some(AccountAddress::ZERO),
        };
        assert_eq!(
            unknown.signing_message(true).unwrap(),
            zero.signing_message(true).unwrap()
        );
    }

    #[test]
    fn test_local_account_from_private_key_forms() {
        let key = format!("0x{}", "11".repeat(32));
        let plain = LocalAccount::from_private_key(&key).unwrap();
        let aip80 = LocalAccount::from_private_key(&format!("ed25519-priv-{key}")).unwrap();
        assert_eq!(plain.address(), aip80.address());
        assert_eq!(
            plain.address(),
            AccountAddress::from_ed25519_public_key(&plain.public_key())
        );
    }

    #[test]
    fn test_local_account_rejects_short_key() {
        let err = LocalAccount::from_private_key("0x1234").unwrap_err();
        assert!(matches!(err, CctpError::InvalidConfig(_)));
    }

    #[test]
    fn test_ed25519_authenticator_encoding() {
        let account = LocalAccount::from_private_key(&"22".repeat(32)).unwrap();
        let auth = account.sign(b"message").to_bytes().unwrap();
        let bytes = auth.as_bytes();
        assert_eq!(bytes[0], 0);
        // uleb length 32, key, uleb length 64, signature
        assert_eq!(bytes[1], 32);
        assert_eq!(bytes[34], 64);
        assert_eq!(bytes.len(), 1 + 1 + 32 + 1 + 64);
    }

    #[test]
    fn test_abstraction_authenticator_tag() {
        let auth = AccountAuthenticator::Abstraction {
            function_info: FunctionInfo {
                module_address: AccountAddress::ONE,
                module_name: "solana_derivable_account".to_string(),
                function_name: "authenticate".to_string(),
            },
            auth_data: AbstractionAuthData::DerivableV1 {
                signing_message_digest: vec![0; 32],
                abstract_signature: vec![0; 65],
                abstract_public_key: vec![1, 2],
            },
        };
        let bytes = auth.to_bytes().unwrap();
        assert_eq!(bytes.as_bytes()[0], 5);
    }

    #[test]
    fn test_authenticator_bytes_rejects_unknown_variant() {
        assert!(AuthenticatorBytes::new(vec![9, 0]).is_err());
        assert!(AuthenticatorBytes::new(vec![]).is_err());
    }

    #[test]
    fn test_fee_payer_signed_transaction_layout() {
        let raw = raw_transaction();
        let raw_len = bcs::to_bytes(&raw).unwrap().len();
        let sender = AuthenticatorBytes::new(vec![0, 1]).unwrap();
        let fee_payer = AuthenticatorBytes::new(vec![0, 2]).unwrap();
        let signed = SignedTransaction {
            raw_txn: raw,
            authenticator: TransactionAuthenticator::FeePayer {
                sender,
                fee_payer_address: AccountAddress::ONE,
                fee_payer,
            },
        };
        let bytes = signed.to_bytes().unwrap();
        assert_eq!(bytes[raw_len], 3);
        assert_eq!(&bytes[raw_len + 1..raw_len + 3], &[0, 1]);
        assert_eq!(&bytes[raw_len + 3..raw_len + 5], &[0, 0]);
        assert_eq!(bytes.len(), raw_len + 1 + 2 + 2 + 32 + 2);
    }
}
