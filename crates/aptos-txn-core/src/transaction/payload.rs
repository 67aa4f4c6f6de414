//! Transaction payloads.

use crate::bcs::{self, BcsDeserialize, BcsSerialize, Deserializer, Serializer};
use crate::error::{BcsError, CoreResult};
use crate::types::{AccountAddress, Identifier, ModuleId, TypeTag};
use crate::values::MoveValue;

/// The payload of a transaction, specifying what action to take.
///
/// Wire variant indices: `Script` = 0, `EntryFunction` = 2, `Multisig` = 3.
/// Index 1 belongs to the retired module-bundle form and is rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionPayload {
    /// Execute a script with inline bytecode.
    Script(Script),
    /// Call an entry function on a module.
    EntryFunction(EntryFunction),
    /// Execute a payload through an on-chain multisig account.
    Multisig(Multisig),
}

impl BcsSerialize for TransactionPayload {
    fn serialize(&self, serializer: &mut Serializer) {
        match self {
            Self::Script(script) => {
                serializer.serialize_variant_index(0);
                script.serialize(serializer);
            }
            Self::EntryFunction(entry_function) => {
                serializer.serialize_variant_index(2);
                entry_function.serialize(serializer);
            }
            Self::Multisig(multisig) => {
                serializer.serialize_variant_index(3);
                multisig.serialize(serializer);
            }
        }
    }
}

impl BcsDeserialize for TransactionPayload {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        match deserializer.deserialize_variant_index()? {
            0 => Ok(Self::Script(Script::deserialize(deserializer)?)),
            2 => Ok(Self::EntryFunction(EntryFunction::deserialize(
                deserializer,
            )?)),
            3 => Ok(Self::Multisig(Multisig::deserialize(deserializer)?)),
            index => Err(BcsError::VariantIndexOutOfRange {
                type_name: "TransactionPayload",
                index,
            }),
        }
    }
}

/// A script payload with inline bytecode.
///
/// Arguments are already-canonical encoded bytes; the payload owns copies
/// and never re-encodes them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Script {
    /// The Move bytecode to execute.
    pub code: Vec<u8>,
    /// Type arguments for the script.
    pub type_args: Vec<TypeTag>,
    /// Canonically encoded arguments.
    pub args: Vec<Vec<u8>>,
}

impl Script {
    /// Creates a new script payload.
    pub fn new(code: Vec<u8>, type_args: Vec<TypeTag>, args: Vec<Vec<u8>>) -> Self {
        Self {
            code,
            type_args,
            args,
        }
    }
}

impl BcsSerialize for Script {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.serialize_bytes(&self.code);
        self.type_args.serialize(serializer);
        self.args.serialize(serializer);
    }
}

impl BcsDeserialize for Script {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        Ok(Self {
            code: deserializer.deserialize_bytes()?.to_vec(),
            type_args: Vec::<TypeTag>::deserialize(deserializer)?,
            args: Vec::<Vec<u8>>::deserialize(deserializer)?,
        })
    }
}

/// An entry function call payload.
///
/// Entry functions are the most common payload: a call to a function
/// marked `entry` in a Move module, with each argument encoded to its
/// canonical bytes before being placed in the argument list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryFunction {
    /// The module containing the function.
    pub module: ModuleId,
    /// The function name.
    pub function: Identifier,
    /// Type arguments for generic functions.
    pub type_args: Vec<TypeTag>,
    /// Canonically encoded arguments.
    pub args: Vec<Vec<u8>>,
}

impl EntryFunction {
    /// Creates a new entry function payload from pre-encoded arguments.
    pub fn new(
        module: ModuleId,
        function: Identifier,
        type_args: Vec<TypeTag>,
        args: Vec<Vec<u8>>,
    ) -> Self {
        Self {
            module,
            function,
            type_args,
            args,
        }
    }

    /// Creates an entry function payload by encoding typed values.
    ///
    /// Each value is encoded independently; the resulting bytes are owned
    /// by the payload and reusable from a multisig wrapper unchanged.
    pub fn from_values(
        module: ModuleId,
        function: Identifier,
        type_args: Vec<TypeTag>,
        args: &[MoveValue],
    ) -> Self {
        let args = args.iter().map(MoveValue::encode).collect();
        Self {
            module,
            function,
            type_args,
            args,
        }
    }

    /// Creates a simple APT transfer payload.
    ///
    /// Amounts are in octas (1 APT = 10^8 octas).
    ///
    /// # Errors
    ///
    /// Fails only if the fixed identifiers are rejected, which indicates
    /// a bug rather than bad caller input.
    pub fn apt_transfer(recipient: AccountAddress, amount: u64) -> CoreResult<Self> {
        let module = ModuleId::new(AccountAddress::ONE, Identifier::new("aptos_account")?);
        Ok(Self::from_values(
            module,
            Identifier::new("transfer")?,
            vec![],
            &[MoveValue::Address(recipient), MoveValue::U64(amount)],
        ))
    }

    /// Creates a coin transfer payload for any coin type.
    ///
    /// # Errors
    ///
    /// Fails only if the fixed identifiers are rejected.
    pub fn coin_transfer(
        coin_type: TypeTag,
        recipient: AccountAddress,
        amount: u64,
    ) -> CoreResult<Self> {
        let module = ModuleId::new(AccountAddress::ONE, Identifier::new("coin")?);
        Ok(Self::from_values(
            module,
            Identifier::new("transfer")?,
            vec![coin_type],
            &[MoveValue::Address(recipient), MoveValue::U64(amount)],
        ))
    }
}

impl BcsSerialize for EntryFunction {
    fn serialize(&self, serializer: &mut Serializer) {
        self.module.serialize(serializer);
        self.function.serialize(serializer);
        self.type_args.serialize(serializer);
        self.args.serialize(serializer);
    }
}

impl BcsDeserialize for EntryFunction {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        Ok(Self {
            module: ModuleId::deserialize(deserializer)?,
            function: Identifier::deserialize(deserializer)?,
            type_args: Vec::<TypeTag>::deserialize(deserializer)?,
            args: Vec::<Vec<u8>>::deserialize(deserializer)?,
        })
    }
}

/// A payload routed through an on-chain multisig account.
///
/// The inner payload is optional: absent, the transaction executes the
/// multisig account's next queued payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Multisig {
    /// The multisig account to execute through.
    pub multisig_address: AccountAddress,
    /// The inner entry-function payload, if supplied inline.
    pub transaction_payload: Option<MultisigTransactionPayload>,
}

impl Multisig {
    /// Creates a multisig payload executing the given inner call.
    pub fn new(multisig_address: AccountAddress, inner: EntryFunction) -> Self {
        Self {
            multisig_address,
            transaction_payload: Some(MultisigTransactionPayload::EntryFunction(inner)),
        }
    }

    /// Creates a multisig payload executing the account's queued payload.
    pub fn queued(multisig_address: AccountAddress) -> Self {
        Self {
            multisig_address,
            transaction_payload: None,
        }
    }
}

impl BcsSerialize for Multisig {
    fn serialize(&self, serializer: &mut Serializer) {
        self.multisig_address.serialize(serializer);
        self.transaction_payload.serialize(serializer);
    }
}

impl BcsDeserialize for Multisig {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        Ok(Self {
            multisig_address: AccountAddress::deserialize(deserializer)?,
            transaction_payload: Option::<MultisigTransactionPayload>::deserialize(deserializer)?,
        })
    }
}

/// The inner payload of a multisig execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MultisigTransactionPayload {
    /// An entry function call.
    EntryFunction(EntryFunction),
}

impl BcsSerialize for MultisigTransactionPayload {
    fn serialize(&self, serializer: &mut Serializer) {
        match self {
            Self::EntryFunction(entry_function) => {
                serializer.serialize_variant_index(0);
                entry_function.serialize(serializer);
            }
        }
    }
}

impl BcsDeserialize for MultisigTransactionPayload {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        match deserializer.deserialize_variant_index()? {
            0 => Ok(Self::EntryFunction(EntryFunction::deserialize(
                deserializer,
            )?)),
            index => Err(BcsError::VariantIndexOutOfRange {
                type_name: "MultisigTransactionPayload",
                index,
            }),
        }
    }
}

impl From<EntryFunction> for TransactionPayload {
    fn from(entry_function: EntryFunction) -> Self {
        TransactionPayload::EntryFunction(entry_function)
    }
}

impl From<Script> for TransactionPayload {
    fn from(script: Script) -> Self {
        TransactionPayload::Script(script)
    }
}

impl From<Multisig> for TransactionPayload {
    fn from(multisig: Multisig) -> Self {
        TransactionPayload::Multisig(multisig)
    }
}
