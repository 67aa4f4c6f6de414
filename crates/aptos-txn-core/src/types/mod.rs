//! Core protocol types: account addresses, chain identifiers, and module
//! or type references.

mod address;
mod chain_id;
mod module_id;

pub use address::{AccountAddress, ADDRESS_LENGTH};
pub use chain_id::ChainId;
pub use module_id::{Identifier, ModuleId, StructTag, TypeTag};
