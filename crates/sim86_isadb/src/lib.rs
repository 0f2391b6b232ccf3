//! An embedded table of every 8086 encoding the sim86 decoder accepts, one record per opcode
//! byte and secondary opcode.

pub mod db;
pub mod error;
pub mod record;

pub use db::{IsaDB, IterFilter, ISA8086};
pub use error::IsaDbError;
pub use record::IsaRecord;
