//! Storage adapters for the invoicing system.
//!
//! Two implementations of [`domain::InvoiceStorage`]:
//! - [`MemoryStorage`]: a process-local map behind one reader/writer lock
//! - [`RemoteStorage`]: a keyed store without uniqueness constraints, where
//!   create-uniqueness and update-existence are enforced by conditional writes

pub mod memory;
pub mod remote;

pub use memory::MemoryStorage;
pub use remote::{
    Attributes, ClientError, Condition, ConditionExpression, ConditionalStore, InMemoryTable,
    InvoiceRecord, ItemRecord, PostgresTable, PutItem, RemoteConfig, RemoteStorage,
    invoice_partition_key,
};
