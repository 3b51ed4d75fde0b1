pub mod api;
pub mod memory;
pub mod query;
pub mod subscription;

pub use api::{Document, Fields, RealtimeStore, StoreError, TIMESTAMP_FIELD, to_fields};
pub use memory::MemoryStore;
pub use query::{Direction, FieldFilter, MembershipOp, Query};
pub use subscription::{Snapshot, Subscription};
