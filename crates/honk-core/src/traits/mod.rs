//! Ports to the external collaborators

mod field_store;

pub use field_store::{FieldStore, IdentityProvider, StoreResult};
