//! # Domain Module
//!
//! Core domain types for the Multi-Signer Authority.

pub mod entities;
pub mod errors;
pub mod events;
pub mod invariants;
pub mod policy_state;
pub mod registry;
pub mod signer_set;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use events::*;
pub use invariants::*;
pub use policy_state::*;
pub use registry::OperationRegistry;
pub use signer_set::SignerSet;
pub use value_objects::*;
