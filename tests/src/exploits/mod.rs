//! # Exploit Simulations
//!
//! Attacks against the approval protocol:
//!
//! | Attack | Defense |
//! |--------|---------|
//! | Stale approval replay | `executed` flag |
//! | Cross-domain replay | Domain bound into id and message |
//! | Forwarded signature | Recovered signer must equal claimed |
//! | Malleated signature | High-S rejected |
//! | Ledger callback re-entry | Re-entrancy guard on the service |

pub mod reentrancy;
