//! The voting core: eligibility checks, ballot assembly, and the vote
//! ledger.

pub mod assembler;
pub mod ledger;
