//! Credit decisioning and repayment planning for the pay-later checkout
//! service.
//!
//! The heart of the crate is [`workflows::lending`]: a deterministic scoring
//! pipeline that turns a borrower's 90-day bank history into an approval
//! decision, a credit limit, and a biweekly repayment plan. Everything with a
//! side effect (history fetch, persistence, ledger notifications) sits behind
//! trait seams so the pipeline itself stays a pure function of its inputs.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
