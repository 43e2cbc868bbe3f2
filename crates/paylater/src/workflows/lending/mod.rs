//! Lending workflows: credit decisioning and repayment planning.

pub mod decisions;
