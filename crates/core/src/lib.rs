//! Core balance-sheet logic for Bilan.
//!
//! This crate turns a project's ledger rows into a two-branch balance sheet
//! (ACTIF / PASSIF) with bottom-up totals. It has no web dependencies.
//!
//! # Modules
//!
//! - `ledger` - Ledger rows and file decoding
//! - `statement` - Classification, rollup, rendering and export
//! - `source` - Loading a project's ledger from storage or the files API

pub mod ledger;
pub mod source;
pub mod statement;
