//! `weo-report` library crate.
//!
//! Turns IMF World Economic Outlook observations into a one-sheet Excel
//! report: per-country averages plus two embedded charts.
//!
//! The binary is a thin wrapper around this library so that every stage can
//! be tested without the network, a font stack or the file system.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod reshape;
