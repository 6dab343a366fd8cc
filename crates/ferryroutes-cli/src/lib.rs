//! Ferry routes CLI library.
//!
//! Command handlers, output rendering, and terminal helpers used by the
//! `ferryroutes-cli` binary.

pub mod commands;
pub mod output;
pub mod terminal;
