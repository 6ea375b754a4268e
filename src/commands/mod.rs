// src/commands/mod.rs
//! Command handlers for the tfstate-transfer CLI

mod transfer;

pub use transfer::cmd_transfer;
