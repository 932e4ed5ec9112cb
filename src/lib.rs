pub mod commands;
pub mod config;
pub mod discovery;
pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod process;
pub mod runner;
pub mod validation;
pub mod warnings;
