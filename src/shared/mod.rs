//! Shared modules used by the library and the command line tool

pub mod clients;
pub mod config;
