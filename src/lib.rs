//! A personal contact book
//!
//! Contacts map a name to an email address. They live in a single JSON file, see [`store`] for
//! how it is read and written, and are managed from the command line ([`commands`]) or an
//! interactive terminal browser ([`browse`]).

pub mod args;
pub mod browse;
pub mod commands;
pub mod config;
pub mod error;
pub mod json;
pub mod logging;
pub mod store;
pub mod vcard;

pub use {
    error::{ContactError, StorageError},
    store::{ContactStore, Query},
};
