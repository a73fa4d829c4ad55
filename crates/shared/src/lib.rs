//! Domain, wire and failure types shared by the directory client crates.

pub mod domain;
pub mod error;
pub mod protocol;
