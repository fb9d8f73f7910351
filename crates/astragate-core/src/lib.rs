#![forbid(unsafe_code)]

pub mod classify;
pub mod config;
pub mod errors;
pub mod operation;
pub mod phrases;
pub mod profile;
pub mod state;
pub mod traits;
pub mod types;
