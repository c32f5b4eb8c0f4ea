//! Instruction handlers

pub mod admin;
pub mod team;
pub mod tournament;
pub mod wallet;

pub use admin::*;
pub use team::*;
pub use tournament::*;
pub use wallet::*;
