//! Peripheral adapters: thin clients over local stream sockets, one task
//! each, talking to the core only through its contracts.

pub mod network;
pub mod position;
pub mod ship;
