//! Core episode bookkeeping

pub mod time;
