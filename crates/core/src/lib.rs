//! Core types and storage contracts for the booktrack project.
//!
//! This crate is pure: domain records, the storage backend trait, and the
//! repository error taxonomy. Concrete backends live in the `booktrack`
//! crate.

pub mod book;
pub mod storage;
