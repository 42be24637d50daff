//! Storage and service layer for the booktrack reading tracker.
//!
//! One physical table holds three entity types (books, notes, reading
//! events) per owner partition; the [`storage`] module provides the key
//! codec, the entity mapper, two interchangeable backends and the composed
//! repository. The [`service`] module layers entity lifecycle on top and is
//! the surface the request-handling layer consumes.

pub mod config;
pub mod service;
pub mod storage;
