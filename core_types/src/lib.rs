//! # Core Types
//!
//! Identifiers shared by the file-access and document persistence crates.
//!
//! ## Philosophy
//!
//! - **Explicit over implicit**: handles and streams carry their own identity,
//!   so two acquisitions of the same file are never confused.
//! - **Opaque**: identifiers say nothing about paths or host internals.
//!
//! ## Key Types
//!
//! - [`HandleId`]: identity of one acquired file handle
//! - [`StreamId`]: identity of one staged write stream

pub mod ids;
mod uuid_tools;

pub use ids::{HandleId, StreamId};
pub use uuid_tools::new_uuid;
