//! Strata Core - Shared leaf types for the Strata validation harness.
//!
//! This crate provides the harness-wide vocabulary: the block-size/layout
//! catalog and the opaque identifiers minted by the cluster. It performs no
//! I/O and holds no mutable state - everything here is a process-lifetime
//! constant or an immutable value type.
//!
//! # Design Principles (TigerStyle)
//!
//! - **Closed enums over string dispatch**: the layout table is matched
//!   exhaustively, so adding a block size is a compile error until every
//!   lookup handles it
//! - **Opaque tokens stay opaque**: cluster-minted identifiers are wrapped
//!   string newtypes, compared for equality and never parsed
//! - **No unsafe code**: Safety > Performance

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod layout;
mod types;

pub use layout::{block_size_for, layout_for, BlockSize, LayoutError, LayoutId};
pub use types::{NodeName, ObjectId, ProfileId, ServiceId};
