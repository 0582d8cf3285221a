//! # pullcast: demand-driven publish/subscribe streams
//!
//! A subscriber explicitly requests a bounded number of items, a publisher
//! emits only up to the outstanding demand, and either side may cancel at any
//! time without leaking resources or racing on shared state. One upstream run
//! can be shared by many late-joining subscribers through a bounded replay
//! buffer.
//!
//! ## Quick start
//!
//! ```rust
//! use pullcast::prelude::*;
//!
//! from_iter(1..=5)
//!   .map(|v| v * 2)
//!   .sink(Demand::Max(2), |v| {
//!     println!("got {v}");
//!     Demand::Max(1) // grant one more item per item received
//!   });
//! ```
//!
//! ## Key concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`Publisher`] | Factory producing one subscription per subscriber |
//! | [`Subscriber`] | Consumes items and grants demand |
//! | [`Subscription`] | Per-link handle: `request` / `cancel` |
//! | [`Demand`] | Saturating counter of items the subscriber will accept |
//! | [`Replay`] | Shared upstream run with bounded history for late joiners |
//! | [`Orchestrator`] | Producer-supplied start/stop pair for one subscription |
//!
//! Producers may emit from any thread; per-subscription state is serialized
//! behind one mutual-exclusion domain, and once `cancel()` returns the
//! subscriber is never called again.

pub mod demand;
pub mod gate;
pub mod ops;
pub mod pool;
pub mod prelude;
pub mod publisher;
pub mod replay;
pub mod subscriber;
pub mod subscription;
pub mod sync_cell;

pub use prelude::*;
