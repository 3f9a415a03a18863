//! # Embercask
//!
//! A single-node, append-only key-value storage engine with:
//! - One active segment file as the sole source of truth
//! - An in-memory key -> offset index rebuilt by scanning at startup
//! - Single-writer/multi-reader concurrency model
//! - TCP-based client protocol with optional TLS and authentication
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │              (TLS + AUTH, Multiple Clients)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Storage Engine                             │
//! │            (Single Writer / Multi Reader)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ MemoryIndex │          │   Segment   │
//!   │  (RwLock)   │          │  (Append)   │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │ Length-     │
//!                           │ framed JSON │
//!                           └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod index;
pub mod segment;
pub mod network;
pub mod protocol;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{EmberError, Result};
pub use config::Config;
pub use engine::Engine;
pub use record::Record;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of embercask
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
