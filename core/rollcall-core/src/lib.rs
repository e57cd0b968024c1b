//! # rollcall-core
//!
//! Shared logic for the rollcall status board: who is in the room, who has
//! been rolled out, who is away and why, and whether enough people are
//! present for the current time of day.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime dependency. The daemon wraps store
//!   calls in its own blocking tasks.
//! - **Availability first**: Store failures on the client side degrade to the
//!   local cache and are logged, never surfaced as hard errors.
//! - **Structural invariants**: A [`StatusRecord`] only carries the fields of
//!   its own category.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rollcall_core::{LocalCache, MemoryStatusStore, QuorumPolicy, StorageConfig, SyncEngine};
//!
//! let storage = StorageConfig::resolve()?;
//! let mut engine = SyncEngine::new(
//!     MemoryStatusStore::new(),
//!     LocalCache::new(&storage),
//!     QuorumPolicy::default(),
//! );
//! engine.pull();
//! let board = engine.board(&chrono::Local::now());
//! ```

pub mod board;
pub mod cache;
pub mod config;
pub mod error;
pub mod quorum;
pub mod roster;
pub mod session;
pub mod storage;
pub mod store;
pub mod sync;

pub use board::{aggregate, Board, BoardEntry, Listing, QuorumStatus};
pub use cache::{LocalCache, CACHE_KEY};
pub use config::Config;
pub use error::{Result, RollcallError, StoreError};
pub use quorum::{minimum_required, QuorumPolicy};
pub use roster::Roster;
pub use session::{Draft, Session, SessionError, SessionState};
pub use storage::StorageConfig;
pub use store::{FileStatusStore, MemoryStatusStore, StatusStore};
pub use sync::{PullOutcome, SubmitOutcome, SyncEngine, DEFAULT_POLL_INTERVAL};

pub use rollcall_protocol::{Category, ClockTime, StatusMap, StatusRecord};
