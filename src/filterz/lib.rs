//! # Filterz Architecture
//!
//! Filterz is a **UI-agnostic state model for boolean filter trees**: nested AND/OR
//! groups of comparisons built against a user supplied schema, serialized to and
//! from a JSON Logic document. It is a library that happens to have a CLI client,
//! and nothing here evaluates filters against data.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, renders the tree, handles terminal I/O │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, persists after each mutation  │
//! │  - Checks user input against the schema                     │
//! │  - Returns structured Result types                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - The mutation operations, export and import               │
//! │  - Missing targets are no-ops, never errors                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Model & Storage (model.rs, store/, tree.rs, logic.rs)      │
//! │  - FilterStore: copy-on-write collections, id counters      │
//! │  - StateStore trait: FileStore, InMemoryStore               │
//! │  - JSON Logic serializer / deserializer                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Tree
//!
//! Filters live in one flat list and point at their group through `group_id`.
//! Groups list their children as [`model::ItemRef`]s, so the tree is a graph of
//! ids rather than owned nodes. The root group always exists. Because ids can be
//! wired into a loop by hand (or by a crafted state file), every walk in
//! [`tree`] and [`logic`] carries a visited set.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes regular Rust arguments, returns regular Rust
//! types and never writes to stdout/stderr. Diagnostics go through `tracing`;
//! installing a subscriber is the client's business.
//!
//! ## Testing Strategy
//!
//! 1. **Commands** (`commands/*.rs`): unit tests over a [`store::FilterStore`]
//!    built with the fixtures in `store::memory`.
//! 2. **Serializer** (`logic.rs`): shape tests of the produced document and of
//!    what the reader accepts or drops.
//! 3. **API** (`api.rs`): dispatch, schema checks and persistence against
//!    `InMemoryStore`.
//! 4. **CLI** (`tests/`): end-to-end runs of the binary in a temp directory.
//!
//! ## Module Overview
//!
//! - [`api`]: The facade a UI talks to
//! - [`commands`]: One module per operation
//! - [`logic`]: JSON Logic conversion
//! - [`model`]: Filters, groups, schema, connectors
//! - [`store`]: In-memory state and its persistence
//! - [`tree`]: Cycle-safe traversals
//! - [`config`]: `config.json` handling
//! - [`clipboard`]: Platform clipboard transfer
//! - [`error`]: Error types

pub mod api;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod store;
pub mod tree;
