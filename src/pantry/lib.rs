//! # Pantry Architecture
//!
//! Pantry keeps track of what is in the pantry: named items with a quantity
//! and an optional photo. Items live in a document collection and photos in a
//! blob store, either a Firebase project or a local directory.
//!
//! Like any small app built on a hosted backend, most of the work is CRUD:
//! the interesting parts are uploading a photo *before* writing the document
//! that points at it, and summing quantities when an item is added again.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, renders cards, handles terminal I/O    │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Controller (controller.rs) + View (view.rs)                │
//! │  - Owns the page state: items, search, add form            │
//! │  - One method per user action, full reload after mutations │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - list / add / adjust / remove / upload / search           │
//! │  - Async functions over the store traits, no view state     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Backend Layer (backend/)                                   │
//! │  - DocumentStore + BlobStore traits                         │
//! │  - Firebase (REST), local directory, in-memory fakes        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Errors
//!
//! Upload failures abort an add and are returned. Failures while writing the
//! item document during an add are logged and swallowed, matching how the
//! page has always behaved: the user sees no error and the photo may be left
//! behind. Everything else propagates as [`error::PantryError`].
//!
//! ## Testing Strategy
//!
//! 1. **Commands**: unit tests against `InMemoryDocuments` / `InMemoryBlobs`.
//! 2. **View**: reducer tests, no backend at all.
//! 3. **Controller**: action sequences against the fakes, asserting on the
//!    recorded store operations (e.g. "decrement at 1 makes no call").
//! 4. **CLI**: `tests/` runs the binary against the local backend.
//!
//! ## Module Overview
//!
//! - [`backend`]: store traits, implementations and init-once handles
//! - [`commands`]: the operations
//! - [`controller`]: the page controller
//! - [`view`]: view state, reducer and card projection
//! - [`model`]: `InventoryItem`, `ItemFields`, `PendingUpload`
//! - [`config`]: `config.json` and Firebase project settings
//! - [`error`]: error types

pub mod backend;
pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod view;
