//! taskdeck - Task tracking against a hosted backend
//!
//! This library provides the state layer behind the `td` CLI and its
//! terminal dashboard: authentication and profile state, the in-memory task
//! collection, and the filtering applied by the views.
//!
//! # Core Concepts
//!
//! - **Containers**: `SessionState` and `TaskCollection` each own one slice
//!   of application state and expose async operations that call the backend,
//!   mutate the slice, and publish notifications
//! - **Backend contract**: `AuthService`/`TaskService` traits with two
//!   interchangeable implementations, the in-memory fake and the hosted
//!   remote service
//! - **Filtering**: pure, order-preserving predicates over the collection
//! - **Theme flag**: process-wide presentation state re-applied whenever the
//!   profile loads or changes
//!
//! # Module Organization
//!
//! - `cli`: command-line interface using clap
//! - `config`: configuration loading from `config.toml`
//! - `error`: error types and result aliases
//! - `task` / `profile`: data model shared across the crate
//! - `session` / `collection`: the two state containers
//! - `store`: backend traits; `memory` and `remote` implement them
//! - `filter`: derived-view filtering
//! - `notify`: transient notification publish/subscribe
//! - `token`: persisted session token
//! - `ui`: terminal dashboard

pub mod app;
pub mod cli;
pub mod collection;
pub mod config;
pub mod error;
pub mod filter;
pub mod memory;
pub mod notify;
pub mod output;
pub mod profile;
pub mod remote;
pub mod session;
pub mod store;
pub mod task;
pub mod theme;
pub mod token;
pub mod ui;

pub use error::{Error, Result};
