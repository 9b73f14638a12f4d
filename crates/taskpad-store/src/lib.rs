//! # taskpad-store
//!
//! `SQLite`-backed task store for the Taskpad to-do core.
//!
//! Responsibilities:
//!
//! - **Connection pool**: `rusqlite` behind `r2d2`, WAL mode and pragmas
//!   applied per connection
//! - **Migrations**: idempotent DDL for the `tasks` table
//! - **Repository**: stateless SQL CRUD plus filtered/ordered listing
//! - **Live queries**: [`TaskStore::watch`] re-emits a query result whenever
//!   the underlying data changes
//! - **Demo seed**: the stock task set inserted into an empty database
//!
//! ## Crate Position
//!
//! Storage collaborator. Consumed by `taskpad-app`; depends only on
//! `taskpad-core`.

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod migrations;
pub mod repository;
pub mod store;

pub use connection::{ConnectionConfig, ConnectionPool, PooledConnection};
pub use errors::{Result, StoreError};
pub use migrations::run_migrations;
pub use repository::TaskRepository;
pub use store::{TaskStore, TaskWatch};
