//! Persistence for study progress.
//!
//! `repository` defines the `ProgressRepository` contract and an in-memory
//! adapter; `sqlite` provides the durable `sqlx` backend.

#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;
