// src/exec/mod.rs

//! Command execution layer.
//!
//! - [`backend`] defines the [`CommandExecutor`] trait: six ways to run an
//!   external command, shared by every backend and decorator.
//! - [`local`] provides [`LocalExecutor`], which spawns local processes via
//!   `tokio::process::Command`.
//! - [`translating`] provides [`TranslatingExecutor`], a drop-in decorator
//!   that rewrites commands before delegating to an inner executor.

pub mod backend;
pub mod local;
pub mod translating;

pub use backend::{CommandExecutor, ExecFuture};
pub use local::LocalExecutor;
pub use translating::{TranslatingExecutor, TranslatingExecutorBuilder};
