#![forbid(unsafe_code)]
//! Metagen: repository implementation generator
//!
//! Metagen reads an entity model and a set of annotated repository declarations, checks every repository method
//! against the model, and generates a Java class implementing each repository. This crate provides the
//! frontend (method analysis, query validation, diagnostics), the backend (member synthesis and class rendering),
//! the round driver, and the command-line interface.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `backend` modules
//!   enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **User input**: A malformed declaration is never a panic. It becomes a diagnostic, and the method it belongs to
//!   is not generated.
//!
//! - **True invariants**: A broken internal invariant is an `EngineError`, which abandons the repository it occurred
//!   in.

pub mod backend;
pub mod cli;
pub mod config;
pub mod driver;
pub mod frontend;
pub mod model;

pub use frontend::analysis;
pub use frontend::diagnostics;
pub use frontend::query;

pub use backend::Metamodel;
pub use config::GeneratorConfig;
pub use driver::Driver;
