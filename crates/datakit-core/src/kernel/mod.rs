//! # Datakit Kernel
//!
//! Crate-wide plumbing shared by every subsystem.
//!
//! - **Core Constants**: Provides system-wide constants via the `constants` submodule.
//! - **Error Handling**: Defines the aggregate [`Error`](error::Error) type, a
//!   `Result` alias and [`BoxError`](error::BoxError) in the `error` submodule.
pub mod constants;
pub mod error;

pub use error::{BoxError, Error, Result};
