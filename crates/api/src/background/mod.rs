//! Background tasks.
//!
//! Each submodule provides an async function intended to be spawned via
//! `tokio::spawn`. Long-running loops accept a [`CancellationToken`] for
//! graceful shutdown.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod session_cleanup;
pub mod staging_cleanup;
