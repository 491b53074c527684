//! Background tasks.
//!
//! Each submodule exposes a long-running `run` function meant for
//! `tokio::spawn`, stopped through a [`tokio_util::sync::CancellationToken`].

pub mod audit_retention;
