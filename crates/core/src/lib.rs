//! Domain logic for the Reelhouse catalog that needs no database.
//!
//! Pagination math, the filter pipeline builder, audit vocabulary and the
//! shared id/error types live here so `db` and `api` agree on them.

pub mod audit;
pub mod error;
pub mod filter;
pub mod media;
pub mod pagination;
pub mod roles;
pub mod types;
