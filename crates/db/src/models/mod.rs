//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` + `Validate` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//!
//! Wire names are camelCase.

pub mod audit;
pub mod comment;
pub mod episode;
pub mod game;
pub mod movie;
pub mod season;
pub mod show;
pub mod user;
