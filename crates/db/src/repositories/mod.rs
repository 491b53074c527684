//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods.
//! Methods that take part in multi-row transactions accept any
//! `PgExecutor`, so the same call works against the pool or an open
//! transaction.

pub mod audit_repo;
pub mod comment_repo;
pub mod episode_repo;
pub mod game_repo;
pub mod movie_repo;
pub mod season_repo;
pub mod show_repo;
pub mod user_repo;

pub use audit_repo::AuditRepo;
pub use comment_repo::CommentRepo;
pub use episode_repo::EpisodeRepo;
pub use game_repo::GameRepo;
pub use movie_repo::MovieRepo;
pub use season_repo::SeasonRepo;
pub use show_repo::ShowRepo;
pub use user_repo::UserRepo;
