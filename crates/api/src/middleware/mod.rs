//! Request extractors and middleware.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireAuth`] -- Requires any authenticated user.
//! - [`audit::record_mutations`] -- Writes a history entry after each successful mutation.

pub mod audit;
pub mod auth;
pub mod rbac;
