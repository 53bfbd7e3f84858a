//! Application services - the business rules on top of the ports.
//!
//! Services hold only `Arc`s to their ports and are shared between requests.

mod comment;
mod post;
mod tag;
mod user;

pub use comment::CommentService;
pub use post::PostService;
pub use tag::TagService;
pub use user::UserService;

use crate::error::{DomainError, RepoError};

/// Reject empty or whitespace-only input for a required text field.
fn require_non_blank(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Map a store delete failure, turning "nothing deleted" into `NotFound`.
fn delete_error(err: RepoError, entity_type: &'static str, id: i64) -> DomainError {
    match err {
        RepoError::NotFound => DomainError::not_found(entity_type, id),
        other => other.into(),
    }
}
