//! # Quill Core
//!
//! The domain layer of the Quill blog backend.
//! Entities, ports and the services that enforce ownership, tag association
//! and comment threading rules. Storage and crypto live behind the ports.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
pub use services::{CommentService, PostService, TagService, UserService};
