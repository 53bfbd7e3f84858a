//! # Quill Shared
//!
//! Wire types shared by the server and its clients.
//! Kept free of server dependencies so a client can depend on it directly.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse, PageMeta, PaginatedResponse};
