//! # Quill Shared
//!
//! Request payloads, view-models, and response envelopes exchanged between
//! the API server and its clients.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse, FieldError};
