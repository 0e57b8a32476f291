//! # Agora Shared
//!
//! Wire types between the server and its clients: request bodies with their
//! validation rules, response bodies and the error envelope.

pub mod dto;
pub mod response;
pub mod validation;

pub use response::{ErrorResponse, FieldError, MessageResponse};
