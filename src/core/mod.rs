pub mod content_service;
pub mod normalizer;
pub mod token_manager;
pub mod upstream;

pub use crate::domain::model::{ContentFormat, ContentRequest, ContentResult, Credential};
pub use crate::domain::ports::{ContentSource, TokenIssuer, TokenProvider};
pub use crate::utils::error::Result;
