use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum FetchError {
    #[error("invalid entry id: {0}")]
    InvalidEntryId(String),

    #[error("invalid experimental method: {0}")]
    InvalidMethod(String),

    #[error("invalid page size: {0}")]
    InvalidPageSize(usize),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("search request failed: {0}")]
    SearchHttp(String),

    #[error("search returned status {status}: {message}")]
    SearchStatus { status: u16, message: String },

    #[error("GraphQL request failed: {0}")]
    GraphqlHttp(String),

    #[error("GraphQL returned status {status}: {message}")]
    GraphqlStatus { status: u16, message: String },

    #[error("GraphQL query reported errors: {0}")]
    GraphqlErrors(String),

    #[error("RCSB data request failed: {0}")]
    DataHttp(String),

    #[error("RCSB data returned status {status}: {message}")]
    DataStatus { status: u16, message: String },

    #[error("failed to decode response body: {0}")]
    Decode(String),

    #[error("entry has no rcsb_id")]
    MissingIdentifier,

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
