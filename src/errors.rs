/*!
 * Error types for the polyscript library.
 *
 * This module contains custom error types for the different parts of the
 * library, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with translator provider APIs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The call did not finish within the configured budget
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// The provider answered but returned no text
    #[error("Provider returned an empty translation")]
    EmptyResponse,
}

/// Errors raised by the project store.
///
/// Every variant aborts the single call that produced it and leaves the
/// store unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Project names must contain at least one non-whitespace character
    #[error("Project name must not be empty")]
    EmptyProjectName,

    /// A project with that (trimmed) name already exists
    #[error("Project '{0}' already exists")]
    DuplicateProjectName(String),

    /// No project is registered under that name
    #[error("Project '{0}' does not exist")]
    UnknownProject(String),

    /// Position outside the scene order list
    #[error("Scene index {index} is out of bounds (project has {len} scenes)")]
    InvalidIndex {
        /// Requested position
        index: usize,
        /// Number of scenes in the project
        len: usize,
    },

    /// No scene carries that id in the project
    #[error("Scene {0} does not exist")]
    UnknownScene(u32),

    /// Image payload is bigger than the configured limit
    #[error("Image is {size} bytes, limit is {limit} bytes")]
    ImageTooLarge {
        /// Payload size in bytes
        size: usize,
        /// Configured limit in bytes
        limit: usize,
    },

    /// Only png/jpg/jpeg reference images are accepted
    #[error("Unsupported reference image: {0}")]
    UnsupportedImage(String),
}

/// Errors that can occur while producing the export artifact
#[derive(Error, Debug)]
pub enum ExportError {
    /// Error from the CSV writer
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error writing the artifact to disk
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
