//! Error types for the to-do SDK.
//!
//! # Design
//! `NotFound` and `PreconditionFailed` get dedicated variants because
//! callers routinely branch on "the resource is gone" and "someone else
//! changed it first". All other unexpected statuses land in `HttpError`
//! with the raw status code and body for debugging.
//!
//! An unrecognized resource kind is not an error: it hydrates as a generic
//! `Entity`.

use thiserror::Error;

/// Errors returned by the SDK's build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned 412: the `If-Match` ETag is stale.
    #[error("precondition failed: resource changed since it was retrieved")]
    PreconditionFailed,

    /// The server returned an unexpected status other than 404 or 412.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be read as a resource.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The path is not one of the API's declared well-known URLs.
    #[error("{0} is not a well-known URL of this API")]
    UnknownWellKnownUrl(String),

    /// The resource carries no `_self` URL to address it by.
    #[error("resource has no _self URL")]
    MissingSelfUrl,

    /// A relationship property the operation follows is absent.
    #[error("resource has no {0} property")]
    MissingProperty(&'static str),

    /// An update needs the ETag of the last retrieval.
    #[error("resource has no ETag; retrieve it before updating")]
    MissingEtag,

    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),
}
