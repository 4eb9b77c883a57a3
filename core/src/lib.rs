//! Client SDK for the to-do list API.
//!
//! # Overview
//! The API declares one well-known URL, `/to-dos`, and tags every payload
//! with a `kind`. This crate resolves those kinds to typed resources
//! (`TodoList`, `Item`, `Collection`, or a generic `Entity` for anything
//! else) and builds/parses the HTTP exchanges around them without touching
//! the network (host-does-IO pattern).
//!
//! # Design
//! - `TodoApi` is created once from `ApiConfig` and shared as `Arc<TodoApi>`.
//!   Resources hold that `Arc` and expose it through `ApiResource::api`.
//! - Kind resolution is a data-driven `KindRegistry`; unknown kinds fall
//!   back to `Entity` and are never an error.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//!
//! ```
//! use todo_sdk::{ApiResource, HttpResponse, ResourceClass, TodoApi};
//!
//! let api = std::sync::Arc::new(TodoApi::new("http://localhost:3000"));
//! let request = api.build_retrieve_well_known("/to-dos").unwrap();
//! assert_eq!(request.url, "http://localhost:3000/to-dos");
//!
//! let response = HttpResponse {
//!     status: 200,
//!     headers: Vec::new(),
//!     body: r#"{"_self":"/to-dos","kind":"TodoList","items":"/to-dos/items"}"#.to_string(),
//! };
//! let list = api.parse_retrieve(response).unwrap();
//! assert_eq!(list.class(), ResourceClass::TodoList);
//! assert!(std::sync::Arc::ptr_eq(list.api(), &api));
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod kind;
pub mod resource;

pub use api::{TodoApi, WELL_KNOWN_URLS};
pub use config::ApiConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use kind::{KindRegistry, ResourceClass};
pub use resource::{ApiResource, Collection, Entity, Item, Resource, TodoList};
