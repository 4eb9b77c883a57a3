//! Typed resources hydrated from API payloads.
//!
//! # Design
//! Every resource owns an `Arc<TodoApi>` handle to the client that produced
//! it instead of reaching a global. `ApiResource` is the uniform way to get
//! at that handle plus the identity fields every payload carries (`kind`,
//! `_self`).
//!
//! `TodoList` and `Item` wrap a generic `Entity`; unknown kinds stay a bare
//! `Entity`. `Collection` holds its members already hydrated.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::api::TodoApi;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::kind::ResourceClass;

/// Access to the owning client and the identity every resource carries.
pub trait ApiResource {
    /// The client this resource was hydrated by.
    fn api(&self) -> &Arc<TodoApi>;

    /// The payload's `kind` tag, empty if the payload had none.
    fn kind(&self) -> &str;

    /// The payload's `_self` URL.
    fn self_url(&self) -> Option<&str>;
}

/// A single addressable resource with an open property map.
#[derive(Debug, Clone)]
pub struct Entity {
    api: Arc<TodoApi>,
    kind: String,
    self_url: Option<String>,
    etag: Option<String>,
    properties: Map<String, Value>,
}

impl Entity {
    /// ETag from the response this entity was parsed from.
    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// All properties as received, `kind` and `_self` included.
    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    pub fn into_properties(self) -> Map<String, Value> {
        self.properties
    }

    pub fn build_refresh(&self) -> Result<HttpRequest, ApiError> {
        Ok(self.api.build_retrieve(self.require_self_url()?))
    }

    /// Conditional merge-patch update against the last retrieved ETag.
    pub fn build_update<T: Serialize + ?Sized>(&self, patch: &T) -> Result<HttpRequest, ApiError> {
        let url = self.require_self_url()?;
        let etag = self.etag.as_deref().ok_or(ApiError::MissingEtag)?;
        self.api.build_update(url, etag, patch)
    }

    pub fn build_delete(&self) -> Result<HttpRequest, ApiError> {
        Ok(self.api.build_delete(self.require_self_url()?))
    }

    fn require_self_url(&self) -> Result<&str, ApiError> {
        self.self_url.as_deref().ok_or(ApiError::MissingSelfUrl)
    }

    fn str_property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(Value::as_str)
    }
}

impl ApiResource for Entity {
    fn api(&self) -> &Arc<TodoApi> {
        &self.api
    }

    fn kind(&self) -> &str {
        &self.kind
    }

    fn self_url(&self) -> Option<&str> {
        self.self_url.as_deref()
    }
}

/// The root resource served at `/to-dos`.
#[derive(Debug, Clone)]
pub struct TodoList(Entity);

impl TodoList {
    pub fn entity(&self) -> &Entity {
        &self.0
    }

    /// URL of the collection holding this list's items.
    pub fn items_url(&self) -> Option<&str> {
        self.0.str_property("items")
    }

    pub fn build_retrieve_items(&self) -> Result<HttpRequest, ApiError> {
        let url = self.items_url().ok_or(ApiError::MissingProperty("items"))?;
        Ok(self.0.api.build_retrieve(url))
    }
}

/// One to-do entry.
#[derive(Debug, Clone)]
pub struct Item(Entity);

impl Item {
    pub fn entity(&self) -> &Entity {
        &self.0
    }

    pub fn description(&self) -> Option<&str> {
        self.0.str_property("description")
    }

    pub fn due(&self) -> Option<&str> {
        self.0.str_property("due")
    }
}

macro_rules! delegate_api_resource {
    ($ty:ty) => {
        impl ApiResource for $ty {
            fn api(&self) -> &Arc<TodoApi> {
                self.0.api()
            }

            fn kind(&self) -> &str {
                self.0.kind()
            }

            fn self_url(&self) -> Option<&str> {
                self.0.self_url()
            }
        }
    };
}

delegate_api_resource!(TodoList);
delegate_api_resource!(Item);

/// A listing resource. Members are hydrated with the same kind rules as
/// top-level payloads.
#[derive(Debug, Clone)]
pub struct Collection {
    api: Arc<TodoApi>,
    kind: String,
    self_url: Option<String>,
    etag: Option<String>,
    members: Vec<Resource>,
    properties: Map<String, Value>,
}

impl Collection {
    pub fn members(&self) -> &[Resource] {
        &self.members
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Payload properties other than the `items` member array.
    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    pub fn into_members(self) -> Vec<Resource> {
        self.members
    }

    pub fn build_refresh(&self) -> Result<HttpRequest, ApiError> {
        let url = self.self_url.as_deref().ok_or(ApiError::MissingSelfUrl)?;
        Ok(self.api.build_retrieve(url))
    }

    /// POST a new member into this collection.
    pub fn build_create_member<T: Serialize + ?Sized>(&self, body: &T) -> Result<HttpRequest, ApiError> {
        let url = self.self_url.as_deref().ok_or(ApiError::MissingSelfUrl)?;
        self.api.build_create(url, body)
    }
}

impl ApiResource for Collection {
    fn api(&self) -> &Arc<TodoApi> {
        &self.api
    }

    fn kind(&self) -> &str {
        &self.kind
    }

    fn self_url(&self) -> Option<&str> {
        self.self_url.as_deref()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Resource;
    type IntoIter = std::slice::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

/// Any hydrated payload.
#[derive(Debug, Clone)]
pub enum Resource {
    TodoList(TodoList),
    Item(Item),
    Collection(Collection),
    Entity(Entity),
}

impl Resource {
    pub fn class(&self) -> ResourceClass {
        match self {
            Resource::TodoList(_) => ResourceClass::TodoList,
            Resource::Item(_) => ResourceClass::Item,
            Resource::Collection(_) => ResourceClass::Collection,
            Resource::Entity(_) => ResourceClass::Entity,
        }
    }

    pub fn as_todo_list(&self) -> Option<&TodoList> {
        match self {
            Resource::TodoList(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Resource::Item(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Resource::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    /// The underlying entity, for every variant except `Collection`.
    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Resource::TodoList(list) => Some(list.entity()),
            Resource::Item(item) => Some(item.entity()),
            Resource::Entity(entity) => Some(entity),
            Resource::Collection(_) => None,
        }
    }

    fn as_api_resource(&self) -> &dyn ApiResource {
        match self {
            Resource::TodoList(list) => list,
            Resource::Item(item) => item,
            Resource::Collection(collection) => collection,
            Resource::Entity(entity) => entity,
        }
    }
}

impl ApiResource for Resource {
    fn api(&self) -> &Arc<TodoApi> {
        self.as_api_resource().api()
    }

    fn kind(&self) -> &str {
        self.as_api_resource().kind()
    }

    fn self_url(&self) -> Option<&str> {
        self.as_api_resource().self_url()
    }
}

pub(crate) fn hydrate(
    api: Arc<TodoApi>,
    mut properties: Map<String, Value>,
    etag: Option<String>,
) -> Result<Resource, ApiError> {
    let kind = properties
        .get("kind")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let self_url = properties
        .get("_self")
        .and_then(Value::as_str)
        .map(str::to_string);
    let class = api.resource_class(&kind);
    debug!(kind = %kind, class = %class, "hydrating resource");

    if class.is_collection() {
        let members = match properties.remove("items") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(values)) => values
                .into_iter()
                .map(|value| match value {
                    Value::Object(member) => hydrate(Arc::clone(&api), member, None),
                    _ => Err(ApiError::DeserializationError(
                        "collection member is not a JSON object".to_string(),
                    )),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(ApiError::DeserializationError(
                    "collection items is not an array".to_string(),
                ))
            }
        };
        return Ok(Resource::Collection(Collection {
            api,
            kind,
            self_url,
            etag,
            members,
            properties,
        }));
    }

    let entity = Entity {
        api,
        kind,
        self_url,
        etag,
        properties,
    };
    Ok(match class {
        ResourceClass::TodoList => Resource::TodoList(TodoList(entity)),
        ResourceClass::Item => Resource::Item(Item(entity)),
        ResourceClass::Collection | ResourceClass::Entity => Resource::Entity(entity),
    })
}
