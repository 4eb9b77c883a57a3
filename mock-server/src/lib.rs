use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use uuid::Uuid;

pub const TODO_LIST_PATH: &str = "/to-dos";
pub const ITEMS_PATH: &str = "/to-dos/items";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TodoList {
    #[serde(rename = "_self")]
    pub self_url: String,
    pub kind: String,
    pub items: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "_self")]
    pub self_url: String,
    pub kind: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemCollection {
    #[serde(rename = "_self")]
    pub self_url: String,
    pub kind: String,
    pub items: Vec<Item>,
}

#[derive(Deserialize)]
pub struct CreateItem {
    #[serde(default)]
    pub kind: Option<String>,
    pub description: String,
    #[serde(default)]
    pub due: Option<String>,
}

/// JSON merge patch for an item. Outer `None` means the field was absent;
/// `Some(None)` means it was sent as `null`.
#[derive(Deserialize)]
pub struct ItemPatch {
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub due: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

struct StoredItem {
    item: Item,
    version: u64,
}

impl StoredItem {
    fn etag(&self) -> String {
        format!("\"{}\"", self.version)
    }
}

type Db = Arc<RwLock<HashMap<Uuid, StoredItem>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route(TODO_LIST_PATH, get(get_todo_list))
        .route(ITEMS_PATH, get(list_items).post(create_item))
        .route("/items/{id}", get(get_item).patch(update_item).delete(delete_item))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    info!(addr = ?listener.local_addr()?, "to-do mock server listening");
    axum::serve(listener, app()).await
}

fn item_url(id: Uuid) -> String {
    format!("/items/{id}")
}

async fn get_todo_list() -> Json<TodoList> {
    Json(TodoList {
        self_url: TODO_LIST_PATH.to_string(),
        kind: "TodoList".to_string(),
        items: ITEMS_PATH.to_string(),
    })
}

async fn list_items(State(db): State<Db>) -> Json<ItemCollection> {
    let items = db.read().await;
    let mut items: Vec<Item> = items.values().map(|stored| stored.item.clone()).collect();
    items.sort_by(|a, b| a.self_url.cmp(&b.self_url));
    Json(ItemCollection {
        self_url: ITEMS_PATH.to_string(),
        kind: "Collection".to_string(),
        items,
    })
}

async fn create_item(
    State(db): State<Db>,
    Json(input): Json<CreateItem>,
) -> Result<(StatusCode, [(header::HeaderName, String); 2], Json<Item>), StatusCode> {
    if input.kind.as_deref().is_some_and(|kind| kind != "Item") {
        return Err(StatusCode::BAD_REQUEST);
    }
    let id = Uuid::new_v4();
    let stored = StoredItem {
        item: Item {
            self_url: item_url(id),
            kind: "Item".to_string(),
            description: input.description,
            due: input.due,
        },
        version: 1,
    };
    let headers = [
        (header::LOCATION, stored.item.self_url.clone()),
        (header::ETAG, stored.etag()),
    ];
    let item = stored.item.clone();
    db.write().await.insert(id, stored);
    debug!(%id, "created item");
    Ok((StatusCode::CREATED, headers, Json(item)))
}

async fn get_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<([(header::HeaderName, String); 1], Json<Item>), StatusCode> {
    let items = db.read().await;
    let stored = items.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(([(header::ETAG, stored.etag())], Json(stored.item.clone())))
}

async fn update_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(patch): Json<ItemPatch>,
) -> Result<([(header::HeaderName, String); 1], Json<Item>), StatusCode> {
    let mut items = db.write().await;
    let stored = items.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    let if_match = headers
        .get(header::IF_MATCH)
        .and_then(|value| value.to_str().ok())
        .ok_or(StatusCode::PRECONDITION_REQUIRED)?;
    if if_match != stored.etag() {
        return Err(StatusCode::PRECONDITION_FAILED);
    }
    match patch.description {
        Some(None) => return Err(StatusCode::UNPROCESSABLE_ENTITY),
        Some(Some(description)) => stored.item.description = description,
        None => {}
    }
    if let Some(due) = patch.due {
        stored.item.due = due;
    }
    stored.version += 1;
    debug!(%id, version = stored.version, "updated item");
    Ok(([(header::ETAG, stored.etag())], Json(stored.item.clone())))
}

async fn delete_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Item>, StatusCode> {
    let mut items = db.write().await;
    items
        .remove(&id)
        .map(|stored| Json(stored.item))
        .ok_or(StatusCode::NOT_FOUND)
}
