use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Item, ItemCollection, TodoList};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn patch_request(uri: &str, etag: Option<&str>, body: &str) -> Request<String> {
    let mut builder = Request::builder()
        .method("PATCH")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/merge-patch+json");
    if let Some(etag) = etag {
        builder = builder.header(http::header::IF_MATCH, etag);
    }
    builder.body(body.to_string()).unwrap()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn etag_of(response: &axum::response::Response) -> String {
    response.headers()[http::header::ETAG].to_str().unwrap().to_string()
}

const MISSING_ITEM: &str = "/items/00000000-0000-0000-0000-000000000000";

// --- well-known ---

#[tokio::test]
async fn todo_list_links_to_items() {
    let resp = app().oneshot(get_request("/to-dos")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let list: TodoList = body_json(resp).await;
    assert_eq!(list.kind, "TodoList");
    assert_eq!(list.self_url, "/to-dos");
    assert_eq!(list.items, "/to-dos/items");
}

// --- list ---

#[tokio::test]
async fn list_items_empty() {
    let resp = app().oneshot(get_request("/to-dos/items")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let collection: ItemCollection = body_json(resp).await;
    assert_eq!(collection.kind, "Collection");
    assert!(collection.items.is_empty());
}

// --- create ---

#[tokio::test]
async fn create_item_returns_201_with_location_and_etag() {
    let resp = app()
        .oneshot(json_request("POST", "/to-dos/items", r#"{"kind":"Item","description":"Buy milk"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(etag_of(&resp), "\"1\"");
    let location = resp.headers()[http::header::LOCATION].to_str().unwrap().to_string();
    let item: Item = body_json(resp).await;
    assert_eq!(item.self_url, location);
    assert_eq!(item.kind, "Item");
    assert_eq!(item.description, "Buy milk");
    assert!(item.due.is_none());
}

#[tokio::test]
async fn create_item_with_foreign_kind_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/to-dos/items", r#"{"kind":"TodoList","description":"x"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_item_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/to-dos/items", r#"{"not_description":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- get ---

#[tokio::test]
async fn get_item_not_found() {
    let resp = app().oneshot(get_request(MISSING_ITEM)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_item_bad_uuid_returns_400() {
    let resp = app().oneshot(get_request("/items/not-a-uuid")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- update / delete ---

#[tokio::test]
async fn update_item_not_found() {
    let resp = app()
        .oneshot(patch_request(MISSING_ITEM, Some("\"1\""), r#"{"description":"Nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_item_not_found() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(MISSING_ITEM)
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- merge patch ---

async fn create_with_due(app: &mut axum::routing::RouterIntoService<String>) -> (String, String) {
    use tower::Service;

    let resp = ServiceExt::ready(app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/to-dos/items",
            r#"{"description":"Pay rent","due":"2026-11-01"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let etag = etag_of(&resp);
    let created: Item = body_json(resp).await;
    (created.self_url, etag)
}

#[tokio::test]
async fn merge_patch_null_removes_due() {
    use tower::Service;

    let mut app = app().into_service();
    let (url, etag) = create_with_due(&mut app).await;

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(patch_request(&url, Some(&etag), r#"{"due":null}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Item = body_json(resp).await;
    assert_eq!(updated.description, "Pay rent");
    assert!(updated.due.is_none());

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&url))
        .await
        .unwrap();
    let fetched: Item = body_json(resp).await;
    assert!(fetched.due.is_none());
}

#[tokio::test]
async fn merge_patch_null_description_returns_422() {
    use tower::Service;

    let mut app = app().into_service();
    let (url, etag) = create_with_due(&mut app).await;

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(patch_request(&url, Some(&etag), r#"{"description":null}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // rejected patch leaves the item and its ETag untouched
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&url))
        .await
        .unwrap();
    assert_eq!(etag_of(&resp), etag);
    let fetched: Item = body_json(resp).await;
    assert_eq!(fetched.description, "Pay rent");
    assert_eq!(fetched.due.as_deref(), Some("2026-11-01"));
}

// --- full lifecycle ---

#[tokio::test]
async fn item_lifecycle_with_preconditions() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/to-dos/items", r#"{"description":"Walk dog"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let etag = etag_of(&resp);
    let created: Item = body_json(resp).await;
    let url = created.self_url.clone();

    // list contains it
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/to-dos/items"))
        .await
        .unwrap();
    let collection: ItemCollection = body_json(resp).await;
    assert_eq!(collection.items.len(), 1);
    assert_eq!(collection.items[0].self_url, url);

    // update without If-Match
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(patch_request(&url, None, r#"{"due":"2026-11-01"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PRECONDITION_REQUIRED);

    // update with current ETag
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(patch_request(&url, Some(&etag), r#"{"due":"2026-11-01"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let new_etag = etag_of(&resp);
    assert_ne!(new_etag, etag);
    let updated: Item = body_json(resp).await;
    assert_eq!(updated.description, "Walk dog"); // unchanged
    assert_eq!(updated.due.as_deref(), Some("2026-11-01"));

    // stale ETag
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(patch_request(&url, Some(&etag), r#"{"description":"Walk cat"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PRECONDITION_FAILED);

    // get reflects the accepted update only
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&url))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(etag_of(&resp), new_etag);
    let fetched: Item = body_json(resp).await;
    assert_eq!(fetched.description, "Walk dog");

    // delete echoes the item
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri(&url)
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let deleted: Item = body_json(resp).await;
    assert_eq!(deleted.self_url, url);

    // gone
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&url))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
