use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, SecondsFormat, Utc};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;
use todo_core::{JsonFileStore, TodoService};
use todo_server::{build_router, AppState};
use tower::ServiceExt;

const PHOTOSHOP_ID: &str = "01507581-9d12-a4c4-06bb-19d539a11189";
const MILK_ID: &str = "19d539a11189-bb60-u663-8sd4-01507581";
const JUGGLE_ID: &str = "19d539a11189-4a60-3a4c-4434-01507581";
const PASSPORT_ID: &str = "7895as2s4c-4a60-3a4c-7acc-895as1cc85";

struct Fixture {
    dir: TempDir,
    app: Router,
}

impl Fixture {
    /// Writes the four-todo seed document and a static front page.
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc::now() - Duration::seconds(1);
        let seed: Vec<Value> = [
            (PHOTOSHOP_ID, "Learn to use Adobe Photoshop", true),
            (MILK_ID, "Buy 2 Cartons of Milk", true),
            (JUGGLE_ID, "Learn to juggle", false),
            (PASSPORT_ID, "Renew Passport", false),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (id, name, completed))| {
            let due = now + Duration::weeks(i as i64 - 2);
            json!({
                "id": id,
                "name": name,
                "completed": completed,
                "due": due.to_rfc3339_opts(SecondsFormat::Millis, true),
                "created": (due - Duration::weeks(1)).to_rfc3339_opts(SecondsFormat::Millis, true),
            })
        })
        .collect();
        std::fs::write(
            dir.path().join("todos.json"),
            serde_json::to_string_pretty(&seed).unwrap() + "\n",
        )
        .unwrap();

        let static_dir = dir.path().join("public");
        std::fs::create_dir_all(&static_dir).unwrap();
        std::fs::write(static_dir.join("index.html"), "<!doctype html><h1>Todos</h1>").unwrap();
        std::fs::write(static_dir.join("app.css"), "h1 { color: teal; }").unwrap();

        let app = app_for(dir.path());
        Self { dir, app }
    }

    fn json_path(&self) -> std::path::PathBuf {
        self.dir.path().join("todos.json")
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, String, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|value| value.to_str().unwrap().to_string())
            .unwrap_or_default();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, bytes.to_vec())
    }

    async fn get_json(&self, uri: &str) -> Vec<Value> {
        let (status, content_type, body) = self.send(Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("application/json"), "{content_type}");
        serde_json::from_slice(&body).unwrap()
    }
}

fn app_for(root: &Path) -> Router {
    let service = TodoService::new(JsonFileStore::new(root.join("todos.json")));
    build_router(AppState::new(service), &root.join("public"))
}

fn with_id<'a>(todos: &'a [Value], id: &str) -> Vec<&'a Value> {
    todos.iter().filter(|todo| todo["id"] == id).collect()
}

#[tokio::test]
async fn root_serves_html() {
    let fixture = Fixture::new();
    let (status, content_type, body) = fixture.send(Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/html"), "{content_type}");
    assert!(String::from_utf8(body).unwrap().contains("Todos"));
}

#[tokio::test]
async fn content_serves_static_assets() {
    let fixture = Fixture::new();
    let (status, content_type, _) = fixture.send(Method::GET, "/content/app.css", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/css"), "{content_type}");
}

#[tokio::test]
async fn list_all_returns_array_of_todos() {
    let fixture = Fixture::new();
    let todos = fixture.get_json("/todos").await;
    assert_eq!(todos.len(), 4);
    assert_eq!(todos[0]["id"], PHOTOSHOP_ID);
}

#[tokio::test]
async fn list_overdue_returns_past_due_incomplete() {
    let fixture = Fixture::new();
    let todos = fixture.get_json("/todos/overdue").await;
    let now = Utc::now();
    for todo in &todos {
        let due = chrono::DateTime::parse_from_rfc3339(todo["due"].as_str().unwrap())
            .unwrap()
            .with_timezone(&Utc);
        assert!(due < now);
        assert_eq!(todo["completed"], false);
    }
    assert_eq!(with_id(&todos, JUGGLE_ID).len(), 1);
}

#[tokio::test]
async fn list_completed_returns_completed_only() {
    let fixture = Fixture::new();
    let todos = fixture.get_json("/todos/completed").await;
    assert_eq!(todos.len(), 2);
    assert!(todos.iter().all(|todo| todo["completed"] == true));
}

#[tokio::test]
async fn create_returns_201_and_persists() {
    let fixture = Fixture::new();
    let (status, _, body) = fixture
        .send(
            Method::POST,
            "/todos",
            Some(json!({
                "name": "Turn on central heating",
                "due": "2021-12-30T14:48:00.000Z"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let created: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(created["completed"], false);
    assert!(created["created"].is_string());

    let todos = fixture.get_json("/todos").await;
    let matching: Vec<_> = todos
        .iter()
        .filter(|todo| todo["name"] == "Turn on central heating")
        .collect();
    assert_eq!(matching.len(), 1);
    assert!(matching[0].get("created").is_some());
    assert!(matching[0].get("completed").is_some());

    let on_disk: Vec<Value> =
        serde_json::from_str(&std::fs::read_to_string(fixture.json_path()).unwrap()).unwrap();
    assert_eq!(on_disk.len(), 5);
}

#[tokio::test]
async fn create_rejects_invalid_todo_with_400() {
    let fixture = Fixture::new();
    let (status, _, body) = fixture
        .send(Method::POST, "/todos", Some(json!({ "jibberish": "Should not work" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(fixture.get_json("/todos").await.len(), 4);
}

#[tokio::test]
async fn create_rejects_non_json_body_with_400() {
    let fixture = Fixture::new();
    let (status, _, _) = fixture.send(Method::POST, "/todos", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = fixture
        .send(Method::POST, "/todos", Some(json!("just a string")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_one_returns_the_todo() {
    let fixture = Fixture::new();
    let uri = format!("/todos/{MILK_ID}");
    let (status, content_type, body) = fixture.send(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("application/json"), "{content_type}");
    let todo: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(todo["id"], MILK_ID);
    assert_eq!(todo["name"], "Buy 2 Cartons of Milk");
    assert_eq!(todo["completed"], true);
}

#[tokio::test]
async fn get_one_unknown_id_is_bad_request() {
    let fixture = Fixture::new();
    let (status, _, body) = fixture.send(Method::GET, "/todos/xxx123", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"]["code"], "INVALID_TODO_ID");
}

#[tokio::test]
async fn patch_updates_name() {
    let fixture = Fixture::new();
    let uri = format!("/todos/{MILK_ID}");
    let (status, _, body) = fixture
        .send(Method::PATCH, &uri, Some(json!({ "name": "Buy 6 Cartons of Milk" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    let updated: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(updated["id"], MILK_ID);

    let todos = fixture.get_json("/todos").await;
    let matching: Vec<_> = todos
        .iter()
        .filter(|todo| todo["name"] == "Buy 6 Cartons of Milk")
        .collect();
    assert_eq!(matching.len(), 1);
}

#[tokio::test]
async fn patch_unknown_id_is_bad_request() {
    let fixture = Fixture::new();
    let (status, _, body) = fixture
        .send(Method::PATCH, "/todos/nope", Some(json!({ "name": "x" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"]["code"], "INVALID_TODO_ID");
}

#[tokio::test]
async fn complete_marks_todo_completed() {
    let fixture = Fixture::new();
    let uri = format!("/todos/{JUGGLE_ID}/complete");
    let (status, _, _) = fixture.send(Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let completed = fixture.get_json("/todos/completed").await;
    let matching = with_id(&completed, JUGGLE_ID);
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0]["completed"], true);
}

#[tokio::test]
async fn undo_marks_todo_incomplete() {
    let fixture = Fixture::new();
    let uri = format!("/todos/{PHOTOSHOP_ID}/undo");
    let (status, _, _) = fixture.send(Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let todos = fixture.get_json("/todos").await;
    let matching: Vec<_> = with_id(&todos, PHOTOSHOP_ID)
        .into_iter()
        .filter(|todo| todo["completed"] == false)
        .collect();
    assert_eq!(matching.len(), 1);
}

#[tokio::test]
async fn undo_invalid_id_is_bad_request() {
    let fixture = Fixture::new();
    let (status, _, _) = fixture.send(Method::POST, "/todos/0xxx1235/undo", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_removes_todo() {
    let fixture = Fixture::new();
    let uri = format!("/todos/{JUGGLE_ID}");
    let (status, _, body) = fixture.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let todos = fixture.get_json("/todos").await;
    assert!(with_id(&todos, JUGGLE_ID).is_empty());
    assert_eq!(todos.len(), 3);
}

#[tokio::test]
async fn delete_invalid_id_is_bad_request() {
    let fixture = Fixture::new();
    let (status, _, _) = fixture.send(Method::DELETE, "/todos/xxx123", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_store_file_lists_empty_then_creates_it() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_for(dir.path());

    let response = app
        .clone()
        .oneshot(Request::get("/todos").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"[]");

    let response = app
        .oneshot(
            Request::post("/todos")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name":"first"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(dir.path().join("todos.json").exists());
}

#[tokio::test]
async fn corrupt_store_is_a_server_error() {
    let fixture = Fixture::new();
    std::fs::write(fixture.json_path(), "not json").unwrap();

    let (status, _, body) = fixture.send(Method::GET, "/todos", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"]["code"], "INTERNAL_SERVER_ERROR");
}
