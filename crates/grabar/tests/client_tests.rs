//! Backend client tests against an in-process axum server.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::significant_drop_tightening)]

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use grabar::{
    ActionRecord, ApiClient, EmitOptions, GrabarError, Locator, NewProject, NewScript, Project,
    ProjectPatch, SavedScript, ScriptEmitter, ScriptLanguage,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

const TOKEN: &str = "test-token";

#[derive(Default)]
struct Backend {
    next_id: u32,
    projects: BTreeMap<String, Project>,
    scripts: BTreeMap<String, SavedScript>,
}

impl Backend {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }
}

type Shared = Arc<Mutex<Backend>>;
type Reply = Result<Json<Value>, StatusCode>;

fn authorized(headers: &HeaderMap) -> Result<(), StatusCode> {
    let expected = format!("Bearer {TOKEN}");
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn token(Json(body): Json<Value>) -> Reply {
    if body["password"] == "hunter2" {
        Ok(Json(json!({ "access_token": TOKEN, "token_type": "bearer" })))
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

async fn list_projects(State(db): State<Shared>, headers: HeaderMap) -> Reply {
    authorized(&headers)?;
    let db = db.lock().unwrap();
    Ok(Json(json!(db.projects.values().collect::<Vec<_>>())))
}

async fn create_project(
    State(db): State<Shared>,
    headers: HeaderMap,
    Json(new): Json<NewProject>,
) -> Reply {
    authorized(&headers)?;
    let mut db = db.lock().unwrap();
    let id = db.id("p");
    let project = Project {
        id: id.clone(),
        name: new.name,
        description: new.description,
        created_at: None,
    };
    db.projects.insert(id, project.clone());
    Ok(Json(json!(project)))
}

async fn get_project(State(db): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    authorized(&headers)?;
    let db = db.lock().unwrap();
    db.projects
        .get(&id)
        .map(|p| Json(json!(p)))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_project(
    State(db): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<ProjectPatch>,
) -> Reply {
    authorized(&headers)?;
    let mut db = db.lock().unwrap();
    let project = db.projects.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = patch.name {
        project.name = name;
    }
    if let Some(description) = patch.description {
        project.description = Some(description);
    }
    Ok(Json(json!(project)))
}

async fn delete_project(
    State(db): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    authorized(&headers)?;
    let mut db = db.lock().unwrap();
    db.projects.remove(&id).ok_or(StatusCode::NOT_FOUND)?;
    db.scripts.retain(|_, s| s.project_id != id);
    Ok(StatusCode::NO_CONTENT)
}

async fn list_scripts(State(db): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    authorized(&headers)?;
    let db = db.lock().unwrap();
    let scripts: Vec<_> = db.scripts.values().filter(|s| s.project_id == id).collect();
    Ok(Json(json!(scripts)))
}

async fn create_script(
    State(db): State<Shared>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
    Json(new): Json<NewScript>,
) -> Reply {
    authorized(&headers)?;
    let mut db = db.lock().unwrap();
    if !db.projects.contains_key(&project_id) {
        return Err(StatusCode::NOT_FOUND);
    }
    let id = db.id("s");
    let saved = SavedScript {
        id: id.clone(),
        project_id,
        name: new.name,
        language: new.language,
        content: new.content,
        action_count: new.action_count,
        created_at: None,
    };
    db.scripts.insert(id, saved.clone());
    Ok(Json(json!(saved)))
}

async fn get_script(State(db): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    authorized(&headers)?;
    let db = db.lock().unwrap();
    db.scripts
        .get(&id)
        .map(|s| Json(json!(s)))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn delete_script(
    State(db): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    authorized(&headers)?;
    let mut db = db.lock().unwrap();
    db.scripts.remove(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/auth/token", post(token))
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/{id}",
            get(get_project).patch(update_project).delete(delete_project),
        )
        .route("/projects/{id}/scripts", get(list_scripts).post(create_script))
        .route("/scripts/{id}", get(get_script).delete(delete_script))
        .with_state(Shared::default());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn signed_in() -> ApiClient {
    let mut client = ApiClient::new(spawn_backend().await).unwrap();
    client.sign_in("dev@example.com", "hunter2").await.unwrap();
    client
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn sign_in_stores_token() {
    let client = signed_in().await;
    assert_eq!(client.token(), Some(TOKEN));
}

#[tokio::test]
async fn wrong_password_is_api_error() {
    let mut client = ApiClient::new(spawn_backend().await).unwrap();
    let err = client.sign_in("dev@example.com", "nope").await.unwrap_err();
    assert!(matches!(err, GrabarError::Api { status: 401, .. }));
    assert!(client.token().is_none());
}

#[tokio::test]
async fn missing_token_never_reaches_server() {
    let client = ApiClient::new(spawn_backend().await).unwrap();
    let err = client.list_projects().await.unwrap_err();
    assert!(matches!(err, GrabarError::NotAuthenticated));
}

#[tokio::test]
async fn bad_token_is_unauthorized() {
    let client = ApiClient::new(spawn_backend().await).unwrap().with_token("stale");
    let err = client.list_projects().await.unwrap_err();
    assert!(matches!(err, GrabarError::Api { status: 401, .. }));
}

// ============================================================================
// Projects
// ============================================================================

#[tokio::test]
async fn project_crud() {
    let client = signed_in().await;
    let created = client
        .create_project(&NewProject {
            name: "Checkout".to_string(),
            description: Some("cart flows".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(client.list_projects().await.unwrap(), vec![created.clone()]);

    let renamed = client
        .update_project(
            &created.id,
            &ProjectPatch {
                name: Some("Checkout v2".to_string()),
                description: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Checkout v2");
    assert_eq!(renamed.description.as_deref(), Some("cart flows"));
    assert_eq!(client.get_project(&created.id).await.unwrap(), renamed);

    client.delete_project(&created.id).await.unwrap();
    let err = client.get_project(&created.id).await.unwrap_err();
    assert!(matches!(err, GrabarError::Api { status: 404, .. }));
}

// ============================================================================
// Scripts
// ============================================================================

#[tokio::test]
async fn upload_and_download_script() {
    let client = signed_in().await;
    let project = client
        .create_project(&NewProject {
            name: "Signup".to_string(),
            description: None,
        })
        .await
        .unwrap();

    let script = ScriptEmitter::new(EmitOptions::default())
        .emit(&[
            ActionRecord::navigate("https://app.example"),
            ActionRecord::click(Locator::id("submit")),
        ])
        .unwrap();
    let saved = client
        .create_script(&project.id, &NewScript::from_script("signup", &script))
        .await
        .unwrap();
    assert_eq!(saved.language, ScriptLanguage::Python);
    assert_eq!(saved.action_count, 1);

    let listed = client.list_scripts(&project.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    let fetched = client.get_script(&saved.id).await.unwrap();
    assert_eq!(fetched.content, script.text);

    client.delete_script(&saved.id).await.unwrap();
    assert!(client.list_scripts(&project.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn upload_to_missing_project_fails() {
    let client = signed_in().await;
    let script = ScriptEmitter::default().emit(&[]).unwrap();
    let err = client
        .create_script("p404", &NewScript::from_script("x", &script))
        .await
        .unwrap_err();
    assert!(matches!(err, GrabarError::Api { status: 404, .. }));
}

#[tokio::test]
async fn unreachable_backend_is_http_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = ApiClient::new(format!("http://{addr}")).unwrap().with_token(TOKEN);
    let err = client.list_projects().await.unwrap_err();
    assert!(matches!(err, GrabarError::Http(_)));
}
