use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use notetaker_core::{
    ControllerError, Credential, GraphQlNoteStore, Note, NoteListController, NoteStore, Session,
    StoreError, SubmitOutcome,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const API_KEY: &str = "da2-test-key";

/// Minimal AppSync stand-in keyed on the operation name in the query text.
struct FakeAppSync {
    notes: Mutex<Vec<Note>>,
    next_id: AtomicUsize,
    seen_headers: Mutex<Vec<(Option<String>, Option<String>)>>,
}

impl FakeAppSync {
    fn new(seed: &[(&str, &str)]) -> Self {
        Self {
            notes: Mutex::new(seed.iter().map(|(id, name)| Note::new(*id, *name)).collect()),
            next_id: AtomicUsize::new(100),
            seen_headers: Mutex::new(Vec::new()),
        }
    }
}

async fn graphql(
    State(state): State<Arc<FakeAppSync>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    let api_key = header("x-api-key");
    let authorization = header("authorization");
    state
        .seen_headers
        .lock()
        .push((api_key.clone(), authorization.clone()));

    let authorized = api_key.as_deref() == Some(API_KEY) || authorization.is_some();
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "errors": [{ "errorType": "UnauthorizedException", "message": "You are not authorized to make this call." }] })),
        );
    }

    let query = body["query"].as_str().unwrap_or_default();
    let input = &body["variables"]["input"];
    let mut notes = state.notes.lock();

    let response = if query.contains("listNotes") {
        json!({ "data": { "listNotes": { "items": notes.clone(), "nextToken": null } } })
    } else if query.contains("createNote") {
        let id = format!("id-{}", state.next_id.fetch_add(1, Ordering::SeqCst));
        let note = Note::new(id, input["name"].as_str().unwrap_or_default());
        notes.insert(0, note.clone());
        json!({ "data": { "createNote": note } })
    } else if query.contains("updateNote") {
        let id = input["id"].as_str().unwrap_or_default();
        match notes.iter_mut().find(|note| note.id == id) {
            Some(note) => {
                note.name = input["name"].as_str().unwrap_or_default().to_string();
                json!({ "data": { "updateNote": note.clone() } })
            }
            None => conditional_failure("updateNote"),
        }
    } else if query.contains("deleteNote") {
        let id = input["id"].as_str().unwrap_or_default().to_string();
        let before = notes.len();
        notes.retain(|note| note.id != id);
        if notes.len() == before {
            conditional_failure("deleteNote")
        } else {
            json!({ "data": { "deleteNote": { "id": id } } })
        }
    } else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "errors": [{ "message": "unknown operation" }] })),
        );
    };

    (StatusCode::OK, Json(response))
}

fn conditional_failure(field: &str) -> Value {
    json!({
        "data": { field: null },
        "errors": [{ "errorType": "DynamoDB:ConditionalCheckFailedException", "message": "The conditional request failed" }]
    })
}

async fn spawn_fake(seed: &[(&str, &str)]) -> (String, Arc<FakeAppSync>) {
    let state = Arc::new(FakeAppSync::new(seed));
    let app = Router::new()
        .route("/graphql", post(graphql))
        .with_state(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/graphql"), state)
}

fn session(credential: Credential) -> Session {
    Session {
        principal: "tester".to_string(),
        credential,
    }
}

fn store_for(endpoint: &str, credential: Credential) -> GraphQlNoteStore {
    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    GraphQlNoteStore::with_client(endpoint, &session(credential), client)
}

#[tokio::test]
async fn controller_round_trips_crud_through_graphql() {
    let (endpoint, fake) = spawn_fake(&[("1", "A")]).await;
    let controller =
        NoteListController::new(store_for(&endpoint, Credential::ApiKey(API_KEY.to_string())));

    controller.load().await.unwrap();
    assert_eq!(controller.notes(), vec![Note::new("1", "A")]);

    let created = controller.submit("B").await.unwrap();
    assert!(matches!(created, SubmitOutcome::Created(ref note) if note.id == "id-100"));
    assert_eq!(controller.notes()[0], Note::new("id-100", "B"));

    controller.apply_update("1", "A2").await.unwrap();
    controller.apply_delete("id-100").await.unwrap();
    assert_eq!(controller.notes(), vec![Note::new("1", "A2")]);
    assert_eq!(*fake.notes.lock(), controller.notes());

    let seen = fake.seen_headers.lock();
    assert!(seen
        .iter()
        .all(|(key, auth)| key.as_deref() == Some(API_KEY) && auth.is_none()));
}

#[tokio::test]
async fn bearer_session_sends_authorization_header() {
    let (endpoint, fake) = spawn_fake(&[]).await;
    let store = store_for(&endpoint, Credential::BearerToken("eyJ.token".to_string()));

    assert!(store.list().await.unwrap().is_empty());
    let seen = fake.seen_headers.lock();
    assert_eq!(seen[0], (None, Some("eyJ.token".to_string())));
}

#[tokio::test]
async fn rejected_credential_surfaces_http_status() {
    let (endpoint, _fake) = spawn_fake(&[]).await;
    let store = store_for(&endpoint, Credential::ApiKey("wrong".to_string()));

    let err = store.list().await.unwrap_err();
    match err {
        StoreError::Http { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("UnauthorizedException"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn graphql_errors_fail_the_call_and_keep_local_state() {
    let (endpoint, fake) = spawn_fake(&[("1", "A")]).await;
    let controller =
        NoteListController::new(store_for(&endpoint, Credential::ApiKey(API_KEY.to_string())));
    controller.load().await.unwrap();
    fake.notes.lock().clear();

    let err = controller.apply_delete("1").await.unwrap_err();
    match err {
        ControllerError::Store(StoreError::GraphQl(messages)) => {
            assert_eq!(messages, vec!["The conditional request failed".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(controller.notes(), vec![Note::new("1", "A")]);
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    // Port 9 (discard) is not expected to run an HTTP server.
    let store = store_for(
        "http://127.0.0.1:9/graphql",
        Credential::ApiKey(API_KEY.to_string()),
    );

    let err = store.create("x").await.unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)));
}
