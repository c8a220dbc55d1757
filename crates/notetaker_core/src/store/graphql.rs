//! GraphQL-over-HTTP note store for AppSync-style endpoints.
//!
//! # Responsibility
//! - Map the four store calls onto `listNotes`, `createNote`, `updateNote`
//!   and `deleteNote` operations.
//! - Attach the session credential to every request.
//!
//! # Invariants
//! - A response with a non-empty `errors` array is a failure even when
//!   partial `data` is present.
//! - `listNotes` is read once; `nextToken` is never followed.

use crate::auth::{Credential, Session};
use crate::model::note::{DeletedNote, Note};
use crate::store::{NoteStore, StoreError, StoreResult};
use async_trait::async_trait;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

pub const LIST_NOTES: &str = "query ListNotes {
  listNotes {
    items {
      id
      name
    }
  }
}";

pub const CREATE_NOTE: &str = "mutation CreateNote($input: CreateNoteInput!) {
  createNote(input: $input) {
    id
    name
  }
}";

pub const UPDATE_NOTE: &str = "mutation UpdateNote($input: UpdateNoteInput!) {
  updateNote(input: $input) {
    id
    name
  }
}";

pub const DELETE_NOTE: &str = "mutation DeleteNote($input: DeleteNoteInput!) {
  deleteNote(input: $input) {
    id
  }
}";

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Request envelope posted to the endpoint.
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GraphQlErrorMessage>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorMessage {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ListNotesData {
    #[serde(rename = "listNotes")]
    list_notes: Option<NoteConnection>,
}

#[derive(Debug, Deserialize)]
struct NoteConnection {
    #[serde(default)]
    items: Vec<Option<Note>>,
}

#[derive(Debug, Deserialize)]
struct CreateNoteData {
    #[serde(rename = "createNote")]
    create_note: Option<Note>,
}

#[derive(Debug, Deserialize)]
struct UpdateNoteData {
    #[serde(rename = "updateNote")]
    update_note: Option<Note>,
}

#[derive(Debug, Deserialize)]
struct DeleteNoteData {
    #[serde(rename = "deleteNote")]
    delete_note: Option<DeletedNote>,
}

/// Note store talking to a managed GraphQL API.
pub struct GraphQlNoteStore {
    endpoint: String,
    credential: Credential,
    client: reqwest::Client,
}

impl GraphQlNoteStore {
    /// Builds a store bound to `endpoint` for the given session.
    ///
    /// # Errors
    /// - `StoreError::Transport` when the HTTP client cannot be constructed.
    pub fn new(endpoint: &str, session: &Session, timeout: Duration) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| StoreError::Transport(format!("http client setup: {err}")))?;
        Ok(Self::with_client(endpoint, session, client))
    }

    /// Builds a store over a caller-configured HTTP client (proxy, TLS roots).
    pub fn with_client(endpoint: &str, session: &Session, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            credential: session.credential.clone(),
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &str,
        variables: Value,
    ) -> StoreResult<T> {
        let started_at = Instant::now();
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&GraphQlRequest { query, variables });
        if let Some((name, value)) = self.credential.header() {
            request = request.header(name, value);
        }

        let result = send_and_decode::<T>(request).await;

        match &result {
            Ok(_) => debug!(
                "event=graphql_call module=graphql status=ok operation={operation} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=graphql_call module=graphql status=error operation={operation} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }
}

#[async_trait]
impl NoteStore for GraphQlNoteStore {
    async fn list(&self) -> StoreResult<Vec<Note>> {
        let data: ListNotesData = self.execute("listNotes", LIST_NOTES, json!({})).await?;
        let connection = data
            .list_notes
            .ok_or_else(|| StoreError::Decode("listNotes was null".to_string()))?;
        // Items that failed to resolve server-side come back as null.
        Ok(connection.items.into_iter().flatten().collect())
    }

    async fn create(&self, name: &str) -> StoreResult<Note> {
        let data: CreateNoteData = self
            .execute(
                "createNote",
                CREATE_NOTE,
                json!({ "input": { "name": name } }),
            )
            .await?;
        data.create_note
            .ok_or_else(|| StoreError::Decode("createNote was null".to_string()))
    }

    async fn update(&self, id: &str, name: &str) -> StoreResult<Note> {
        let data: UpdateNoteData = self
            .execute(
                "updateNote",
                UPDATE_NOTE,
                json!({ "input": { "id": id, "name": name } }),
            )
            .await?;
        data.update_note
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: &str) -> StoreResult<DeletedNote> {
        let data: DeleteNoteData = self
            .execute("deleteNote", DELETE_NOTE, json!({ "input": { "id": id } }))
            .await?;
        data.delete_note
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

async fn send_and_decode<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> StoreResult<T> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(StoreError::Http {
            status: status.as_u16(),
            body: truncate(&body, MAX_ERROR_BODY_CHARS),
        });
    }
    decode_response(&body)
}

/// Decodes a GraphQL response body into its `data` payload.
///
/// # Errors
/// - `StoreError::GraphQl` when `errors` is non-empty.
/// - `StoreError::Decode` when the body is not JSON of the expected shape or
///   `data` is missing.
pub fn decode_response<T: DeserializeOwned>(body: &str) -> StoreResult<T> {
    let envelope: GraphQlResponse<T> =
        serde_json::from_str(body).map_err(|err| StoreError::Decode(err.to_string()))?;

    let errors = envelope.errors.unwrap_or_default();
    if !errors.is_empty() {
        return Err(StoreError::GraphQl(
            errors.into_iter().map(|error| error.message).collect(),
        ));
    }

    envelope
        .data
        .ok_or_else(|| StoreError::Decode("response has no data".to_string()))
}

fn truncate(value: &str, max_chars: usize) -> String {
    let mut truncated = value.chars().take(max_chars).collect::<String>();
    if value.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}
