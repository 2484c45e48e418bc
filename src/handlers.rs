//! HTTP request handlers for the trainer backend API.
//!
//! Every mutation runs as one locked read-modify-write cycle on the store.
//! Ticket credentials and client emails are never logged.

use crate::attachments;
use crate::clients;
use crate::config::Config;
use crate::models::*;
use crate::static_files;
use crate::store::{Store, StoreError};
use crate::tickets::find_latest_by_credentials;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, Query, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<Store>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

/// JSON body extractor that reports malformed input as [`ApiError`]
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Keep a value only if it has non-whitespace content
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Require a non-blank value
fn required(value: Option<String>, message: &'static str) -> Result<String, ApiError> {
    non_blank(value).ok_or(ApiError::InvalidInput(message))
}

// === Health Check ===

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// === Login ===

/// POST /api/login - Compare against the stored admin credential
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let success = state
        .store
        .read(|doc| req.username == doc.admin.username && req.password == doc.admin.password)
        .await;

    if success {
        info!("Admin login accepted");
    } else {
        warn!("Admin login rejected");
    }

    Ok(Json(SuccessResponse { success }))
}

// === Clients ===

/// GET /api/clients - All clients with `daysLeft` recomputed
///
/// Clients whose subscription ran out are marked inactive and the change
/// is persisted.
pub async fn list_clients(State(state): State<AppState>) -> Result<Json<Vec<ClientView>>, ApiError> {
    let views = state
        .store
        .mutate(|doc| Ok::<_, ApiError>(clients::refresh(&mut doc.clients, Utc::now())))
        .await?;

    debug!(count = views.len(), "Listed clients");

    Ok(Json(views))
}

/// POST /api/clients - Register a client
pub async fn create_client(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateClientRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    const MISSING: &str = "name and email are required";

    let client = Client {
        id: new_id(),
        name: required(req.name, MISSING)?,
        email: required(req.email, MISSING)?,
        start_date: req.start_date,
        active: req.active.unwrap_or(true),
        duration: req.duration,
    };
    let id = client.id.clone();

    state
        .store
        .mutate(|doc| {
            doc.clients.push(client);
            Ok::<_, ApiError>(())
        })
        .await?;

    info!(client_id = %id, "Client created");

    Ok(Json(CreatedResponse { id }))
}

// === Programs ===

/// GET /api/programs
pub async fn list_programs(State(state): State<AppState>) -> Json<Vec<Program>> {
    Json(state.store.read(|doc| doc.programs.clone()).await)
}

/// POST /api/programs
pub async fn create_program(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateProgramRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let program = Program {
        id: new_id(),
        title: required(req.title, "title is required")?,
        description: req.description.unwrap_or_default(),
        image: req.image,
    };
    let id = program.id.clone();

    state
        .store
        .mutate(|doc| {
            doc.programs.push(program);
            Ok::<_, ApiError>(())
        })
        .await?;

    info!(program_id = %id, "Program created");

    Ok(Json(CreatedResponse { id }))
}

// === Recipes ===

/// GET /api/recipes
pub async fn list_recipes(State(state): State<AppState>) -> Json<Vec<Recipe>> {
    Json(state.store.read(|doc| doc.recipes.clone()).await)
}

/// POST /api/recipes
pub async fn create_recipe(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateRecipeRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let recipe = Recipe {
        id: new_id(),
        title: required(req.title, "title is required")?,
        ingredients: req.ingredients.unwrap_or_default(),
        instructions: req.instructions.unwrap_or_default(),
        image: req.image,
    };
    let id = recipe.id.clone();

    state
        .store
        .mutate(|doc| {
            doc.recipes.push(recipe);
            Ok::<_, ApiError>(())
        })
        .await?;

    info!(recipe_id = %id, "Recipe created");

    Ok(Json(CreatedResponse { id }))
}

/// PUT /api/recipes/:id - Partial update
///
/// `"image": null` clears the image; a blank title is rejected.
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateRecipeRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let title = match req.title {
        Some(title) => Some(required(Some(title), "title cannot be blank")?),
        None => None,
    };

    state
        .store
        .mutate(|doc| {
            let recipe = doc
                .recipes
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or(ApiError::NotFound("recipe not found"))?;

            if let Some(title) = title {
                recipe.title = title;
            }
            if let Some(ingredients) = req.ingredients {
                recipe.ingredients = ingredients;
            }
            if let Some(instructions) = req.instructions {
                recipe.instructions = instructions;
            }
            if let Some(image) = req.image {
                recipe.image = image;
            }
            Ok::<_, ApiError>(())
        })
        .await?;

    info!(recipe_id = %id, "Recipe updated");

    Ok(Json(SuccessResponse { success: true }))
}

/// DELETE /api/recipes/:id
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .store
        .mutate(|doc| {
            let idx = doc
                .recipes
                .iter()
                .position(|r| r.id == id)
                .ok_or(ApiError::NotFound("recipe not found"))?;
            doc.recipes.remove(idx);
            Ok::<_, ApiError>(())
        })
        .await?;

    info!(recipe_id = %id, "Recipe deleted");

    Ok(Json(SuccessResponse { success: true }))
}

// === Tickets ===

/// GET /api/tickets
pub async fn list_tickets(State(state): State<AppState>) -> Json<Vec<Ticket>> {
    Json(state.store.read(|doc| doc.tickets.clone()).await)
}

/// GET /api/tickets/:id
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    state
        .store
        .read(|doc| doc.tickets.iter().find(|t| t.id == id).cloned())
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("ticket not found"))
}

/// POST /api/support/create - Open a ticket, optionally with a first message
pub async fn create_ticket(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateTicketRequest>,
) -> Result<Json<Ticket>, ApiError> {
    const MISSING: &str = "email and password are required";

    let email = required(req.email, MISSING)?;
    let password = required(req.password, MISSING)?;
    let now = Utc::now();

    let attachment = attachments::save_best_effort(
        &state.config.uploads_dir,
        req.file.as_deref(),
        req.file_name.as_deref(),
    )
    .await;
    let text = non_blank(req.message);

    let mut ticket = Ticket::open(email, password, now);
    if text.is_some() || attachment.is_some() {
        ticket.push_message(Sender::Client, text, attachment, now);
    }

    let stored = ticket.clone();
    state
        .store
        .mutate(|doc| {
            doc.tickets.push(stored);
            Ok::<_, ApiError>(())
        })
        .await?;

    info!(
        ticket_id = %ticket.id,
        messages = ticket.messages.len(),
        "Ticket created"
    );

    Ok(Json(ticket))
}

/// POST /api/tickets/:id/message - Append to the thread
///
/// Needs text, a file, or both. If the file cannot be stored the message is
/// still appended without it.
pub async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<PostMessageRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let text = non_blank(req.text);
    let file = non_blank(req.file);
    if text.is_none() && file.is_none() {
        return Err(ApiError::InvalidInput("text or file is required"));
    }

    // Avoid writing an orphaned upload for a ticket that does not exist
    let exists = state
        .store
        .read(|doc| doc.tickets.iter().any(|t| t.id == id))
        .await;
    if !exists {
        return Err(ApiError::NotFound("ticket not found"));
    }

    let attachment = attachments::save_best_effort(
        &state.config.uploads_dir,
        file.as_deref(),
        req.file_name.as_deref(),
    )
    .await;

    let now = Utc::now();
    state
        .store
        .mutate(|doc| {
            let ticket = doc
                .tickets
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or(ApiError::NotFound("ticket not found"))?;
            ticket.push_message(req.sender, text, attachment, now);
            Ok::<_, ApiError>(())
        })
        .await?;

    debug!(ticket_id = %id, sender = ?req.sender, "Message appended");

    Ok(Json(SuccessResponse { success: true }))
}

/// PUT /api/tickets/:id - Change status
pub async fn update_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateTicketRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let status = req.status.ok_or(ApiError::InvalidInput("status is required"))?;
    let now = Utc::now();

    let changed = state
        .store
        .mutate(|doc| {
            let ticket = doc
                .tickets
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or(ApiError::NotFound("ticket not found"))?;
            Ok::<_, ApiError>(ticket.set_status(status, now))
        })
        .await?;

    if changed {
        info!(ticket_id = %id, status = ?status, "Ticket status changed");
    } else {
        debug!(ticket_id = %id, status = ?status, "Ticket status unchanged");
    }

    Ok(Json(SuccessResponse { success: true }))
}

/// DELETE /api/tickets/:id
pub async fn delete_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .store
        .mutate(|doc| {
            let idx = doc
                .tickets
                .iter()
                .position(|t| t.id == id)
                .ok_or(ApiError::NotFound("ticket not found"))?;
            doc.tickets.remove(idx);
            Ok::<_, ApiError>(())
        })
        .await?;

    info!(ticket_id = %id, "Ticket deleted");

    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/user/ticket?email=..&password=.. - Latest ticket for a client
pub async fn lookup_ticket(
    State(state): State<AppState>,
    Query(query): Query<TicketLookupQuery>,
) -> Result<Json<Ticket>, ApiError> {
    const MISSING: &str = "email and password are required";

    let email = required(query.email, MISSING)?;
    let password = required(query.password, MISSING)?;

    state
        .store
        .read(|doc| find_latest_by_credentials(&doc.tickets, &email, &password).cloned())
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("no ticket matches those credentials"))
}

// === Fallback ===

/// Known API path, unsupported method
pub async fn unknown_endpoint(method: Method, uri: Uri) -> ApiError {
    debug!(%method, path = uri.path(), "No handler for method");
    ApiError::UnknownEndpoint
}

/// Unmatched `/api` paths are errors; everything else is a static file
pub async fn fallback(state: State<AppState>, uri: Uri) -> Response {
    let path = uri.path();
    if path == "/api" || path.starts_with("/api/") {
        debug!(path, "Unknown API endpoint");
        return ApiError::UnknownEndpoint.into_response();
    }

    static_files::serve(state, uri).await
}

// === Error Handling ===

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// Missing or unusable field
    InvalidInput(&'static str),
    /// Body is not valid JSON for the endpoint
    MalformedBody(String),
    NotFound(&'static str),
    UnknownEndpoint,
    Internal,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection.body_text())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        error!(error = %err, "Store operation failed");
        ApiError::Internal
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.to_string()),
            ApiError::MalformedBody(msg) => (StatusCode::BAD_REQUEST, "MALFORMED_BODY", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.to_string()),
            ApiError::UnknownEndpoint => {
                (StatusCode::NOT_FOUND, "UNKNOWN_ENDPOINT", "unknown endpoint".to_string())
            }
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "internal server error".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: message,
            code,
        });

        (status, body).into_response()
    }
}
