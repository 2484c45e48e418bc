//! Data models for the trainer backend.
//!
//! Stored entities are serialized with camelCase field names so the
//! document on disk and the API responses share one shape.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Opaque entity identifier
pub type EntityId = String;

/// Generate a fresh entity id
pub fn new_id() -> EntityId {
    Uuid::new_v4().to_string()
}

// ============================================================================
// Document
// ============================================================================

/// Root object persisted to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub admin: AdminCredential,
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub programs: Vec<Program>,
    #[serde(default)]
    pub tickets: Vec<Ticket>,
    #[serde(default)]
    pub recipes: Vec<Recipe>,
}

impl Document {
    /// Empty document with the given admin credential
    pub fn new(admin: AdminCredential) -> Self {
        Self {
            admin,
            clients: Vec::new(),
            programs: Vec::new(),
            tickets: Vec::new(),
            recipes: Vec::new(),
        }
    }
}

/// Single admin username/password pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredential {
    pub username: String,
    pub password: String,
}

// ============================================================================
// Clients, programs, recipes
// ============================================================================

/// Training client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub active: bool,
    /// Subscription length in months
    #[serde(default)]
    pub duration: Option<u32>,
}

/// Client as returned by `GET /api/clients`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientView {
    #[serde(flatten)]
    pub client: Client,
    pub days_left: Option<i64>,
}

/// Training program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub ingredients: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub image: Option<String>,
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Tickets
// ============================================================================

/// Ticket lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    #[default]
    Open,
    Closed,
}

/// Author of a ticket message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    #[default]
    Client,
    Admin,
}

/// One entry of a ticket thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    #[serde(default)]
    pub text: Option<String>,
    /// Path under `/uploads/`
    #[serde(default)]
    pub attachment: Option<String>,
    pub time: DateTime<Utc>,
}

/// Support ticket
///
/// `password` is a shared secret for client-side lookup, stored as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: EntityId,
    pub email: String,
    pub password: String,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default)]
    pub messages: Vec<Message>,
}

// === API Request/Response Models ===

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Create client request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub active: Option<bool>,
    pub duration: Option<u32>,
}

/// Create program request
#[derive(Debug, Deserialize)]
pub struct CreateProgramRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Create recipe request
#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub title: Option<String>,
    pub ingredients: Option<String>,
    pub instructions: Option<String>,
    pub image: Option<String>,
}

/// Partial recipe update; absent fields are left untouched
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub ingredients: Option<String>,
    pub instructions: Option<String>,
    /// `None` when absent, `Some(None)` when explicitly null
    #[serde(default, deserialize_with = "present")]
    pub image: Option<Option<String>>,
}

/// Mark a field as present, keeping an explicit `null` as `Some(None)`
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Open a new support ticket
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    /// Initial message text
    pub message: Option<String>,
    /// Base64 attachment, optionally data-URI prefixed
    pub file: Option<String>,
    pub file_name: Option<String>,
}

/// Append a message to a ticket
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    #[serde(default)]
    pub sender: Sender,
    pub text: Option<String>,
    pub file: Option<String>,
    pub file_name: Option<String>,
}

/// Change ticket status
#[derive(Debug, Deserialize)]
pub struct UpdateTicketRequest {
    pub status: Option<TicketStatus>,
}

/// Ticket lookup query (`/api/user/ticket?email=..&password=..`)
#[derive(Debug, Deserialize)]
pub struct TicketLookupQuery {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Response carrying only a success flag
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Response carrying the id of a created entity
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: EntityId,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}
