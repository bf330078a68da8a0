use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::validate::{
    FieldViolation, ValidateBody, check_email, check_max_len, check_min_items, check_min_len,
    check_non_negative, check_required, check_url,
};

// --- Core documents (one table row each) ---

/// User
///
/// Canonical account record. The credential hash is persisted but never
/// serialized into any response body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub firstname: String,
    pub lastname: String,
    pub avatar: String,
    pub city: String,
    /// RBAC field: "user" or "admin".
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event
///
/// Organisers are the privileged set (polls, ticket types); participants are
/// the member set (poll answers). Both are deduplicated uuid sets and the
/// organiser set must stay non-empty while the event exists.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: String,
    pub cover_photo: String,
    /// "public" or "private". Ticketing requires "public".
    pub visibility: String,
    pub organisers: Vec<Uuid>,
    pub participants: Vec<Uuid>,
    /// Optional owning group reference.
    #[serde(rename = "group")]
    pub group_id: Option<Uuid>,
    pub ticketing_enabled: bool,
    pub shopping_list_enabled: bool,
    pub carpool_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Group
///
/// The admin set must stay non-empty while the group exists.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub cover_photo: String,
    /// "public", "private" or "secret". Stored as `kind`; `type` is reserved
    /// in Rust and in the wire format of the original API.
    #[serde(rename = "type")]
    pub kind: String,
    pub allow_member_posts: bool,
    pub allow_member_create_events: bool,
    pub admins: Vec<Uuid>,
    pub members: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Thread
///
/// Linked to exactly one of a group or an event, never both, never neither.
/// Messages (and their replies) are embedded sub-documents in a jsonb column.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: Uuid,
    #[serde(rename = "group")]
    pub group_id: Option<Uuid>,
    #[serde(rename = "event")]
    pub event_id: Option<Uuid>,
    #[sqlx(json)]
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub author: Uuid,
    pub text: String,
    pub replies: Vec<Reply>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub author: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Album
///
/// Photos (and their comments) are embedded sub-documents.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: Uuid,
    #[serde(rename = "event")]
    pub event_id: Uuid,
    pub name: String,
    #[sqlx(json)]
    pub photos: Vec<Photo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: Uuid,
    pub url: String,
    pub posted_by: Uuid,
    pub comments: Vec<PhotoComment>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct PhotoComment {
    pub author: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Poll
///
/// Questions and answers are embedded sub-documents. At most one answer per
/// participant; every choice must reference an existing question and an
/// in-bounds option index.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: Uuid,
    #[serde(rename = "event")]
    pub event_id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    #[sqlx(json)]
    pub questions: Vec<Question>,
    #[sqlx(json)]
    pub answers: Vec<Answer>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub participant: Uuid,
    pub choices: Vec<Choice>,
    pub created_at: DateTime<Utc>,
}

/// One selected option for one question.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub question_id: Uuid,
    pub option_index: usize,
}

/// TicketType
///
/// Unique per (event, name) via a storage index.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
pub struct TicketType {
    pub id: Uuid,
    #[serde(rename = "event")]
    pub event_id: Uuid,
    pub name: String,
    pub amount: f64,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

/// Ticket
///
/// Purchased anonymously; the buyer identity tuple is the uniqueness key per
/// event (storage index).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Uuid,
    #[serde(rename = "event")]
    pub event_id: Uuid,
    #[serde(rename = "ticketType")]
    pub ticket_type_id: Uuid,
    pub buyer: Buyer,
    pub purchased_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    pub firstname: String,
    pub lastname: String,
    pub address: String,
}

// --- Request payloads (input shapes) ---

fn default_public() -> String {
    "public".to_string()
}

fn default_true() -> bool {
    true
}

/// Input for POST /auth/register.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub city: String,
}

impl ValidateBody for RegisterRequest {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut out = vec![];
        check_email("email", &self.email, &mut out);
        check_min_len("password", &self.password, 8, &mut out);
        check_required("firstname", &self.firstname, &mut out);
        check_required("lastname", &self.lastname, &mut out);
        if out.is_empty() { Ok(()) } else { Err(out) }
    }
}

/// Input for POST /auth/login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl ValidateBody for LoginRequest {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut out = vec![];
        check_email("email", &self.email, &mut out);
        check_min_len("password", &self.password, 1, &mut out);
        if out.is_empty() { Ok(()) } else { Err(out) }
    }
}

/// Output of POST /auth/login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Input for POST /groups.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub cover_photo: String,
    #[serde(rename = "type", default = "default_public")]
    pub kind: String,
    #[serde(default = "default_true")]
    pub allow_member_posts: bool,
    #[serde(default)]
    pub allow_member_create_events: bool,
    #[serde(default)]
    pub members: Vec<Uuid>,
}

impl ValidateBody for CreateGroupRequest {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut out = vec![];
        check_required("name", &self.name, &mut out);
        if !matches!(self.kind.as_str(), "public" | "private" | "secret") {
            out.push(FieldViolation::new(
                "type",
                "must be one of public, private, secret",
            ));
        }
        if out.is_empty() { Ok(()) } else { Err(out) }
    }
}

/// Input for POST /events.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: String,
    #[serde(default)]
    pub cover_photo: String,
    #[serde(default = "default_public")]
    pub visibility: String,
    #[serde(default)]
    pub organisers: Vec<Uuid>,
    #[serde(default)]
    pub participants: Vec<Uuid>,
    #[serde(rename = "group", default)]
    pub group_id: Option<Uuid>,
    #[serde(default)]
    pub ticketing_enabled: bool,
    #[serde(default)]
    pub shopping_list_enabled: bool,
    #[serde(default)]
    pub carpool_enabled: bool,
}

impl ValidateBody for CreateEventRequest {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut out = vec![];
        check_required("name", &self.name, &mut out);
        check_required("location", &self.location, &mut out);
        if !matches!(self.visibility.as_str(), "public" | "private") {
            out.push(FieldViolation::new(
                "visibility",
                "must be one of public, private",
            ));
        }
        if self.end_date < self.start_date {
            out.push(FieldViolation::new("endDate", "must be >= startDate"));
        }
        if out.is_empty() { Ok(()) } else { Err(out) }
    }
}

/// Input for POST /threads.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateThreadRequest {
    #[serde(rename = "group", default)]
    pub group_id: Option<Uuid>,
    #[serde(rename = "event", default)]
    pub event_id: Option<Uuid>,
}

impl ValidateBody for CreateThreadRequest {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        // Exactly one parent reference.
        if self.group_id.is_some() == self.event_id.is_some() {
            return Err(vec![FieldViolation::new(
                "group",
                "thread must be linked to either group or event (not both)",
            )]);
        }
        Ok(())
    }
}

/// Input for POST /threads/{id}/messages and .../replies.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    pub text: String,
}

impl ValidateBody for PostMessageRequest {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut out = vec![];
        check_min_len("text", &self.text, 1, &mut out);
        check_max_len("text", &self.text, 2000, &mut out);
        if out.is_empty() { Ok(()) } else { Err(out) }
    }
}

/// Input for POST /albums.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlbumRequest {
    #[serde(rename = "event")]
    pub event_id: Uuid,
    pub name: String,
}

impl ValidateBody for CreateAlbumRequest {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut out = vec![];
        check_required("name", &self.name, &mut out);
        if out.is_empty() { Ok(()) } else { Err(out) }
    }
}

/// Input for POST /albums/{id}/photos.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct AddPhotoRequest {
    pub url: String,
}

impl ValidateBody for AddPhotoRequest {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut out = vec![];
        check_url("url", &self.url, &mut out);
        if out.is_empty() { Ok(()) } else { Err(out) }
    }
}

/// Input for POST /albums/{id}/photos/{photoId}/comments.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CommentPhotoRequest {
    pub text: String,
}

impl ValidateBody for CommentPhotoRequest {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut out = vec![];
        check_min_len("text", &self.text, 1, &mut out);
        check_max_len("text", &self.text, 1000, &mut out);
        if out.is_empty() { Ok(()) } else { Err(out) }
    }
}

/// Input for POST /polls.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    #[serde(rename = "event")]
    pub event_id: Uuid,
    pub title: String,
    pub questions: Vec<QuestionInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInput {
    pub question: String,
    pub options: Vec<String>,
}

impl ValidateBody for CreatePollRequest {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut out = vec![];
        check_required("title", &self.title, &mut out);
        check_min_items("questions", &self.questions, 1, &mut out);
        for (i, q) in self.questions.iter().enumerate() {
            check_required(&format!("questions[{i}].question"), &q.question, &mut out);
            check_min_items(&format!("questions[{i}].options"), &q.options, 2, &mut out);
            for (j, option) in q.options.iter().enumerate() {
                check_required(&format!("questions[{i}].options[{j}]"), option, &mut out);
            }
        }
        if out.is_empty() { Ok(()) } else { Err(out) }
    }
}

/// Input for POST /polls/{id}/answer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnswerPollRequest {
    pub choices: Vec<Choice>,
}

impl ValidateBody for AnswerPollRequest {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut out = vec![];
        check_min_items("choices", &self.choices, 1, &mut out);
        if out.is_empty() { Ok(()) } else { Err(out) }
    }
}

/// Input for POST /tickets/types.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketTypeRequest {
    #[serde(rename = "event")]
    pub event_id: Uuid,
    pub name: String,
    pub amount: f64,
    pub quantity: i32,
}

impl ValidateBody for CreateTicketTypeRequest {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut out = vec![];
        check_required("name", &self.name, &mut out);
        check_non_negative("amount", self.amount, &mut out);
        if self.quantity < 0 {
            out.push(FieldViolation::new("quantity", "must not be negative"));
        }
        if out.is_empty() { Ok(()) } else { Err(out) }
    }
}

/// Input for POST /tickets/buy.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct BuyTicketRequest {
    #[serde(rename = "event")]
    pub event_id: Uuid,
    #[serde(rename = "ticketType")]
    pub ticket_type_id: Uuid,
    pub buyer: Buyer,
}

impl ValidateBody for BuyTicketRequest {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut out = vec![];
        check_required("buyer.firstname", &self.buyer.firstname, &mut out);
        check_required("buyer.lastname", &self.buyer.lastname, &mut out);
        check_min_len("buyer.address", &self.buyer.address, 5, &mut out);
        if out.is_empty() { Ok(()) } else { Err(out) }
    }
}

/// Output of GET /health.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct HealthResponse {
    pub ok: bool,
    pub env: String,
}
