use async_trait::async_trait;
use sqlx::{PgPool, types::Json};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{Album, Event, Group, Poll, Thread, Ticket, TicketType, User};

/// Repository
///
/// Abstract contract for all persistence operations. Handlers talk to this
/// trait object only; the concrete backing (Postgres here, a mock in tests)
/// stays swappable. Each method is one independent storage operation —
/// uniqueness is enforced by the storage layer's indexes and surfaces as a
/// database error, translated by `ApiError::from`.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn create_user(&self, user: &User) -> Result<(), sqlx::Error>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    /// Hard delete. Returns false when no such user existed.
    async fn delete_user(&self, id: Uuid) -> Result<bool, sqlx::Error>;

    // --- Events ---
    async fn create_event(&self, event: &Event) -> Result<(), sqlx::Error>;
    async fn get_event(&self, id: Uuid) -> Result<Option<Event>, sqlx::Error>;
    /// Persists the organiser/participant sets after a join/leave.
    async fn update_event_members(&self, event: &Event) -> Result<(), sqlx::Error>;

    // --- Groups ---
    async fn create_group(&self, group: &Group) -> Result<(), sqlx::Error>;
    async fn get_group(&self, id: Uuid) -> Result<Option<Group>, sqlx::Error>;
    async fn update_group_members(&self, group: &Group) -> Result<(), sqlx::Error>;

    // --- Threads ---
    async fn create_thread(&self, thread: &Thread) -> Result<(), sqlx::Error>;
    async fn get_thread(&self, id: Uuid) -> Result<Option<Thread>, sqlx::Error>;
    async fn update_thread_messages(&self, thread: &Thread) -> Result<(), sqlx::Error>;

    // --- Albums ---
    async fn create_album(&self, album: &Album) -> Result<(), sqlx::Error>;
    async fn get_album(&self, id: Uuid) -> Result<Option<Album>, sqlx::Error>;
    async fn update_album_photos(&self, album: &Album) -> Result<(), sqlx::Error>;

    // --- Polls ---
    async fn create_poll(&self, poll: &Poll) -> Result<(), sqlx::Error>;
    async fn get_poll(&self, id: Uuid) -> Result<Option<Poll>, sqlx::Error>;
    async fn update_poll_answers(&self, poll: &Poll) -> Result<(), sqlx::Error>;

    // --- Tickets ---
    async fn create_ticket_type(&self, ticket_type: &TicketType) -> Result<(), sqlx::Error>;
    async fn get_ticket_type(&self, id: Uuid) -> Result<Option<TicketType>, sqlx::Error>;
    /// Sold count for the soft stock check. Not atomic with the insert; the
    /// buyer-identity unique index is the hard backstop.
    async fn count_tickets(&self, ticket_type_id: Uuid) -> Result<i64, sqlx::Error>;
    async fn create_ticket(&self, ticket: &Ticket) -> Result<(), sqlx::Error>;
}

/// The shared trait-object handle carried in the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// Concrete `Repository` backed by Postgres. Embedded sub-document lists
/// (messages, photos, questions, answers) live in jsonb columns; membership
/// id sets in uuid[] columns.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str =
    "id, email, password_hash, firstname, lastname, avatar, city, role, created_at, updated_at";

const EVENT_COLUMNS: &str = "id, name, description, start_date, end_date, location, cover_photo, \
     visibility, organisers, participants, group_id, ticketing_enabled, \
     shopping_list_enabled, carpool_enabled, created_at, updated_at";

const GROUP_COLUMNS: &str = "id, name, description, icon, cover_photo, kind, allow_member_posts, \
     allow_member_create_events, admins, members, created_at, updated_at";

#[async_trait]
impl Repository for PostgresRepository {
    async fn create_user(&self, user: &User) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, firstname, lastname, avatar, city, role, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.firstname)
        .bind(&user.lastname)
        .bind(&user.avatar)
        .bind(&user.city)
        .bind(&user.role)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_event(&self, event: &Event) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO events (id, name, description, start_date, end_date, location, cover_photo, \
             visibility, organisers, participants, group_id, ticketing_enabled, shopping_list_enabled, \
             carpool_enabled, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
        )
        .bind(event.id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(&event.location)
        .bind(&event.cover_photo)
        .bind(&event.visibility)
        .bind(&event.organisers)
        .bind(&event.participants)
        .bind(event.group_id)
        .bind(event.ticketing_enabled)
        .bind(event.shopping_list_enabled)
        .bind(event.carpool_enabled)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_event(&self, id: Uuid) -> Result<Option<Event>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn update_event_members(&self, event: &Event) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE events SET organisers = $2, participants = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(event.id)
        .bind(&event.organisers)
        .bind(&event.participants)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn create_group(&self, group: &Group) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO groups (id, name, description, icon, cover_photo, kind, allow_member_posts, \
             allow_member_create_events, admins, members, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(group.id)
        .bind(&group.name)
        .bind(&group.description)
        .bind(&group.icon)
        .bind(&group.cover_photo)
        .bind(&group.kind)
        .bind(group.allow_member_posts)
        .bind(group.allow_member_create_events)
        .bind(&group.admins)
        .bind(&group.members)
        .bind(group.created_at)
        .bind(group.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_group(&self, id: Uuid) -> Result<Option<Group>, sqlx::Error> {
        sqlx::query_as::<_, Group>(&format!("SELECT {GROUP_COLUMNS} FROM groups WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn update_group_members(&self, group: &Group) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE groups SET admins = $2, members = $3, updated_at = $4 WHERE id = $1")
            .bind(group.id)
            .bind(&group.admins)
            .bind(&group.members)
            .bind(group.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_thread(&self, thread: &Thread) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO threads (id, group_id, event_id, messages, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(thread.id)
        .bind(thread.group_id)
        .bind(thread.event_id)
        .bind(Json(&thread.messages))
        .bind(thread.created_at)
        .bind(thread.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_thread(&self, id: Uuid) -> Result<Option<Thread>, sqlx::Error> {
        sqlx::query_as::<_, Thread>(
            "SELECT id, group_id, event_id, messages, created_at, updated_at \
             FROM threads WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_thread_messages(&self, thread: &Thread) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE threads SET messages = $2, updated_at = $3 WHERE id = $1")
            .bind(thread.id)
            .bind(Json(&thread.messages))
            .bind(thread.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_album(&self, album: &Album) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO albums (id, event_id, name, photos, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(album.id)
        .bind(album.event_id)
        .bind(&album.name)
        .bind(Json(&album.photos))
        .bind(album.created_at)
        .bind(album.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_album(&self, id: Uuid) -> Result<Option<Album>, sqlx::Error> {
        sqlx::query_as::<_, Album>(
            "SELECT id, event_id, name, photos, created_at, updated_at FROM albums WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_album_photos(&self, album: &Album) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE albums SET photos = $2, updated_at = $3 WHERE id = $1")
            .bind(album.id)
            .bind(Json(&album.photos))
            .bind(album.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_poll(&self, poll: &Poll) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO polls (id, event_id, created_by, title, questions, answers, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(poll.id)
        .bind(poll.event_id)
        .bind(poll.created_by)
        .bind(&poll.title)
        .bind(Json(&poll.questions))
        .bind(Json(&poll.answers))
        .bind(poll.created_at)
        .bind(poll.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_poll(&self, id: Uuid) -> Result<Option<Poll>, sqlx::Error> {
        sqlx::query_as::<_, Poll>(
            "SELECT id, event_id, created_by, title, questions, answers, created_at, updated_at \
             FROM polls WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_poll_answers(&self, poll: &Poll) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE polls SET answers = $2, updated_at = $3 WHERE id = $1")
            .bind(poll.id)
            .bind(Json(&poll.answers))
            .bind(poll.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_ticket_type(&self, ticket_type: &TicketType) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO ticket_types (id, event_id, name, amount, quantity, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(ticket_type.id)
        .bind(ticket_type.event_id)
        .bind(&ticket_type.name)
        .bind(ticket_type.amount)
        .bind(ticket_type.quantity)
        .bind(ticket_type.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_ticket_type(&self, id: Uuid) -> Result<Option<TicketType>, sqlx::Error> {
        sqlx::query_as::<_, TicketType>(
            "SELECT id, event_id, name, amount, quantity, created_at \
             FROM ticket_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn count_tickets(&self, ticket_type_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tickets WHERE ticket_type_id = $1")
            .bind(ticket_type_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn create_ticket(&self, ticket: &Ticket) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO tickets (id, event_id, ticket_type_id, buyer_firstname, buyer_lastname, \
             buyer_address, purchased_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(ticket.id)
        .bind(ticket.event_id)
        .bind(ticket.ticket_type_id)
        .bind(&ticket.buyer.firstname)
        .bind(&ticket.buyer.lastname)
        .bind(&ticket.buyer.address)
        .bind(ticket.purchased_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
