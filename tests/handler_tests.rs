use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::http::StatusCode;
use gatherly::{
    AppConfig, AppState, RateLimiters,
    auth::AuthUser,
    handlers,
    models::{
        AddPhotoRequest, Album, AnswerPollRequest, Buyer, BuyTicketRequest, Choice,
        CommentPhotoRequest, CreateAlbumRequest, CreateEventRequest, CreateGroupRequest,
        CreatePollRequest, CreateThreadRequest, CreateTicketTypeRequest, Event, Group,
        LoginRequest, Poll, PostMessageRequest, QuestionInput, RegisterRequest, Thread, Ticket,
        TicketType, User,
    },
    repository::Repository,
    validate::ValidatedJson,
};
use uuid::Uuid;

// --- Mock repository ---

// In-memory Repository backed by hash maps, so handlers run against real
// state transitions without a database. Unique indexes are emulated by
// returning the same database error shape the Postgres driver produces,
// which exercises the 409 translation path end to end.

#[derive(Debug)]
struct UniqueViolation(&'static str);

impl std::fmt::Display for UniqueViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "duplicate key value violates unique constraint \"{}\"", self.0)
    }
}

impl std::error::Error for UniqueViolation {}

impl sqlx::error::DatabaseError for UniqueViolation {
    fn message(&self) -> &str {
        "duplicate key value violates unique constraint"
    }

    fn kind(&self) -> sqlx::error::ErrorKind {
        sqlx::error::ErrorKind::UniqueViolation
    }

    fn constraint(&self) -> Option<&str> {
        Some(self.0)
    }

    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self
    }
}

fn unique_violation(constraint: &'static str) -> sqlx::Error {
    sqlx::Error::Database(Box::new(UniqueViolation(constraint)))
}

#[derive(Default)]
struct MockRepo {
    users: Mutex<HashMap<Uuid, User>>,
    events: Mutex<HashMap<Uuid, Event>>,
    groups: Mutex<HashMap<Uuid, Group>>,
    threads: Mutex<HashMap<Uuid, Thread>>,
    albums: Mutex<HashMap<Uuid, Album>>,
    polls: Mutex<HashMap<Uuid, Poll>>,
    ticket_types: Mutex<HashMap<Uuid, TicketType>>,
    tickets: Mutex<Vec<Ticket>>,
}

#[async_trait]
impl Repository for MockRepo {
    async fn create_user(&self, user: &User) -> Result<(), sqlx::Error> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == user.email) {
            return Err(unique_violation("users_email_key"));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        Ok(self.users.lock().unwrap().remove(&id).is_some())
    }

    async fn create_event(&self, event: &Event) -> Result<(), sqlx::Error> {
        self.events.lock().unwrap().insert(event.id, event.clone());
        Ok(())
    }

    async fn get_event(&self, id: Uuid) -> Result<Option<Event>, sqlx::Error> {
        Ok(self.events.lock().unwrap().get(&id).cloned())
    }

    async fn update_event_members(&self, event: &Event) -> Result<(), sqlx::Error> {
        self.events.lock().unwrap().insert(event.id, event.clone());
        Ok(())
    }

    async fn create_group(&self, group: &Group) -> Result<(), sqlx::Error> {
        self.groups.lock().unwrap().insert(group.id, group.clone());
        Ok(())
    }

    async fn get_group(&self, id: Uuid) -> Result<Option<Group>, sqlx::Error> {
        Ok(self.groups.lock().unwrap().get(&id).cloned())
    }

    async fn update_group_members(&self, group: &Group) -> Result<(), sqlx::Error> {
        self.groups.lock().unwrap().insert(group.id, group.clone());
        Ok(())
    }

    async fn create_thread(&self, thread: &Thread) -> Result<(), sqlx::Error> {
        self.threads.lock().unwrap().insert(thread.id, thread.clone());
        Ok(())
    }

    async fn get_thread(&self, id: Uuid) -> Result<Option<Thread>, sqlx::Error> {
        Ok(self.threads.lock().unwrap().get(&id).cloned())
    }

    async fn update_thread_messages(&self, thread: &Thread) -> Result<(), sqlx::Error> {
        self.threads.lock().unwrap().insert(thread.id, thread.clone());
        Ok(())
    }

    async fn create_album(&self, album: &Album) -> Result<(), sqlx::Error> {
        self.albums.lock().unwrap().insert(album.id, album.clone());
        Ok(())
    }

    async fn get_album(&self, id: Uuid) -> Result<Option<Album>, sqlx::Error> {
        Ok(self.albums.lock().unwrap().get(&id).cloned())
    }

    async fn update_album_photos(&self, album: &Album) -> Result<(), sqlx::Error> {
        self.albums.lock().unwrap().insert(album.id, album.clone());
        Ok(())
    }

    async fn create_poll(&self, poll: &Poll) -> Result<(), sqlx::Error> {
        self.polls.lock().unwrap().insert(poll.id, poll.clone());
        Ok(())
    }

    async fn get_poll(&self, id: Uuid) -> Result<Option<Poll>, sqlx::Error> {
        Ok(self.polls.lock().unwrap().get(&id).cloned())
    }

    async fn update_poll_answers(&self, poll: &Poll) -> Result<(), sqlx::Error> {
        self.polls.lock().unwrap().insert(poll.id, poll.clone());
        Ok(())
    }

    async fn create_ticket_type(&self, ticket_type: &TicketType) -> Result<(), sqlx::Error> {
        let mut types = self.ticket_types.lock().unwrap();
        if types
            .values()
            .any(|tt| tt.event_id == ticket_type.event_id && tt.name == ticket_type.name)
        {
            return Err(unique_violation("ticket_types_event_id_name_key"));
        }
        types.insert(ticket_type.id, ticket_type.clone());
        Ok(())
    }

    async fn get_ticket_type(&self, id: Uuid) -> Result<Option<TicketType>, sqlx::Error> {
        Ok(self.ticket_types.lock().unwrap().get(&id).cloned())
    }

    async fn count_tickets(&self, ticket_type_id: Uuid) -> Result<i64, sqlx::Error> {
        Ok(self
            .tickets
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.ticket_type_id == ticket_type_id)
            .count() as i64)
    }

    async fn create_ticket(&self, ticket: &Ticket) -> Result<(), sqlx::Error> {
        let mut tickets = self.tickets.lock().unwrap();
        if tickets.iter().any(|t| {
            t.event_id == ticket.event_id
                && t.buyer.firstname == ticket.buyer.firstname
                && t.buyer.lastname == ticket.buyer.lastname
                && t.buyer.address == ticket.buyer.address
        }) {
            return Err(unique_violation("tickets_event_id_buyer_key"));
        }
        tickets.push(ticket.clone());
        Ok(())
    }
}

// --- Helpers ---

fn test_state() -> (Arc<MockRepo>, AppState) {
    let repo = Arc::new(MockRepo::default());
    let config = AppConfig::default();
    let limits = RateLimiters::new(config.rate_limit, config.auth_rate_limit);
    let state = AppState {
        repo: repo.clone(),
        config,
        limits,
    };
    (repo, state)
}

fn as_user(id: Uuid) -> AuthUser {
    AuthUser {
        id,
        role: "user".to_string(),
    }
}

fn as_admin(id: Uuid) -> AuthUser {
    AuthUser {
        id,
        role: "admin".to_string(),
    }
}

fn register_payload(email: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: "hunter2hunter2".to_string(),
        firstname: "Alice".to_string(),
        lastname: "Archer".to_string(),
        ..Default::default()
    }
}

fn event_payload() -> CreateEventRequest {
    CreateEventRequest {
        name: "Launch party".to_string(),
        description: String::new(),
        start_date: chrono::Utc::now(),
        end_date: chrono::Utc::now() + chrono::Duration::hours(4),
        location: "Warehouse 9".to_string(),
        cover_photo: String::new(),
        visibility: "public".to_string(),
        organisers: vec![],
        participants: vec![],
        group_id: None,
        ticketing_enabled: false,
        shopping_list_enabled: false,
        carpool_enabled: false,
    }
}

fn group_payload() -> CreateGroupRequest {
    CreateGroupRequest {
        name: "Hikers".to_string(),
        description: String::new(),
        icon: String::new(),
        cover_photo: String::new(),
        kind: "public".to_string(),
        allow_member_posts: true,
        allow_member_create_events: false,
        members: vec![],
    }
}

async fn seed_event(state: &AppState, organiser: Uuid, payload: CreateEventRequest) -> Event {
    let (status, json) = handlers::events::create(as_user(organiser), state_of(state), ValidatedJson(payload))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    json.0
}

fn state_of(state: &AppState) -> axum::extract::State<AppState> {
    axum::extract::State(state.clone())
}

// --- Auth handlers ---

#[tokio::test]
async fn register_creates_user_and_hides_hash() {
    let (repo, state) = test_state();

    let (status, json) = handlers::auth::register(
        state_of(&state),
        ValidatedJson(register_payload("Alice@Example.COM")),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    let user = json.0;
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.role, "user");
    assert!(!user.password_hash.is_empty());

    // The hash never appears in the serialized form.
    let body = serde_json::to_value(&user).unwrap();
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("password_hash").is_none());

    assert!(repo.users.lock().unwrap().contains_key(&user.id));
}

#[tokio::test]
async fn register_duplicate_email_conflicts() {
    let (_repo, state) = test_state();

    handlers::auth::register(state_of(&state), ValidatedJson(register_payload("a@b.com")))
        .await
        .unwrap();

    let err = handlers::auth::register(state_of(&state), ValidatedJson(register_payload("a@b.com")))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_succeeds_and_rejects_bad_credentials() {
    let (_repo, state) = test_state();

    handlers::auth::register(state_of(&state), ValidatedJson(register_payload("a@b.com")))
        .await
        .unwrap();

    let response = handlers::auth::login(
        state_of(&state),
        ValidatedJson(LoginRequest {
            email: "a@b.com".to_string(),
            password: "hunter2hunter2".to_string(),
        }),
    )
    .await
    .unwrap();
    assert!(!response.0.token.is_empty());
    assert_eq!(response.0.user.email, "a@b.com");

    // Wrong password and unknown email are indistinguishable.
    let wrong_password = handlers::auth::login(
        state_of(&state),
        ValidatedJson(LoginRequest {
            email: "a@b.com".to_string(),
            password: "not the password".to_string(),
        }),
    )
    .await
    .unwrap_err();
    let unknown_email = handlers::auth::login(
        state_of(&state),
        ValidatedJson(LoginRequest {
            email: "nobody@b.com".to_string(),
            password: "hunter2hunter2".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

// --- Users ---

#[tokio::test]
async fn delete_user_is_admin_gated() {
    let (_repo, state) = test_state();

    let (_, json) = handlers::auth::register(
        state_of(&state),
        ValidatedJson(register_payload("victim@b.com")),
    )
    .await
    .unwrap();
    let victim = json.0;

    let err = handlers::users::delete_by_id(
        as_user(Uuid::new_v4()),
        state_of(&state),
        axum::extract::Path(victim.id),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    let status = handlers::users::delete_by_id(
        as_admin(Uuid::new_v4()),
        state_of(&state),
        axum::extract::Path(victim.id),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Already gone.
    let err = handlers::users::delete_by_id(
        as_admin(Uuid::new_v4()),
        state_of(&state),
        axum::extract::Path(victim.id),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

// --- Groups ---

#[tokio::test]
async fn group_creator_is_admin_and_member() {
    let (_repo, state) = test_state();
    let creator = Uuid::new_v4();
    let friend = Uuid::new_v4();

    let mut payload = group_payload();
    // The creator listed twice must not duplicate.
    payload.members = vec![friend, creator];

    let (status, json) = handlers::groups::create(as_user(creator), state_of(&state), ValidatedJson(payload))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let group = json.0;
    assert_eq!(group.admins, vec![creator]);
    assert_eq!(group.members, vec![creator, friend]);
}

#[tokio::test]
async fn group_join_is_idempotent() {
    let (_repo, state) = test_state();
    let creator = Uuid::new_v4();
    let joiner = Uuid::new_v4();

    let (_, json) = handlers::groups::create(
        as_user(creator),
        state_of(&state),
        ValidatedJson(group_payload()),
    )
    .await
    .unwrap();
    let group = json.0;

    let first = handlers::groups::join(as_user(joiner), state_of(&state), axum::extract::Path(group.id))
        .await
        .unwrap();
    let second = handlers::groups::join(as_user(joiner), state_of(&state), axum::extract::Path(group.id))
        .await
        .unwrap();
    assert_eq!(first.0.members, second.0.members);
    assert_eq!(second.0.members, vec![creator, joiner]);
}

#[tokio::test]
async fn last_group_admin_cannot_leave() {
    let (repo, state) = test_state();
    let creator = Uuid::new_v4();

    let (_, json) = handlers::groups::create(
        as_user(creator),
        state_of(&state),
        ValidatedJson(group_payload()),
    )
    .await
    .unwrap();
    let group = json.0;

    let err = handlers::groups::leave(as_user(creator), state_of(&state), axum::extract::Path(group.id))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);

    // Nothing was persisted by the rejected leave.
    let stored = repo.groups.lock().unwrap().get(&group.id).cloned().unwrap();
    assert_eq!(stored.admins, vec![creator]);
    assert!(stored.members.contains(&creator));
}

// --- Events ---

#[tokio::test]
async fn last_organiser_cannot_leave_but_participant_can() {
    let (_repo, state) = test_state();
    let organiser = Uuid::new_v4();
    let participant = Uuid::new_v4();

    let event = seed_event(&state, organiser, event_payload()).await;
    assert_eq!(event.organisers, vec![organiser]);
    assert_eq!(event.participants, vec![organiser]);

    handlers::events::join(as_user(participant), state_of(&state), axum::extract::Path(event.id))
        .await
        .unwrap();

    let after = handlers::events::leave(
        as_user(participant),
        state_of(&state),
        axum::extract::Path(event.id),
    )
    .await
    .unwrap();
    assert!(!after.0.participants.contains(&participant));

    let err = handlers::events::leave(
        as_user(organiser),
        state_of(&state),
        axum::extract::Path(event.id),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);
}

// --- Threads ---

#[tokio::test]
async fn thread_messages_and_replies() {
    let (_repo, state) = test_state();
    let author = Uuid::new_v4();

    let (_, json) = handlers::threads::create(
        as_user(author),
        state_of(&state),
        ValidatedJson(CreateThreadRequest {
            group_id: Some(Uuid::new_v4()),
            event_id: None,
        }),
    )
    .await
    .unwrap();
    let thread = json.0;
    assert!(thread.messages.is_empty());

    let (status, json) = handlers::threads::add_message(
        as_user(author),
        state_of(&state),
        axum::extract::Path(thread.id),
        ValidatedJson(PostMessageRequest {
            text: "first!".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let thread = json.0;
    assert_eq!(thread.messages.len(), 1);
    assert_eq!(thread.messages[0].author, author);

    // Replying to a message that does not exist is a 404.
    let err = handlers::threads::reply(
        as_user(author),
        state_of(&state),
        axum::extract::Path((thread.id, Uuid::new_v4())),
        ValidatedJson(PostMessageRequest {
            text: "into the void".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);

    let (_, json) = handlers::threads::reply(
        as_user(author),
        state_of(&state),
        axum::extract::Path((thread.id, thread.messages[0].id)),
        ValidatedJson(PostMessageRequest {
            text: "welcome".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(json.0.messages[0].replies.len(), 1);
}

// --- Albums ---

#[tokio::test]
async fn album_photos_and_comments() {
    let (_repo, state) = test_state();
    let poster = Uuid::new_v4();

    let (_, json) = handlers::albums::create(
        as_user(poster),
        state_of(&state),
        ValidatedJson(CreateAlbumRequest {
            event_id: Uuid::new_v4(),
            name: "Day one".to_string(),
        }),
    )
    .await
    .unwrap();
    let album = json.0;

    let (_, json) = handlers::albums::add_photo(
        as_user(poster),
        state_of(&state),
        axum::extract::Path(album.id),
        ValidatedJson(AddPhotoRequest {
            url: "https://cdn.example.com/1.jpg".to_string(),
        }),
    )
    .await
    .unwrap();
    let album = json.0;
    assert_eq!(album.photos.len(), 1);
    assert_eq!(album.photos[0].posted_by, poster);

    let err = handlers::albums::comment(
        as_user(poster),
        state_of(&state),
        axum::extract::Path((album.id, Uuid::new_v4())),
        ValidatedJson(CommentPhotoRequest {
            text: "nice".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);

    let (_, json) = handlers::albums::comment(
        as_user(poster),
        state_of(&state),
        axum::extract::Path((album.id, album.photos[0].id)),
        ValidatedJson(CommentPhotoRequest {
            text: "nice".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(json.0.photos[0].comments.len(), 1);
}

// --- Polls ---

fn poll_payload(event_id: Uuid) -> CreatePollRequest {
    CreatePollRequest {
        event_id,
        title: "Dinner options".to_string(),
        questions: vec![QuestionInput {
            question: "Pizza or pasta?".to_string(),
            options: vec!["Pizza".to_string(), "Pasta".to_string()],
        }],
    }
}

#[tokio::test]
async fn poll_creation_is_organiser_gated() {
    let (_repo, state) = test_state();
    let organiser = Uuid::new_v4();
    let outsider = Uuid::new_v4();

    let event = seed_event(&state, organiser, event_payload()).await;

    let err = handlers::polls::create(
        as_user(outsider),
        state_of(&state),
        ValidatedJson(poll_payload(event.id)),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    let (status, json) = handlers::polls::create(
        as_user(organiser),
        state_of(&state),
        ValidatedJson(poll_payload(event.id)),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json.0.created_by, organiser);
    assert_eq!(json.0.questions.len(), 1);
}

#[tokio::test]
async fn poll_answers_enforce_membership_bounds_and_single_answer() {
    let (_repo, state) = test_state();
    let organiser = Uuid::new_v4();
    let participant = Uuid::new_v4();
    let outsider = Uuid::new_v4();

    let event = seed_event(&state, organiser, event_payload()).await;
    handlers::events::join(as_user(participant), state_of(&state), axum::extract::Path(event.id))
        .await
        .unwrap();

    let (_, json) = handlers::polls::create(
        as_user(organiser),
        state_of(&state),
        ValidatedJson(poll_payload(event.id)),
    )
    .await
    .unwrap();
    let poll = json.0;
    let question_id = poll.questions[0].id;

    let valid_choice = AnswerPollRequest {
        choices: vec![Choice {
            question_id,
            option_index: 1,
        }],
    };

    // Non-participants cannot answer.
    let err = handlers::polls::answer(
        as_user(outsider),
        state_of(&state),
        axum::extract::Path(poll.id),
        ValidatedJson(valid_choice.clone()),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    // Unknown question id.
    let err = handlers::polls::answer(
        as_user(participant),
        state_of(&state),
        axum::extract::Path(poll.id),
        ValidatedJson(AnswerPollRequest {
            choices: vec![Choice {
                question_id: Uuid::new_v4(),
                option_index: 0,
            }],
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    // Option index out of range.
    let err = handlers::polls::answer(
        as_user(participant),
        state_of(&state),
        axum::extract::Path(poll.id),
        ValidatedJson(AnswerPollRequest {
            choices: vec![Choice {
                question_id,
                option_index: 2,
            }],
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    // A valid answer lands.
    let (status, json) = handlers::polls::answer(
        as_user(participant),
        state_of(&state),
        axum::extract::Path(poll.id),
        ValidatedJson(valid_choice.clone()),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json.0.answers.len(), 1);
    assert_eq!(json.0.answers[0].participant, participant);

    // Answering twice conflicts.
    let err = handlers::polls::answer(
        as_user(participant),
        state_of(&state),
        axum::extract::Path(poll.id),
        ValidatedJson(valid_choice),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);
}

// --- Tickets ---

fn ticketed_event_payload() -> CreateEventRequest {
    CreateEventRequest {
        ticketing_enabled: true,
        ..event_payload()
    }
}

fn buyer(n: u32) -> Buyer {
    Buyer {
        firstname: format!("Buyer{n}"),
        lastname: "Smith".to_string(),
        address: "1 Long Street, Springfield".to_string(),
    }
}

#[tokio::test]
async fn ticket_type_requires_ticketing_and_organiser() {
    let (_repo, state) = test_state();
    let organiser = Uuid::new_v4();

    // Ticketing disabled.
    let plain = seed_event(&state, organiser, event_payload()).await;
    let err = handlers::tickets::create_type(
        as_user(organiser),
        state_of(&state),
        ValidatedJson(CreateTicketTypeRequest {
            event_id: plain.id,
            name: "Standard".to_string(),
            amount: 10.0,
            quantity: 5,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);

    // Private events cannot sell tickets either, even with the flag on.
    let private = seed_event(
        &state,
        organiser,
        CreateEventRequest {
            visibility: "private".to_string(),
            ..ticketed_event_payload()
        },
    )
    .await;
    let err = handlers::tickets::create_type(
        as_user(organiser),
        state_of(&state),
        ValidatedJson(CreateTicketTypeRequest {
            event_id: private.id,
            name: "Standard".to_string(),
            amount: 10.0,
            quantity: 5,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);

    // Non-organisers are rejected after the ticketing gate.
    let open = seed_event(&state, organiser, ticketed_event_payload()).await;
    let err = handlers::tickets::create_type(
        as_user(Uuid::new_v4()),
        state_of(&state),
        ValidatedJson(CreateTicketTypeRequest {
            event_id: open.id,
            name: "Standard".to_string(),
            amount: 10.0,
            quantity: 5,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    // The organiser succeeds; a duplicate tier name conflicts.
    let (status, _) = handlers::tickets::create_type(
        as_user(organiser),
        state_of(&state),
        ValidatedJson(CreateTicketTypeRequest {
            event_id: open.id,
            name: "Standard".to_string(),
            amount: 10.0,
            quantity: 5,
        }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);

    let err = handlers::tickets::create_type(
        as_user(organiser),
        state_of(&state),
        ValidatedJson(CreateTicketTypeRequest {
            event_id: open.id,
            name: "Standard".to_string(),
            amount: 12.0,
            quantity: 5,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn ticket_purchase_gates_stock_and_repeat_buyers() {
    let (_repo, state) = test_state();
    let organiser = Uuid::new_v4();

    let event = seed_event(&state, organiser, ticketed_event_payload()).await;
    let other_event = seed_event(&state, organiser, ticketed_event_payload()).await;

    let (_, json) = handlers::tickets::create_type(
        as_user(organiser),
        state_of(&state),
        ValidatedJson(CreateTicketTypeRequest {
            event_id: event.id,
            name: "Standard".to_string(),
            amount: 10.0,
            quantity: 2,
        }),
    )
    .await
    .unwrap();
    let tier = json.0;

    // A tier belonging to a different event is a bad reference, not a 404.
    let err = handlers::tickets::buy(
        state_of(&state),
        ValidatedJson(BuyTicketRequest {
            event_id: other_event.id,
            ticket_type_id: tier.id,
            buyer: buyer(1),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    // Two purchases fit the quantity.
    for n in 1..=2 {
        let (status, _) = handlers::tickets::buy(
            state_of(&state),
            ValidatedJson(BuyTicketRequest {
                event_id: event.id,
                ticket_type_id: tier.id,
                buyer: buyer(n),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
    }

    // The third is sold out.
    let err = handlers::tickets::buy(
        state_of(&state),
        ValidatedJson(BuyTicketRequest {
            event_id: event.id,
            ticket_type_id: tier.id,
            buyer: buyer(3),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);
    assert_eq!(err.to_string(), "Sold out");
}

#[tokio::test]
async fn same_buyer_cannot_hold_two_tickets_for_one_event() {
    let (_repo, state) = test_state();
    let organiser = Uuid::new_v4();

    let event = seed_event(&state, organiser, ticketed_event_payload()).await;
    let (_, json) = handlers::tickets::create_type(
        as_user(organiser),
        state_of(&state),
        ValidatedJson(CreateTicketTypeRequest {
            event_id: event.id,
            name: "Standard".to_string(),
            amount: 10.0,
            quantity: 10,
        }),
    )
    .await
    .unwrap();
    let tier = json.0;

    handlers::tickets::buy(
        state_of(&state),
        ValidatedJson(BuyTicketRequest {
            event_id: event.id,
            ticket_type_id: tier.id,
            buyer: buyer(1),
        }),
    )
    .await
    .unwrap();

    let err = handlers::tickets::buy(
        state_of(&state),
        ValidatedJson(BuyTicketRequest {
            event_id: event.id,
            ticket_type_id: tier.id,
            buyer: buyer(1),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);
}
