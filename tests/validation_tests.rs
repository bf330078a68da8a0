use chrono::{Duration, Utc};
use gatherly::{
    models::{
        BuyTicketRequest, Buyer, CreateEventRequest, CreateGroupRequest, CreatePollRequest,
        CreateThreadRequest, CreateTicketTypeRequest, PostMessageRequest, QuestionInput,
        RegisterRequest,
    },
    validate::ValidateBody,
};
use uuid::Uuid;

fn fields(result: Result<(), Vec<gatherly::validate::FieldViolation>>) -> Vec<String> {
    result
        .err()
        .unwrap_or_default()
        .into_iter()
        .map(|v| v.field)
        .collect()
}

#[test]
fn register_collects_all_violations() {
    let payload = RegisterRequest {
        email: "not-an-email".to_string(),
        password: "short".to_string(),
        firstname: "  ".to_string(),
        lastname: String::new(),
        ..Default::default()
    };

    let fields = fields(payload.validate());
    assert_eq!(fields, vec!["email", "password", "firstname", "lastname"]);
}

#[test]
fn register_accepts_valid_payload() {
    let payload = RegisterRequest {
        email: "alice@example.com".to_string(),
        password: "long enough".to_string(),
        firstname: "Alice".to_string(),
        lastname: "Archer".to_string(),
        ..Default::default()
    };
    assert!(payload.validate().is_ok());
}

#[test]
fn group_type_must_be_known() {
    let payload = CreateGroupRequest {
        name: "Hikers".to_string(),
        description: String::new(),
        icon: String::new(),
        cover_photo: String::new(),
        kind: "invite-only".to_string(),
        allow_member_posts: true,
        allow_member_create_events: false,
        members: vec![],
    };
    assert_eq!(fields(payload.validate()), vec!["type"]);
}

#[test]
fn event_end_must_not_precede_start() {
    let start = Utc::now();
    let payload = CreateEventRequest {
        name: "Backwards".to_string(),
        description: String::new(),
        start_date: start,
        end_date: start - Duration::hours(1),
        location: "Somewhere".to_string(),
        cover_photo: String::new(),
        visibility: "public".to_string(),
        organisers: vec![],
        participants: vec![],
        group_id: None,
        ticketing_enabled: false,
        shopping_list_enabled: false,
        carpool_enabled: false,
    };
    assert_eq!(fields(payload.validate()), vec!["endDate"]);
}

#[test]
fn thread_parent_is_exclusive() {
    // Neither parent.
    let neither = CreateThreadRequest {
        group_id: None,
        event_id: None,
    };
    assert!(neither.validate().is_err());

    // Both parents.
    let both = CreateThreadRequest {
        group_id: Some(Uuid::new_v4()),
        event_id: Some(Uuid::new_v4()),
    };
    assert!(both.validate().is_err());

    // Exactly one of each is fine.
    let group_only = CreateThreadRequest {
        group_id: Some(Uuid::new_v4()),
        event_id: None,
    };
    assert!(group_only.validate().is_ok());

    let event_only = CreateThreadRequest {
        group_id: None,
        event_id: Some(Uuid::new_v4()),
    };
    assert!(event_only.validate().is_ok());
}

#[test]
fn message_text_is_bounded() {
    assert!(
        PostMessageRequest {
            text: String::new()
        }
        .validate()
        .is_err()
    );
    assert!(
        PostMessageRequest {
            text: "x".repeat(2001)
        }
        .validate()
        .is_err()
    );
    assert!(
        PostMessageRequest {
            text: "hello".to_string()
        }
        .validate()
        .is_ok()
    );
}

#[test]
fn poll_violations_are_indexed_per_question() {
    let payload = CreatePollRequest {
        event_id: Uuid::new_v4(),
        title: "Options".to_string(),
        questions: vec![
            QuestionInput {
                question: "Fine?".to_string(),
                options: vec!["Yes".to_string(), "No".to_string()],
            },
            QuestionInput {
                question: String::new(),
                options: vec!["Only one".to_string()],
            },
            QuestionInput {
                question: "Blank option?".to_string(),
                options: vec!["Ok".to_string(), " ".to_string()],
            },
        ],
    };

    let fields = fields(payload.validate());
    assert_eq!(
        fields,
        vec![
            "questions[1].question",
            "questions[1].options",
            "questions[2].options[1]",
        ]
    );
}

#[test]
fn poll_requires_at_least_one_question() {
    let payload = CreatePollRequest {
        event_id: Uuid::new_v4(),
        title: "Empty".to_string(),
        questions: vec![],
    };
    assert_eq!(fields(payload.validate()), vec!["questions"]);
}

#[test]
fn ticket_type_amounts_must_be_non_negative() {
    let payload = CreateTicketTypeRequest {
        event_id: Uuid::new_v4(),
        name: "Standard".to_string(),
        amount: -1.0,
        quantity: -5,
    };
    assert_eq!(fields(payload.validate()), vec!["amount", "quantity"]);
}

#[test]
fn buyer_identity_is_fully_required() {
    let payload = BuyTicketRequest {
        event_id: Uuid::new_v4(),
        ticket_type_id: Uuid::new_v4(),
        buyer: Buyer {
            firstname: String::new(),
            lastname: "Smith".to_string(),
            address: "abc".to_string(),
        },
    };
    assert_eq!(
        fields(payload.validate()),
        vec!["buyer.firstname", "buyer.address"]
    );
}
