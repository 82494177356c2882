use std::sync::Arc;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    DEFAULT_JOB_COST_MINOR, Engine, EngineError, NewProvider, NewUser, PaymentStatus,
    RequestStatus, requests, transactions, users,
};
use migration::MigratorTrait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    (Engine::new(db.clone()), db)
}

async fn engine_with_file_db() -> (Engine, DatabaseConnection, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("lifecycle_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    (Engine::new(db.clone()), db, path)
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        name: "Alice".to_string(),
        email: email.to_string(),
        phone: "555-0100".to_string(),
        address: "1 Main St".to_string(),
        password: "password".to_string(),
    }
}

fn new_provider(email: &str, work: &str) -> NewProvider {
    NewProvider {
        name: "Bob".to_string(),
        email: email.to_string(),
        phone: "555-0200".to_string(),
        address: "2 High St".to_string(),
        work: work.to_string(),
        password: "password".to_string(),
    }
}

#[tokio::test]
async fn register_then_authenticate_roundtrip() {
    let (engine, _db) = engine_with_db().await;

    let user_id = engine.register_user(new_user("alice@example.com")).await.unwrap();
    let user = engine
        .authenticate_user("alice@example.com", "password")
        .await
        .unwrap();
    assert_eq!(user.id, user_id);
    assert_eq!(user.name, "Alice");

    let provider_id = engine
        .register_provider(new_provider("bob@example.com", "plumbing"))
        .await
        .unwrap();
    let provider = engine
        .authenticate_provider("bob@example.com", "password")
        .await
        .unwrap();
    assert_eq!(provider.id, provider_id);
    assert_eq!(provider.work, "plumbing");
}

#[tokio::test]
async fn register_hashes_the_password() {
    let (engine, db) = engine_with_db().await;

    engine.register_user(new_user("alice@example.com")).await.unwrap();
    let stored = users::Entity::find().one(&db).await.unwrap().unwrap();
    assert!(stored.password.starts_with("$argon2"));
    assert_ne!(stored.password, "password");
}

#[tokio::test]
async fn duplicate_email_rejected_without_a_row() {
    let (engine, db) = engine_with_db().await;

    engine.register_user(new_user("alice@example.com")).await.unwrap();
    let err = engine
        .register_user(new_user("alice@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("alice@example.com".to_string()));

    let rows = users::Entity::find().all(&db).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn register_rejects_missing_fields() {
    let (engine, _db) = engine_with_db().await;

    let mut incomplete = new_user("alice@example.com");
    incomplete.phone = "  ".to_string();
    let err = engine.register_user(incomplete).await.unwrap_err();
    assert_eq!(err, EngineError::MissingField("phone".to_string()));
}

#[tokio::test]
async fn authenticate_rejects_bad_credentials() {
    let (engine, _db) = engine_with_db().await;
    engine.register_user(new_user("alice@example.com")).await.unwrap();

    let err = engine
        .authenticate_user("alice@example.com", "wrong")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidCredentials);

    let err = engine
        .authenticate_user("nobody@example.com", "password")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidCredentials);
}

#[tokio::test]
async fn legacy_plaintext_login_upgrades_to_hash() {
    let (engine, db) = engine_with_db().await;

    // A row created before hashing was introduced.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (name, email, password, phone, address) VALUES (?, ?, ?, ?, ?)",
        vec![
            "Carol".into(),
            "carol@example.com".into(),
            "hunter2".into(),
            "555-0300".into(),
            "3 Low St".into(),
        ],
    ))
    .await
    .unwrap();

    let user = engine
        .authenticate_user("carol@example.com", "hunter2")
        .await
        .unwrap();
    assert!(user.password.starts_with("$argon2"));

    // The upgraded credential keeps working; the plaintext path is gone.
    let stored = users::Entity::find_by_id(user.id).one(&db).await.unwrap().unwrap();
    assert!(stored.password.starts_with("$argon2"));
    engine
        .authenticate_user("carol@example.com", "hunter2")
        .await
        .unwrap();
    let err = engine
        .authenticate_user("carol@example.com", stored.password.as_str())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidCredentials);
}

#[tokio::test]
async fn submit_creates_a_pending_request() {
    let (engine, _db) = engine_with_db().await;
    let user_id = engine.register_user(new_user("alice@example.com")).await.unwrap();

    let request = engine
        .submit_request(user_id, "a service nobody offers", "details")
        .await
        .unwrap();
    assert_eq!(request.status().unwrap(), RequestStatus::Pending);
    assert_eq!(request.provider_id, None);
    assert_eq!(request.cost_minor, 0);
    assert_eq!(request.user_id, user_id);
}

#[tokio::test]
async fn submit_rejects_missing_fields() {
    let (engine, _db) = engine_with_db().await;
    let user_id = engine.register_user(new_user("alice@example.com")).await.unwrap();

    let err = engine.submit_request(user_id, "", "leak").await.unwrap_err();
    assert_eq!(err, EngineError::MissingField("service_type".to_string()));

    let err = engine.submit_request(user_id, "plumbing", " ").await.unwrap_err();
    assert_eq!(err, EngineError::MissingField("details".to_string()));
}

#[tokio::test]
async fn available_requests_match_work_label_and_pending_status() {
    let (engine, _db) = engine_with_db().await;
    let user_id = engine.register_user(new_user("alice@example.com")).await.unwrap();
    let plumber_id = engine
        .register_provider(new_provider("bob@example.com", "plumbing"))
        .await
        .unwrap();
    engine
        .register_provider(new_provider("eve@example.com", "electrics"))
        .await
        .unwrap();

    let first = engine
        .submit_request(user_id, "plumbing", "leak under sink")
        .await
        .unwrap();
    let second = engine
        .submit_request(user_id, "plumbing", "dripping tap")
        .await
        .unwrap();
    engine
        .submit_request(user_id, "electrics", "dead socket")
        .await
        .unwrap();

    // An assigned request must drop out of the listing.
    engine.accept_request(first.id, plumber_id).await.unwrap();

    let available = engine.available_requests(plumber_id).await.unwrap();
    let ids: Vec<i64> = available.iter().map(|a| a.request.id).collect();
    assert_eq!(ids, vec![second.id]);
    assert_eq!(available[0].user_name.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn accept_assigns_and_records_one_transaction() {
    let (engine, db) = engine_with_db().await;
    let user_id = engine.register_user(new_user("alice@example.com")).await.unwrap();
    let provider_id = engine
        .register_provider(new_provider("bob@example.com", "plumbing"))
        .await
        .unwrap();
    let request = engine
        .submit_request(user_id, "plumbing", "leak")
        .await
        .unwrap();

    let payment = engine.accept_request(request.id, provider_id).await.unwrap();
    assert_eq!(payment.request_id, request.id);
    assert_eq!(payment.provider_id, provider_id);
    assert_eq!(payment.amount_minor, DEFAULT_JOB_COST_MINOR);
    assert_eq!(
        PaymentStatus::try_from(payment.status.as_str()).unwrap(),
        PaymentStatus::Pending
    );
    assert_eq!(payment.external_ref, None);

    let accepted = requests::Entity::find_by_id(request.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(accepted.status().unwrap(), RequestStatus::Assigned);
    assert_eq!(accepted.provider_id, Some(provider_id));
    assert_eq!(accepted.cost_minor, DEFAULT_JOB_COST_MINOR);

    // The loser of a second accept changes nothing.
    let other_provider = engine
        .register_provider(new_provider("eve@example.com", "plumbing"))
        .await
        .unwrap();
    let err = engine
        .accept_request(request.id, other_provider)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::AlreadyAssigned(request.id.to_string()));

    let unchanged = requests::Entity::find_by_id(request.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.provider_id, Some(provider_id));

    let payments = transactions::Entity::find()
        .filter(transactions::Column::RequestId.eq(request.id))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(payments.len(), 1);
}

#[tokio::test]
async fn accept_missing_request_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let provider_id = engine
        .register_provider(new_provider("bob@example.com", "plumbing"))
        .await
        .unwrap();

    let err = engine.accept_request(9999, provider_id).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("request not exists".to_string()));
}

#[tokio::test]
async fn history_is_newest_first_and_annotated() {
    let (engine, _db) = engine_with_db().await;
    let user_id = engine.register_user(new_user("alice@example.com")).await.unwrap();
    let other_id = engine.register_user(new_user("dan@example.com")).await.unwrap();
    let provider_id = engine
        .register_provider(new_provider("bob@example.com", "plumbing"))
        .await
        .unwrap();

    let first = engine
        .submit_request(user_id, "plumbing", "leak")
        .await
        .unwrap();
    let second = engine
        .submit_request(user_id, "gardening", "hedge")
        .await
        .unwrap();
    engine
        .submit_request(other_id, "plumbing", "not alice's")
        .await
        .unwrap();

    engine.accept_request(first.id, provider_id).await.unwrap();

    let history = engine.history(user_id).await.unwrap();
    let ids: Vec<i64> = history.iter().map(|h| h.request.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert_eq!(history[0].provider_name, None);
    assert_eq!(history[1].provider_name.as_deref(), Some("Bob"));
}

#[tokio::test]
async fn payment_context_checks_ownership() {
    let (engine, _db) = engine_with_db().await;
    let user_id = engine.register_user(new_user("alice@example.com")).await.unwrap();
    let other_id = engine.register_user(new_user("dan@example.com")).await.unwrap();
    let request = engine
        .submit_request(user_id, "plumbing", "leak")
        .await
        .unwrap();

    let context = engine.payment_context(request.id, user_id).await.unwrap();
    assert_eq!(context.id, request.id);

    let err = engine.payment_context(request.id, other_id).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::Forbidden("request belongs to another user".to_string())
    );

    let err = engine.payment_context(9999, user_id).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("request not exists".to_string()));
}

#[tokio::test]
async fn concurrent_accepts_have_exactly_one_winner() {
    let (engine, db, path) = engine_with_file_db().await;
    let engine = Arc::new(engine);

    let user_id = engine.register_user(new_user("alice@example.com")).await.unwrap();
    let request = engine
        .submit_request(user_id, "plumbing", "leak")
        .await
        .unwrap();

    let mut provider_ids = Vec::new();
    for n in 0..4 {
        let id = engine
            .register_provider(new_provider(&format!("p{n}@example.com"), "plumbing"))
            .await
            .unwrap();
        provider_ids.push(id);
    }

    let mut tasks = tokio::task::JoinSet::new();
    for provider_id in provider_ids {
        let engine = Arc::clone(&engine);
        let request_id = request.id;
        tasks.spawn(async move { engine.accept_request(request_id, provider_id).await });
    }

    let mut winners = 0;
    let mut losers = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap() {
            Ok(_) => winners += 1,
            Err(EngineError::AlreadyAssigned(_)) => losers += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(losers, 3);

    let payments = transactions::Entity::find()
        .filter(transactions::Column::RequestId.eq(request.id))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].amount_minor, DEFAULT_JOB_COST_MINOR);

    drop(db);
    let _ = std::fs::remove_file(path);
}
