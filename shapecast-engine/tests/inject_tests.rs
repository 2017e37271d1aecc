use async_trait::async_trait;
use serde_json::json;
use serial_test::serial;
use shapecast_engine::{parse, safe_parse, EngineError, ParseOptions};
use shapecast_inject::{
    configure, reset as reset_providers, ConfigureOptions, InjectResult, Provider, ProvideFactory,
};
use shapecast_model::{
    self as model, FieldDeclaration, Token, TypeDeclaration, TypeKey, Value,
};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

const SESSION: TypeKey = TypeKey::new("Session");

fn register_session(token: Token) {
    model::register(
        TypeDeclaration::builder(SESSION)
            .field(FieldDeclaration::string("user"))
            .field(FieldDeclaration::string("api_key").injected(token))
            .build()
            .unwrap(),
    );
}

struct TicketFactory {
    next: AtomicI64,
}

#[async_trait]
impl ProvideFactory for TicketFactory {
    async fn produce(&self) -> InjectResult<Value> {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        Ok(Value::from(format!("ticket-{n}")))
    }
}

// ── Injection during parse ───────────────────────────────────────

#[tokio::test]
#[serial]
async fn injected_field_resolved_from_registry() {
    model::reset();
    reset_providers();
    let token = Token::named("api_key");
    register_session(token.clone());
    configure(ConfigureOptions {
        providers: Some(vec![Provider::value(token, "k-123")]),
        ..Default::default()
    });

    let inst = parse(SESSION, &json!({"user": "joan"}), ParseOptions::default())
        .await
        .unwrap();
    assert_eq!(inst.get_str("api_key"), Some("k-123"));
}

#[tokio::test]
#[serial]
async fn injected_field_ignores_raw_input_value() {
    model::reset();
    reset_providers();
    let token = Token::named("api_key");
    register_session(token.clone());
    configure(ConfigureOptions {
        providers: Some(vec![Provider::value(token, "k-123")]),
        ..Default::default()
    });

    let inst = parse(
        SESSION,
        &json!({"user": "joan", "api_key": "spoofed"}),
        ParseOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(inst.get_str("api_key"), Some("k-123"));
}

#[tokio::test]
#[serial]
async fn resolution_failure_aborts_parse_with_distinct_error() {
    model::reset();
    reset_providers();
    register_session(Token::named("api_key"));

    let err = parse(SESSION, &json!({"user": "joan"}), ParseOptions::default())
        .await
        .unwrap_err();
    match err {
        EngineError::Inject(inner) => {
            assert_eq!(inner.to_string(), "no provider found for token: api_key");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
#[serial]
async fn resolution_failure_propagates_through_safe_parse() {
    model::reset();
    reset_providers();
    register_session(Token::named("api_key"));

    // Not a problem-shaped failure: safe_parse must keep it an error.
    assert!(
        safe_parse(SESSION, &json!({"user": "joan"}), ParseOptions::default())
            .await
            .is_err()
    );
}

#[tokio::test]
#[serial]
async fn factory_backed_injection_is_fresh_per_parse() {
    model::reset();
    reset_providers();
    let token = Token::named("api_key");
    register_session(token.clone());
    configure(ConfigureOptions {
        providers: Some(vec![Provider::factory(
            token,
            Arc::new(TicketFactory {
                next: AtomicI64::new(0),
            }),
        )]),
        ..Default::default()
    });

    let a = parse(SESSION, &json!({"user": "joan"}), ParseOptions::default())
        .await
        .unwrap();
    let b = parse(SESSION, &json!({"user": "joan"}), ParseOptions::default())
        .await
        .unwrap();
    assert_ne!(a.get_str("api_key"), b.get_str("api_key"));
}

#[tokio::test]
#[serial]
async fn unique_token_injection() {
    model::reset();
    reset_providers();
    let token = Token::unique();
    register_session(token.clone());
    configure(ConfigureOptions {
        providers: Some(vec![Provider::value(token, "minted")]),
        ..Default::default()
    });

    let inst = parse(SESSION, &json!({"user": "joan"}), ParseOptions::default())
        .await
        .unwrap();
    assert_eq!(inst.get_str("api_key"), Some("minted"));
}
