use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serial_test::serial;
use shapecast_inject::{
    configure, reset, resolve, ConfigureOptions, FallbackResolver, FallbackUpdate, InjectError,
    Provider, ProvideFactory,
};
use shapecast_model::{Token, TypeKey, Value};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

struct CountingFactory {
    calls: AtomicI64,
}

#[async_trait]
impl ProvideFactory for CountingFactory {
    async fn produce(&self) -> shapecast_inject::InjectResult<Value> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Value::from(n))
    }
}

struct EchoFallback;

#[async_trait]
impl FallbackResolver for EchoFallback {
    async fn resolve(&self, token: &Token) -> Option<Value> {
        match token {
            Token::Named(name) if name.starts_with("echo.") => {
                Some(Value::from(name.trim_start_matches("echo.")))
            }
            _ => None,
        }
    }
}

// ── Static providers ─────────────────────────────────────────────

#[tokio::test]
#[serial]
async fn static_provider_resolves() {
    reset();
    configure(ConfigureOptions {
        providers: Some(vec![Provider::value(Token::named("greeting"), "hello")]),
        ..Default::default()
    });

    let v = resolve(&Token::named("greeting")).await.unwrap();
    assert_eq!(v, Value::from("hello"));
}

#[tokio::test]
#[serial]
async fn first_matching_provider_wins() {
    reset();
    configure(ConfigureOptions {
        providers: Some(vec![
            Provider::value(Token::named("db"), "primary"),
            Provider::value(Token::named("db"), "shadow"),
        ]),
        ..Default::default()
    });

    let v = resolve(&Token::named("db")).await.unwrap();
    assert_eq!(v, Value::from("primary"));
}

#[tokio::test]
#[serial]
async fn type_token_resolution() {
    reset();
    let key = TypeKey::new("Config");
    configure(ConfigureOptions {
        providers: Some(vec![Provider::value(Token::of_type(key), Value::from(42i64))]),
        ..Default::default()
    });

    let v = resolve(&Token::of_type(key)).await.unwrap();
    assert_eq!(v, Value::from(42i64));
}

// ── Factory providers never cache ────────────────────────────────

#[tokio::test]
#[serial]
async fn factory_invoked_fresh_on_every_resolution() {
    reset();
    let factory = Arc::new(CountingFactory {
        calls: AtomicI64::new(0),
    });
    configure(ConfigureOptions {
        providers: Some(vec![Provider::factory(Token::named("seq"), factory.clone())]),
        ..Default::default()
    });

    let a = resolve(&Token::named("seq")).await.unwrap();
    let b = resolve(&Token::named("seq")).await.unwrap();
    assert_ne!(a, b);
    assert_eq!(factory.calls.load(Ordering::SeqCst), 2);
}

// ── Fallback resolver ────────────────────────────────────────────

#[tokio::test]
#[serial]
async fn fallback_consulted_when_no_provider_matches() {
    reset();
    configure(ConfigureOptions {
        providers: Some(vec![]),
        fallback: FallbackUpdate::Set(Arc::new(EchoFallback)),
    });

    let v = resolve(&Token::named("echo.ping")).await.unwrap();
    assert_eq!(v, Value::from("ping"));
}

#[tokio::test]
#[serial]
async fn fallback_decline_yields_not_found() {
    reset();
    configure(ConfigureOptions {
        providers: Some(vec![]),
        fallback: FallbackUpdate::Set(Arc::new(EchoFallback)),
    });

    let err = resolve(&Token::named("other")).await.unwrap_err();
    match err {
        InjectError::NotFound { token } => assert_eq!(token, "other"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
#[serial]
async fn provider_beats_fallback() {
    reset();
    configure(ConfigureOptions {
        providers: Some(vec![Provider::value(Token::named("echo.x"), "direct")]),
        fallback: FallbackUpdate::Set(Arc::new(EchoFallback)),
    });

    let v = resolve(&Token::named("echo.x")).await.unwrap();
    assert_eq!(v, Value::from("direct"));
}

// ── Configure merge semantics ────────────────────────────────────

#[tokio::test]
#[serial]
async fn omitted_providers_are_retained() {
    reset();
    configure(ConfigureOptions {
        providers: Some(vec![Provider::value(Token::named("kept"), "yes")]),
        ..Default::default()
    });
    // Only touch the fallback; the provider table must survive.
    configure(ConfigureOptions {
        providers: None,
        fallback: FallbackUpdate::Set(Arc::new(EchoFallback)),
    });

    let v = resolve(&Token::named("kept")).await.unwrap();
    assert_eq!(v, Value::from("yes"));
}

#[tokio::test]
#[serial]
async fn empty_provider_list_clears_explicitly() {
    reset();
    configure(ConfigureOptions {
        providers: Some(vec![Provider::value(Token::named("gone"), "x")]),
        ..Default::default()
    });
    configure(ConfigureOptions {
        providers: Some(vec![]),
        ..Default::default()
    });

    assert!(resolve(&Token::named("gone")).await.is_err());
}

#[tokio::test]
#[serial]
async fn fallback_clear_removes_resolver() {
    reset();
    configure(ConfigureOptions {
        providers: Some(vec![]),
        fallback: FallbackUpdate::Set(Arc::new(EchoFallback)),
    });
    configure(ConfigureOptions {
        providers: None,
        fallback: FallbackUpdate::Clear,
    });

    assert!(resolve(&Token::named("echo.ping")).await.is_err());
}

// ── Error reporting ──────────────────────────────────────────────

#[tokio::test]
#[serial]
async fn not_found_names_type_token_by_declared_key() {
    reset();
    let err = resolve(&Token::of_type(TypeKey::new("Database"))).await.unwrap_err();
    assert_eq!(err.to_string(), "no provider found for token: Database");
}

#[tokio::test]
#[serial]
async fn unique_tokens_resolve_independently() {
    reset();
    let a = Token::unique();
    let b = Token::unique();
    configure(ConfigureOptions {
        providers: Some(vec![
            Provider::value(a.clone(), "a"),
            Provider::value(b.clone(), "b"),
        ]),
        ..Default::default()
    });

    assert_eq!(resolve(&a).await.unwrap(), Value::from("a"));
    assert_eq!(resolve(&b).await.unwrap(), Value::from("b"));
}
