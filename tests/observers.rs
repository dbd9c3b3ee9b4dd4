use keyed_di::{register, DiError, DiObserver, Key, Lifetime, Registration, Resolver, TracingObserver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl Recorder {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl DiObserver for Recorder {
    fn resolving(&self, key: &Key, lifetime: Lifetime) {
        self.events.lock().unwrap().push(format!("resolving {key} {lifetime}"));
    }

    fn resolved(&self, key: &Key, lifetime: Lifetime, _duration: Duration) {
        self.events.lock().unwrap().push(format!("resolved {key} {lifetime}"));
    }

    fn failed(&self, key: &Key, error: &DiError) {
        self.events.lock().unwrap().push(format!("failed {key}: {error}"));
    }
}

#[test]
fn observer_sees_instantiations_only() {
    let recorder = Arc::new(Recorder::default());
    let container = register([
        ("config", Registration::from_value(1u8)),
        (
            "service",
            Registration::from_fn(|deps| *deps.get_required::<u8>("config") + 1).scoped(),
        ),
    ])
    .unwrap()
    .with_observer(recorder.clone())
    .build();

    container.get_required::<u8>("service");
    container.get_required::<u8>("service");

    assert_eq!(
        recorder.events(),
        vec![
            "resolving service scoped",
            "resolving config singleton",
            "resolved config singleton",
            "resolved service scoped",
        ]
    );
}

#[test]
fn observer_sees_failures() {
    let recorder = Arc::new(Recorder::default());
    let container = register([(
        "broken",
        Registration::try_from_fn(|deps| deps.get::<u8>("ghost").map(|v| *v)),
    )])
    .unwrap()
    .with_observer(recorder.clone())
    .build();

    assert!(container.resolve("broken").is_err());
    assert_eq!(
        recorder.events(),
        vec!["resolving broken singleton", "failed broken: Service not found: ghost"]
    );
}

#[test]
fn tracing_observer_emits_through_subscriber() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("keyed_di=trace"))
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let container = register([
            ("a", Registration::from_value("a")),
            ("loop", Registration::try_from_fn(|deps| deps.get::<u8>("loop").map(|v| *v))),
        ])
        .unwrap()
        .with_observer(Arc::new(TracingObserver::with_level(tracing::Level::INFO)))
        .build();

        container.get_required::<&str>("a");
        assert!(container.resolve("loop").is_err());
    });
}
