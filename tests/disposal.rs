use async_trait::async_trait;
use keyed_di::{register, AsyncDispose, Dispose, Registration, Registry, Resolver};
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<String>>>;

struct Tracked {
    name: String,
    log: Log,
}

impl Dispose for Tracked {
    fn dispose(&self) {
        self.log.lock().unwrap().push(format!("sync:{}", self.name));
    }
}

struct AsyncTracked {
    name: String,
    log: Log,
}

#[async_trait]
impl AsyncDispose for AsyncTracked {
    async fn dispose(&self) {
        tokio::task::yield_now().await;
        self.log.lock().unwrap().push(format!("async:{}", self.name));
    }
}

fn tracked(name: &'static str, log: &Log) -> Registration {
    let log = log.clone();
    Registration::from_fn(move |ctx| {
        let service = Arc::new(Tracked {
            name: name.to_string(),
            log: log.clone(),
        });
        ctx.register_disposer(service.clone());
        service
    })
}

fn async_tracked(name: &'static str, log: &Log) -> Registration {
    let log = log.clone();
    Registration::from_fn(move |ctx| {
        let service = Arc::new(AsyncTracked {
            name: name.to_string(),
            log: log.clone(),
        });
        ctx.register_async_disposer(service.clone());
        service
    })
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

fn registry(log: &Log) -> Registry {
    register([
        ("global", tracked("global", log)),
        ("local", tracked("local", log).scoped()),
        ("temp", tracked("temp", log).transient()),
    ])
    .unwrap()
}

#[test]
fn scope_teardown_affects_only_that_scope() {
    let log = Log::default();
    let container = registry(&log).build();

    let s1 = container.scope();
    let s2 = container.scope();
    s1.get_required::<Arc<Tracked>>("global");
    s1.get_required::<Arc<Tracked>>("local");
    s2.get_required::<Arc<Tracked>>("local");

    s1.dispose();
    assert_eq!(entries(&log), vec!["sync:local"]);
    assert_eq!(s1.pending_disposers(), 0);
    assert_eq!(s2.pending_disposers(), 1);

    container.dispose_all();
    assert_eq!(entries(&log), vec!["sync:local", "sync:local", "sync:global"]);
}

#[test]
fn hooks_run_lifo_and_once() {
    let log = Log::default();
    let container = registry(&log).build();
    let scope = container.scope();

    scope.get_required::<Arc<Tracked>>("local");
    scope.get_required::<Arc<Tracked>>("temp");
    scope.get_required::<Arc<Tracked>>("temp");

    scope.dispose();
    scope.dispose();
    assert_eq!(entries(&log), vec!["sync:temp", "sync:temp", "sync:local"]);
}

#[test]
fn global_teardown_covers_root_and_scopes() {
    let log = Log::default();
    let container = registry(&log).build();

    container.get_required::<Arc<Tracked>>("local");
    let older = container.scope();
    older.get_required::<Arc<Tracked>>("temp");
    let newer = container.scope();
    newer.get_required::<Arc<Tracked>>("local");
    newer.get_required::<Arc<Tracked>>("global");

    container.dispose_all();
    assert_eq!(
        entries(&log),
        vec!["sync:local", "sync:temp", "sync:local", "sync:global"]
    );
}

#[test]
fn scope_dispose_all_is_local() {
    let log = Log::default();
    let container = registry(&log).build();
    let scope = container.scope();

    scope.get_required::<Arc<Tracked>>("global");
    scope.get_required::<Arc<Tracked>>("local");

    scope.dispose_all();
    assert_eq!(entries(&log), vec!["sync:local"]);

    container.dispose_all();
    assert_eq!(entries(&log), vec!["sync:local", "sync:global"]);
}

#[test]
fn disposed_then_dropped_scope_runs_once() {
    let log = Log::default();
    let container = registry(&log).build();

    {
        let scope = container.scope();
        scope.get_required::<Arc<Tracked>>("local");
        scope.dispose();
    }
    container.dispose_all();
    assert_eq!(entries(&log), vec!["sync:local"]);
}

#[test]
fn undisposed_scope_hooks_survive_the_scope() {
    let log = Log::default();
    let container = registry(&log).build();

    let kept = {
        let scope = container.scope();
        scope.get_required::<Arc<Tracked>>("temp");
        scope.get_required::<Arc<Tracked>>("local")
    };
    let live = container.scope();
    live.get_required::<Arc<Tracked>>("local");
    container.get_required::<Arc<Tracked>>("global");
    assert!(log.lock().unwrap().is_empty());

    container.dispose_all();
    assert_eq!(
        entries(&log),
        vec!["sync:local", "sync:local", "sync:temp", "sync:global"]
    );
    assert_eq!(kept.name, "local");

    container.dispose_all();
    assert_eq!(entries(&log).len(), 4);
}

#[test]
fn values_can_be_registered_for_disposal() {
    let log = Log::default();
    let value = Arc::new(Tracked {
        name: "value".to_string(),
        log: log.clone(),
    });
    let container = register([("value", Registration::from_value(value.clone()))])
        .unwrap()
        .build();
    container.register_disposer(value);

    container.dispose_all();
    assert_eq!(entries(&log), vec!["sync:value"]);
}

#[tokio::test]
async fn async_hooks_run_before_sync_hooks() {
    let log = Log::default();
    let container = register([
        ("sync_first", tracked("sync_first", &log).scoped()),
        ("async_second", async_tracked("async_second", &log).scoped()),
        ("async_third", async_tracked("async_third", &log).scoped()),
    ])
    .unwrap()
    .build();

    let scope = container.scope();
    scope.get_required::<Arc<Tracked>>("sync_first");
    scope.get_required::<Arc<AsyncTracked>>("async_second");
    scope.get_required::<Arc<AsyncTracked>>("async_third");

    scope.dispose();
    assert_eq!(entries(&log), vec!["sync:sync_first"]);
    assert_eq!(scope.pending_disposers(), 2);

    scope.dispose_async().await;
    assert_eq!(
        entries(&log),
        vec!["sync:sync_first", "async:async_third", "async:async_second"]
    );
    assert_eq!(scope.pending_disposers(), 0);
}

#[tokio::test]
async fn global_async_teardown() {
    let log = Log::default();
    let container = register([
        ("client", async_tracked("client", &log)),
        ("cache", tracked("cache", &log)),
        ("session", async_tracked("session", &log).scoped()),
    ])
    .unwrap()
    .build();

    let scope = container.scope();
    scope.get_required::<Arc<AsyncTracked>>("session");
    container.get_required::<Arc<AsyncTracked>>("client");
    container.get_required::<Arc<Tracked>>("cache");

    container.dispose_all_async().await;
    assert_eq!(
        entries(&log),
        vec!["async:session", "async:client", "sync:cache"]
    );
}

#[tokio::test]
async fn undisposed_scope_async_hooks_survive_the_scope() {
    let log = Log::default();
    let container = register([
        ("session", async_tracked("session", &log).scoped()),
        ("buffer", tracked("buffer", &log).scoped()),
    ])
    .unwrap()
    .build();

    {
        let scope = container.scope();
        scope.get_required::<Arc<Tracked>>("buffer");
        scope.get_required::<Arc<AsyncTracked>>("session");
    }

    // The sync teardown leaves async hooks for the async one.
    container.dispose_all();
    assert_eq!(entries(&log), vec!["sync:buffer"]);

    container.dispose_all_async().await;
    assert_eq!(entries(&log), vec!["sync:buffer", "async:session"]);
}

#[tokio::test]
async fn disposal_future_is_send() {
    let log = Log::default();
    let container = registry(&log).build();
    container.get_required::<Arc<Tracked>>("global");

    let handle = tokio::spawn(async move {
        container.dispose_all_async().await;
    });
    handle.await.unwrap();
    assert_eq!(entries(&log), vec!["sync:global"]);
}
