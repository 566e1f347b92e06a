//! di-container 集中集成测试

use di_container::{ConflictPolicy, ServiceCollection};
use host_common::{DependencyError, Lifetime, RegistryError, ResolverExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// 测试服务
#[derive(Debug, Default)]
struct AuditLog {
    entries: Vec<String>,
}

#[derive(Debug)]
struct RequestContext {
    request_id: u64,
}

#[test]
fn lifetimes_follow_their_caching_contract() {
    static BUILT: AtomicUsize = AtomicUsize::new(0);

    let mut services = ServiceCollection::new();
    services.register_singleton::<AuditLog>().unwrap();
    services
        .register_factory(Lifetime::Transient, || {
            BUILT.fetch_add(1, Ordering::SeqCst);
            RequestContext { request_id: 1 }
        })
        .unwrap();
    let provider = services.build().unwrap();

    let log_a = provider.resolve::<AuditLog>().unwrap();
    let log_b = provider.resolve::<AuditLog>().unwrap();
    assert!(Arc::ptr_eq(&log_a, &log_b));

    let _ctx_a = provider.resolve::<RequestContext>().unwrap();
    let _ctx_b = provider.resolve::<RequestContext>().unwrap();
    assert_eq!(BUILT.load(Ordering::SeqCst), 2);
}

#[test]
fn scoped_services_are_cached_per_scope() {
    let mut services = ServiceCollection::new();
    services.register_scoped::<AuditLog>().unwrap();
    let provider = services.build().unwrap();

    let checkout = provider.create_scope("checkout");
    let payment = provider.create_scope("payment");

    let in_checkout = provider.resolve_in_scope::<AuditLog>(&checkout).unwrap();
    let in_checkout_again = provider.resolve_in_scope::<AuditLog>(&checkout).unwrap();
    let in_payment = provider.resolve_in_scope::<AuditLog>(&payment).unwrap();

    assert!(Arc::ptr_eq(&in_checkout, &in_checkout_again));
    assert!(!Arc::ptr_eq(&in_checkout, &in_payment));
}

#[test]
fn sealed_collection_rejects_every_mutation() {
    let mut services = ServiceCollection::new();
    services.register_singleton::<AuditLog>().unwrap();
    let _provider = services.build().unwrap();

    assert!(matches!(
        services.register_transient::<AuditLog>(),
        Err(RegistryError::AlreadySealed)
    ));
    assert!(matches!(
        services.register_instance(AuditLog::default()),
        Err(RegistryError::AlreadySealed)
    ));
    assert!(matches!(services.build(), Err(RegistryError::AlreadySealed)));
}

#[test]
fn conflict_policies_differ_on_duplicate_keys() {
    let first = || RequestContext { request_id: 1 };
    let second = || RequestContext { request_id: 2 };

    let mut last_wins = ServiceCollection::with_conflict_policy(ConflictPolicy::LastWins);
    last_wins.register_factory(Lifetime::Singleton, first).unwrap();
    last_wins.register_factory(Lifetime::Singleton, second).unwrap();
    let provider = last_wins.build().unwrap();
    assert_eq!(provider.resolve::<RequestContext>().unwrap().request_id, 2);

    let mut keep_first = ServiceCollection::with_conflict_policy(ConflictPolicy::KeepFirst);
    keep_first.register_factory(Lifetime::Singleton, first).unwrap();
    keep_first.register_factory(Lifetime::Singleton, second).unwrap();
    let provider = keep_first.build().unwrap();
    assert_eq!(provider.resolve::<RequestContext>().unwrap().request_id, 1);

    let mut reject = ServiceCollection::with_conflict_policy(ConflictPolicy::Reject);
    reject.register_factory(Lifetime::Singleton, first).unwrap();
    let err = reject
        .register_factory(Lifetime::Singleton, second)
        .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateService { .. }));
}

#[test]
fn pre_built_instance_is_shared_after_first_resolution() {
    let mut services = ServiceCollection::new();
    services
        .register_instance(RequestContext { request_id: 42 })
        .unwrap();
    let provider = services.build().unwrap();

    let first = provider.resolve::<RequestContext>().unwrap();
    let second = provider.resolve::<RequestContext>().unwrap();
    assert_eq!(first.request_id, 42);
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn factory_with_resolver_supports_constructor_injection() {
    #[derive(Debug)]
    struct Report {
        entries: usize,
    }

    let mut services = ServiceCollection::new();
    services.register_singleton::<AuditLog>().unwrap();
    services
        .register_factory_with(Lifetime::Transient, |resolver| {
            let log = resolver.resolve::<AuditLog>()?;
            Ok(Report {
                entries: log.entries.len(),
            })
        })
        .unwrap();
    let provider = services.build().unwrap();

    assert_eq!(provider.resolve::<Report>().unwrap().entries, 0);
}

#[test]
fn self_referential_factory_reports_the_cycle() {
    #[derive(Debug)]
    struct Recursive;

    let mut services = ServiceCollection::new();
    services
        .register_factory_with(Lifetime::Transient, |resolver| {
            resolver.resolve::<Recursive>().map(|_| Recursive)
        })
        .unwrap();
    let provider = services.build().unwrap();

    let err = provider.resolve::<Recursive>().unwrap_err();
    match err {
        DependencyError::CircularDependency { dependency_chain } => {
            assert!(dependency_chain.contains("Recursive -> Recursive"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn registered_services_snapshot_lists_keys_and_lifetimes() {
    let mut services = ServiceCollection::new();
    services.register_singleton::<AuditLog>().unwrap();
    services.register_transient::<AuditLog>().unwrap();
    let provider = services.build().unwrap();

    let snapshot = provider.registered_services();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].1, Lifetime::Transient);
    assert!(provider.contains::<AuditLog>());
    assert!(!provider.contains::<RequestContext>());
}

#[tokio::test]
async fn hosted_services_run_through_the_wrapped_provider() {
    use async_trait::async_trait;
    use host_common::{BootstrapError, HostedService};

    static RAN: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug, Default)]
    struct Background;

    #[async_trait]
    impl HostedService for Background {
        async fn run(&self) -> Result<(), BootstrapError> {
            RAN.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    let mut services = ServiceCollection::new();
    services.add_hosted::<Background>().unwrap();
    let provider = services.build_with_injection().unwrap();

    let hosted = provider.hosted_services().unwrap();
    assert_eq!(hosted.len(), 1);
    hosted[0].run().await.unwrap();
    assert_eq!(RAN.load(Ordering::SeqCst), 1);
}
