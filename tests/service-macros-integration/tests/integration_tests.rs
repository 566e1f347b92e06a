//! service-macros 集中集成测试
//!
//! 标记宏在本测试 crate 内声明服务，扫描、注册、解析与注入
//! 走完整的运行时路径。

use di_container::{ModuleScanner, ServiceCollection};
use host_common::{
    DependencyError, InitializeOnStartup, Lifetime, ResolverExt, ServiceInfo,
};
use service_macros::{initialize_on_startup, service, Inject};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ========== 标记声明 ==========

/// 键值存储接口
pub trait Store: Send + Sync + std::fmt::Debug {
    fn put(&self, key: &str) -> usize;
}

/// 内存存储，以 `Store` trait 对象为服务键注册
#[service(singleton, provides(Store), name = "memory_store")]
#[derive(Debug, Default)]
pub struct MemoryStore;

impl Store for MemoryStore {
    fn put(&self, key: &str) -> usize {
        key.len()
    }
}

/// 写入端，必需依赖存储接口
#[service(transient)]
#[derive(Debug, Default, Inject)]
pub struct Writer {
    #[inject]
    store: Option<Arc<dyn Store>>,
}

/// 从未注册过的类型
#[derive(Debug)]
pub struct Unregistered;

/// 读取端，带一个可选依赖
#[service(transient)]
#[derive(Debug, Default, Inject)]
pub struct Reader {
    #[inject]
    store: Option<Arc<dyn Store>>,
    #[inject(optional)]
    fallback: Option<Arc<Unregistered>>,
}

static INIT_CALLS: AtomicUsize = AtomicUsize::new(0);

/// 计数初始化器
#[initialize_on_startup]
pub struct CountingInit;

impl InitializeOnStartup for CountingInit {
    fn initialize() {
        INIT_CALLS.fetch_add(1, Ordering::SeqCst);
    }
}

// ========== 测试 ==========

fn build_scanned_provider() -> di_container::InjectingProvider {
    let mut services = ServiceCollection::new();
    ModuleScanner::for_type::<MemoryStore>()
        .register_into(&mut services)
        .unwrap();
    services.build_with_injection().unwrap()
}

#[test]
fn scan_registers_every_marked_service() {
    let descriptors = ModuleScanner::for_type::<MemoryStore>().descriptors();
    assert_eq!(descriptors.len(), 3);

    let provider = build_scanned_provider();
    assert!(provider.inner().contains::<dyn Store>());
    assert!(provider.inner().contains::<Writer>());
    assert!(provider.inner().contains::<Reader>());
    assert!(!provider.inner().contains::<MemoryStore>());
}

#[test]
fn provides_override_resolves_by_trait_object() {
    let provider = build_scanned_provider();

    let store = provider.resolve_trait::<dyn Store>().unwrap();
    assert_eq!(store.put("abc"), 3);
}

#[test]
fn injected_consumers_share_the_singleton_dependency() {
    let provider = build_scanned_provider();

    let writer = provider.resolve::<Writer>().unwrap();
    let reader = provider.resolve::<Reader>().unwrap();

    let writer_store = writer.store.as_ref().unwrap();
    let reader_store = reader.store.as_ref().unwrap();
    assert!(Arc::ptr_eq(writer_store, reader_store));
}

#[test]
fn optional_dependency_stays_none_when_unregistered() {
    let provider = build_scanned_provider();

    let reader = provider.resolve::<Reader>().unwrap();
    assert!(reader.store.is_some());
    assert!(reader.fallback.is_none());
}

#[test]
fn required_dependency_missing_is_a_hard_error() {
    let mut services = ServiceCollection::new();
    services.register_transient::<Writer>().unwrap();
    let provider = services.build_with_injection().unwrap();

    let err = provider.resolve::<Writer>().unwrap_err();
    match err {
        DependencyError::MissingRequiredService {
            type_name,
            property,
            source,
        } => {
            assert!(type_name.contains("Writer"));
            assert_eq!(property, "store");
            assert!(matches!(
                *source,
                DependencyError::ServiceNotRegistered { .. }
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn service_info_reflects_the_declaration_site() {
    assert_eq!(MemoryStore::service_name(), "memory_store");
    assert_eq!(MemoryStore::lifetime(), Lifetime::Singleton);
    assert_eq!(Writer::service_name(), "Writer");
    assert_eq!(Writer::lifetime(), Lifetime::Transient);
}

#[test]
fn startup_initializer_runs_exactly_once_per_process() {
    let scanner = ModuleScanner::for_type::<CountingInit>();
    scanner.run_initializers();
    scanner.run_initializers();
    assert_eq!(INIT_CALLS.load(Ordering::SeqCst), 1);
}
