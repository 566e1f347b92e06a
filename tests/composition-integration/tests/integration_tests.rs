//! 宿主组合层集中集成测试
//!
//! 覆盖完整的宿主构建流程：标记服务扫描注册、启动类型的属性注入、
//! 配置文件与环境变量覆盖、宿主服务运行循环。

use async_trait::async_trait;
use di_container::ServiceCollection;
use host_common::{
    BootstrapError, HostedService, InitializeOnStartup, RegistryResult, ResolverExt,
};
use host_composition::{HostSettings, ServiceHost, Startup};
use service_macros::{initialize_on_startup, service, Inject};
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

// ========== 标记声明 ==========

/// 账本接口
pub trait Ledger: Send + Sync + std::fmt::Debug {
    fn balance(&self) -> i64;
}

/// 固定余额账本，以 trait 对象为服务键注册
#[service(singleton, provides(Ledger))]
#[derive(Debug, Default)]
pub struct FixedLedger;

impl Ledger for FixedLedger {
    fn balance(&self) -> i64 {
        100
    }
}

/// 结算服务，依赖账本与宿主设置
#[service(transient)]
#[derive(Debug, Default, Inject)]
pub struct Settlement {
    #[inject]
    ledger: Option<Arc<dyn Ledger>>,
    #[inject]
    settings: Option<Arc<HostSettings>>,
}

impl Settlement {
    fn describe(&self) -> String {
        let balance = self.ledger.as_ref().map_or(0, |ledger| ledger.balance());
        let app = self
            .settings
            .as_ref()
            .map_or("unknown", |settings| settings.application.name.as_str());
        format!("{app}:{balance}")
    }
}

static STARTUP_INITS: AtomicUsize = AtomicUsize::new(0);

/// 进程级启动初始化器
#[initialize_on_startup]
pub struct BootInit;

impl InitializeOnStartup for BootInit {
    fn initialize() {
        STARTUP_INITS.fetch_add(1, Ordering::SeqCst);
    }
}

// ========== 启动配置 ==========

#[derive(Default)]
struct AppStartup;

impl Startup for AppStartup {}

static HOSTED_RAN: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Default)]
struct OneShotJob;

#[async_trait]
impl HostedService for OneShotJob {
    async fn run(&self) -> Result<(), BootstrapError> {
        HOSTED_RAN.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct HostedStartup;

impl Startup for HostedStartup {
    fn configure_services(&self, services: &mut ServiceCollection) -> RegistryResult<()> {
        services.add_hosted::<OneShotJob>()
    }
}

/// 从未注册过的依赖
#[derive(Debug)]
pub struct NeverRegistered;

#[derive(Default, Inject)]
struct BrokenStartup {
    #[inject]
    missing: Option<Arc<NeverRegistered>>,
}

impl Startup for BrokenStartup {}

// ========== 测试 ==========

#[test]
fn build_wires_scanned_services_and_settings() {
    let host = ServiceHost::build::<AppStartup>().unwrap();

    let settlement = host.provider().resolve::<Settlement>().unwrap();
    assert_eq!(settlement.describe(), "service-host:100");

    let ledger = host.provider().resolve_trait::<dyn Ledger>().unwrap();
    assert_eq!(ledger.balance(), 100);

    assert!(STARTUP_INITS.load(Ordering::SeqCst) >= 1);
}

#[test]
fn repeated_builds_run_initializers_only_once() {
    let _first = ServiceHost::build::<AppStartup>().unwrap();
    let _second = ServiceHost::build::<AppStartup>().unwrap();
    assert_eq!(STARTUP_INITS.load(Ordering::SeqCst), 1);
}

#[test]
fn settings_file_and_env_overrides_reach_services() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
        [application]
        name = "billing-host"
        environment = "production"

        [values]
        region = "eu-west-1"
        "#
    )
    .unwrap();

    std::env::set_var("COMPOSE_IT_APPLICATION_ENVIRONMENT", "staging");

    let host = ServiceHost::builder()
        .with_settings_path(file.path())
        .with_env_prefix("COMPOSE_IT_")
        .build::<AppStartup>()
        .unwrap();

    std::env::remove_var("COMPOSE_IT_APPLICATION_ENVIRONMENT");

    assert_eq!(host.settings().application.name, "billing-host");
    assert_eq!(host.settings().application.environment, "staging");
    assert_eq!(host.settings().get("region"), Some("eu-west-1"));

    let injected = host.provider().resolve::<HostSettings>().unwrap();
    assert_eq!(injected.application.name, "billing-host");
}

#[test]
fn unreadable_settings_file_is_a_config_error() {
    let err = ServiceHost::builder()
        .with_settings_path("/nonexistent/settings.toml")
        .build::<AppStartup>()
        .unwrap_err();
    assert!(matches!(err, BootstrapError::ConfigRead { .. }));
}

#[test]
fn startup_with_missing_required_dependency_fails_resolution() {
    let err = ServiceHost::build::<BrokenStartup>().unwrap_err();
    match err {
        BootstrapError::StartupResolution { type_name, source } => {
            assert!(type_name.contains("BrokenStartup"));
            assert!(matches!(
                source,
                host_common::DependencyError::MissingRequiredService { .. }
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn start_drives_hosted_services_to_completion() {
    ServiceHost::builder().start::<HostedStartup>().await.unwrap();
    assert!(HOSTED_RAN.load(Ordering::SeqCst));
}
