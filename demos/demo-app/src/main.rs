//! # 服务宿主演示
//!
//! 演示完整的宿主启动流程：
//! - 使用标记宏声明服务与启动初始化器
//! - 宿主构建时自动扫描注册本 crate 的服务
//! - 属性注入组装依赖，trait 对象服务键按接口解析
//! - 宿主服务由运行循环驱动

use async_trait::async_trait;
use di_container::ServiceCollection;
use host_common::{
    BootstrapError, HostedService, InitializeOnStartup, RegistryResult, ResolverExt,
};
use host_composition::{HostSettings, LoggingConfig, ServiceHost, Startup};
use service_macros::{initialize_on_startup, service, Inject};
use std::sync::Arc;
use tracing::info;

// ========== 服务声明 ==========

/// 问候语提供方
pub trait Greeter: Send + Sync + std::fmt::Debug {
    /// 生成问候语
    fn greet(&self, who: &str) -> String;
}

/// 英文问候实现，以 `Greeter` trait 对象为服务键注册
#[service(singleton, provides(Greeter))]
#[derive(Debug, Default)]
pub struct EnglishGreeter;

impl Greeter for EnglishGreeter {
    fn greet(&self, who: &str) -> String {
        format!("hello, {who}")
    }
}

/// 问候处理器，依赖通过属性注入组装
#[service(transient)]
#[derive(Debug, Default, Inject)]
pub struct GreetingHandler {
    #[inject]
    greeter: Option<Arc<dyn Greeter>>,
    #[inject(optional)]
    settings: Option<Arc<HostSettings>>,
}

impl GreetingHandler {
    /// 生成带应用名前缀的问候语
    fn handle(&self, who: &str) -> Option<String> {
        let greeter = self.greeter.as_ref()?;
        let app_name = self
            .settings
            .as_ref()
            .map_or("demo", |settings| settings.application.name.as_str());
        Some(format!("[{app_name}] {}", greeter.greet(who)))
    }
}

// ========== 启动初始化 ==========

/// 演示用启动初始化器，在任何服务注册之前执行一次
#[initialize_on_startup]
pub struct DemoInit;

impl InitializeOnStartup for DemoInit {
    fn initialize() {
        info!("演示应用启动初始化完成");
    }
}

// ========== 宿主服务 ==========

/// 问候循环，作为宿主服务由运行循环驱动
#[derive(Debug, Default, Inject)]
pub struct GreetingLoop {
    #[inject]
    greeter: Option<Arc<dyn Greeter>>,
}

#[async_trait]
impl HostedService for GreetingLoop {
    async fn run(&self) -> Result<(), BootstrapError> {
        if let Some(greeter) = &self.greeter {
            for who in ["alice", "bob", "carol"] {
                info!("{}", greeter.greet(who));
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            }
        }
        Ok(())
    }
}

// ========== 启动配置 ==========

#[derive(Default)]
struct DemoStartup;

impl Startup for DemoStartup {
    fn configure_services(&self, services: &mut ServiceCollection) -> RegistryResult<()> {
        services.add_hosted::<GreetingLoop>()
    }
}

#[tokio::main]
async fn main() -> Result<(), BootstrapError> {
    let host = ServiceHost::builder()
        .with_logging(LoggingConfig::development())
        .with_env_prefix("DEMO_")
        .build::<DemoStartup>()?;

    // 每次解析瞬时服务都会重新构造并注入
    let handler = host.provider().resolve::<GreetingHandler>()?;
    if let Some(message) = handler.handle("world") {
        info!("{}", message);
    }

    host.run().await
}
