//! 宿主编排器
//!
//! 按固定顺序完成宿主构建：加载设置、解析启动类型、执行启动
//! 初始化器、扫描注册服务、调用手动注册钩子、封存注册表。
//! 任一步骤失败即终止，不做部分构建恢复。

use crate::config::HostSettings;
use crate::host::Host;
use crate::logging::{init_logging, LoggingConfig};
use crate::startup::Startup;
use di_container::{ConflictPolicy, ModuleScanner, ServiceCollection};
use host_common::{BootstrapError, BootstrapResult, ResolverExt};
use std::path::PathBuf;
use tracing::info;

/// 宿主编排器入口
pub struct ServiceHost;

impl ServiceHost {
    /// 创建宿主构建器
    pub fn builder() -> ServiceHostBuilder {
        ServiceHostBuilder::new()
    }

    /// 以默认选项构建宿主
    pub fn build<T: Startup>() -> BootstrapResult<Host> {
        Self::builder().build::<T>()
    }

    /// 以默认选项构建宿主并运行至全部宿主服务结束
    pub async fn start<T: Startup>() -> BootstrapResult<()> {
        Self::builder().start::<T>().await
    }
}

/// 宿主构建器
///
/// 默认不加载配置文件、不读取环境变量、不初始化全局日志订阅器，
/// 冲突策略为后写覆盖。
pub struct ServiceHostBuilder {
    settings_path: Option<PathBuf>,
    env_prefix: Option<String>,
    conflict_policy: ConflictPolicy,
    logging: Option<LoggingConfig>,
}

impl ServiceHostBuilder {
    /// 创建默认构建器
    pub fn new() -> Self {
        Self {
            settings_path: None,
            env_prefix: None,
            conflict_policy: ConflictPolicy::default(),
            logging: None,
        }
    }

    /// 设置 TOML 配置文件路径
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    /// 设置环境变量覆盖前缀
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// 设置服务键冲突策略
    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    /// 构建时初始化全局日志订阅器
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging = Some(config);
        self
    }

    /// 构建宿主
    pub fn build<T: Startup>(self) -> BootstrapResult<Host> {
        if let Some(logging) = &self.logging {
            init_logging(logging)?;
        }

        let mut settings = match &self.settings_path {
            Some(path) => HostSettings::load(path)?,
            None => HostSettings::default(),
        };
        if let Some(prefix) = &self.env_prefix {
            settings.apply_env_overrides(prefix);
        }

        info!("开始构建宿主: {}", settings.application.name);

        // 第一步：临时注册表解析启动类型，启动类型自身可被属性注入
        let startup = {
            let mut bootstrap_services =
                ServiceCollection::with_conflict_policy(self.conflict_policy);
            bootstrap_services.register_transient::<T>()?;
            bootstrap_services.register_instance(settings.clone())?;
            let bootstrap_provider = bootstrap_services.build_with_injection()?;
            bootstrap_provider
                .resolve::<T>()
                .map_err(|source| BootstrapError::StartupResolution {
                    type_name: std::any::type_name::<T>().to_string(),
                    source,
                })?
        };

        // 第二步：执行启动类型所在 crate 的启动初始化器
        let scanner = ModuleScanner::for_type::<T>();
        scanner.run_initializers();

        // 第三步：扫描注册声明式服务与宿主设置
        let mut services = ServiceCollection::with_conflict_policy(self.conflict_policy);
        scanner.register_into(&mut services)?;
        services.register_instance(settings.clone())?;

        // 第四步：手动注册钩子
        startup.configure_services(&mut services)?;

        // 第五步：封存注册表并构建包装提供者
        let provider = services.build_with_injection()?;

        info!("宿主构建完成: {}", settings.application.name);
        Ok(Host::new(provider, settings))
    }

    /// 构建宿主并运行至全部宿主服务结束
    pub async fn start<T: Startup>(self) -> BootstrapResult<()> {
        let host = self.build::<T>()?;
        host.run().await
    }
}

impl Default for ServiceHostBuilder {
    fn default() -> Self {
        Self::new()
    }
}
