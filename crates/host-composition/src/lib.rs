//! # 宿主组合层
//!
//! 这个 crate 是服务宿主的组合层，负责把模块扫描、服务注册、
//! 启动初始化与属性注入编排成一个完整的、可运行的宿主。
//!
//! ## 主要功能
//!
//! - **宿主编排器**: 按固定顺序完成启动类型解析、初始化与注册
//! - **启动配置契约**: 通过 [`Startup`] trait 暴露手动注册钩子
//! - **宿主设置**: TOML 配置文件加环境变量覆盖
//! - **运行循环**: 并发驱动全部宿主服务直至结束
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use di_container::ServiceCollection;
//! use host_common::RegistryResult;
//! use host_composition::{ServiceHost, Startup};
//!
//! #[derive(Default)]
//! struct AppStartup;
//!
//! impl Startup for AppStartup {
//!     fn configure_services(&self, services: &mut ServiceCollection) -> RegistryResult<()> {
//!         // 标记宏覆盖不到的手动注册
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     ServiceHost::start::<AppStartup>().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod host;
pub mod logging;
pub mod service_host;
pub mod startup;

// 重新导出主要类型
pub use config::{ApplicationSettings, HostSettings};
pub use host::Host;
pub use logging::{init_logging, LoggingConfig};
pub use service_host::{ServiceHost, ServiceHostBuilder};
pub use startup::Startup;

// 重新导出错误类型
pub use host_common::{BootstrapError, BootstrapResult};
