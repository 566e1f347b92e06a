//! # 依赖注入容器
//!
//! 提供服务注册表、最终化后的服务提供者以及带属性注入的包装解析器。
//!
//! ## 核心类型
//!
//! - [`ServiceCollection`] - 可变的服务注册表，封存后不再接受注册
//! - [`ServiceProvider`] - 最终化的服务提供者，按生命周期策略解析实例
//! - [`InjectingProvider`] - 包装解析器，解析结果先经属性注入再返回
//! - [`ModuleScanner`] - 按模块路径过滤模块注册表中的标记元数据

pub mod collection;
pub mod injecting;
pub mod provider;
pub mod scanner;

pub use collection::*;
pub use injecting::*;
pub use provider::*;
pub use scanner::*;
