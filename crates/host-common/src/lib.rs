//! # Host Common
//!
//! 服务宿主基础设施的公共契约层。
//!
//! ## 核心组件
//!
//! - [`Lifetime`] / [`Scope`] - 服务生命周期与作用域
//! - [`ServiceDescriptor`] - 服务描述符（注册表条目）
//! - [`ModuleRegistry`] - 进程级模块注册表（由标记宏在启动时写入）
//! - [`ServiceResolver`] - 服务解析抽象接口
//! - [`InjectServices`] / [`InitializeOnStartup`] - 属性注入与启动初始化契约
//!
//! ## 设计原则
//!
//! - 基于 Rust 类型系统的编译时安全，不依赖运行时反射
//! - 标记宏在程序启动时构建显式注册表，扫描只读取该注册表
//! - 约定优于配置

pub mod descriptor;
pub mod errors;
pub mod hosting;
pub mod lifetime;
pub mod registry;
pub mod resolver;

pub use descriptor::*;
pub use errors::*;
pub use hosting::*;
pub use lifetime::*;
pub use registry::*;
pub use resolver::*;
