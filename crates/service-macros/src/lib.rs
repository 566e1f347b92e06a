//! # Service Macros
//!
//! 这个 crate 提供声明式服务注册与属性注入的过程宏。
//! 宏展开为写入进程级模块注册表的 `ctor` 钩子，扫描与注册
//! 阶段只消费登记好的元数据，不做任何类型内省。
//!
//! ## 核心宏
//!
//! - [`macro@service`] - 声明式服务注册宏
//! - [`Inject`](derive@Inject) - 属性注入派生宏
//! - [`macro@initialize_on_startup`] - 启动初始化标记宏
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use service_macros::{service, Inject};
//! use std::sync::Arc;
//!
//! pub trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! #[service(singleton, provides(Greeter))]
//! #[derive(Default)]
//! pub struct EnglishGreeter;
//!
//! impl Greeter for EnglishGreeter {
//!     fn greet(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//!
//! #[derive(Default, Inject)]
//! pub struct Handler {
//!     #[inject]
//!     greeter: Option<Arc<dyn Greeter>>,
//! }
//! ```
//!
//! 使用这些宏的 crate 需要同时依赖 `host-common` 与 `ctor`。

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod init;
mod inject;
mod service;

/// 声明式服务注册宏
///
/// 为结构体实现 `ServiceInfo` trait，并在程序启动时向模块注册表
/// 登记一条服务描述符。结构体需要实现 `Default`。
///
/// # 参数
///
/// - `singleton` / `scoped` / `transient` - 生命周期（默认 `transient`）
/// - `provides(Trait)` - 以 trait 对象为服务键注册；trait 需以
///   `Send + Sync` 为超 trait
/// - `name = "custom_name"` - 自定义服务名称
///
/// # 示例
///
/// ```rust,ignore
/// #[service(singleton, provides(Repository), name = "pg_repository")]
/// #[derive(Default)]
/// pub struct PgRepository {
///     // 字段
/// }
/// ```
#[proc_macro_attribute]
pub fn service(args: TokenStream, input: TokenStream) -> TokenStream {
    service::service_impl(args, input)
}

/// 属性注入派生宏
///
/// 为结构体实现 `InjectServices` trait，并在程序启动时向模块注册表
/// 登记按 `TypeId` 查表的注入钩子。被 `#[inject]` 标记的字段类型
/// 必须是 `Option<Arc<T>>` 或 `Option<Arc<dyn Trait>>`。
///
/// # 字段参数
///
/// - `#[inject]` - 必需依赖，解析失败时注入以
///   `MissingRequiredService` 错误终止
/// - `#[inject(optional)]` - 可选依赖，解析失败时字段保持 `None`
///
/// # 示例
///
/// ```rust,ignore
/// #[derive(Default, Inject)]
/// pub struct OrderHandler {
///     #[inject]
///     repository: Option<Arc<dyn Repository>>,
///     #[inject(optional)]
///     metrics: Option<Arc<MetricsSink>>,
/// }
/// ```
#[proc_macro_derive(Inject, attributes(inject))]
pub fn derive_inject(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    inject::derive_inject_impl(input)
}

/// 启动初始化标记宏
///
/// 为实现了 `InitializeOnStartup` 的类型登记一条启动初始化记录。
/// 编排器在注册任何服务之前显式执行初始化，每个进程内至多一次；
/// 多个初始化器之间的顺序不作保证。
///
/// # 示例
///
/// ```rust,ignore
/// #[initialize_on_startup]
/// pub struct TracingSetup;
///
/// impl InitializeOnStartup for TracingSetup {
///     fn initialize() {
///         // 一次性初始化逻辑
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn initialize_on_startup(args: TokenStream, input: TokenStream) -> TokenStream {
    init::initialize_on_startup_impl(args, input)
}
