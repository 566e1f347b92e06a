//! 服务解析与属性注入抽象接口
//!
//! [`ServiceResolver`] 只暴露单一的解析能力，装饰器通过委托组合，
//! 不依赖继承关系。

use crate::errors::DependencyError;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// 服务解析器 trait
///
/// 提供按服务键解析实例的单一能力。包装解析器在 `inject_into`
/// 中追加属性注入，并以自身作为后续解析的注册表。
pub trait ServiceResolver: Send + Sync {
    /// 按服务键解析实例
    fn resolve_key(&self, key: TypeId) -> Result<Arc<dyn Any + Send + Sync>, DependencyError>;

    /// 向实例注入属性依赖
    ///
    /// 基础提供者不做注入；包装提供者按实例的运行时类型查表执行。
    /// 实例引用要求 `'static` 的对象生命周期，按运行时类型查表
    /// 才能落在具体类型而非引用自身上。
    fn inject_into(
        &self,
        _instance: &mut (dyn Any + Send + Sync + 'static),
    ) -> Result<(), DependencyError> {
        Ok(())
    }
}

/// 解析具体类型的服务
pub fn resolve_concrete<T, R>(resolver: &R) -> Result<Arc<T>, DependencyError>
where
    T: Send + Sync + 'static,
    R: ServiceResolver + ?Sized,
{
    let instance = resolver
        .resolve_key(TypeId::of::<T>())
        .map_err(|error| name_unregistered::<T>(error))?;
    instance
        .downcast::<T>()
        .map_err(|_| DependencyError::TypeMismatch {
            type_name: std::any::type_name::<T>().to_string(),
        })
}

/// 解析以 trait 对象为服务键的服务
///
/// 注册表中保存的是装箱的 `Arc<dyn Trait>`，这里取出并克隆。
pub fn resolve_trait_object<D, R>(resolver: &R) -> Result<Arc<D>, DependencyError>
where
    D: ?Sized + Send + Sync + 'static,
    R: ServiceResolver + ?Sized,
{
    let instance = resolver
        .resolve_key(TypeId::of::<D>())
        .map_err(|error| name_unregistered::<D>(error))?;
    instance
        .downcast_ref::<Arc<D>>()
        .cloned()
        .ok_or_else(|| DependencyError::TypeMismatch {
            type_name: std::any::type_name::<D>().to_string(),
        })
}

/// 解析失败时用静态类型名替换提供者只能给出的 `TypeId` 占位名
fn name_unregistered<T: ?Sized>(error: DependencyError) -> DependencyError {
    match error {
        DependencyError::ServiceNotRegistered { .. } => DependencyError::ServiceNotRegistered {
            type_name: std::any::type_name::<T>().to_string(),
        },
        other => other,
    }
}

/// 解析器扩展方法
pub trait ResolverExt: ServiceResolver {
    /// 解析具体类型的服务
    fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, DependencyError> {
        resolve_concrete(self)
    }

    /// 解析以 trait 对象为服务键的服务
    fn resolve_trait<D: ?Sized + Send + Sync + 'static>(
        &self,
    ) -> Result<Arc<D>, DependencyError> {
        resolve_trait_object(self)
    }

    /// 解析可选服务，未注册时返回 `None`
    fn resolve_optional<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.resolve().ok()
    }
}

impl<R: ServiceResolver + ?Sized> ResolverExt for R {}

/// 属性注入契约
///
/// 通常由 `#[derive(Inject)]` 生成：为每个 `#[inject]` 标记字段
/// 解析依赖并就地赋值。必需字段解析失败返回
/// [`DependencyError::MissingRequiredService`]，可选字段保持 `None`。
pub trait InjectServices {
    /// 从解析器向自身的标记字段注入依赖
    fn inject_services(
        &mut self,
        resolver: &dyn ServiceResolver,
    ) -> Result<(), DependencyError>;
}

/// 启动初始化契约
///
/// 被 `#[initialize_on_startup]` 标记的类型实现此 trait，
/// 初始化逻辑由编排器在注册任何服务之前显式调用，
/// 不存在"首次触达时运行"的隐式语义。
pub trait InitializeOnStartup {
    /// 执行一次性启动初始化
    fn initialize();
}

/// 服务元信息
///
/// 由 `#[service]` 标记宏实现，暴露声明处的注册信息。
pub trait ServiceInfo {
    /// 服务名称（短类型名或 `name = "..."` 覆盖）
    fn service_name() -> &'static str;

    /// 声明的生命周期
    fn lifetime() -> crate::lifetime::Lifetime;
}
