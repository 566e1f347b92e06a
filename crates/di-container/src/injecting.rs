//! 带属性注入的包装解析器
//!
//! 装饰内层提供者的解析入口：实例构造后、共享前，按其运行时类型
//! 查找注入钩子并以包装层自身为注册表执行属性注入。经过包装层的
//! 每一次解析（包括工厂内部的嵌套解析）都因此获得属性注入。

use host_common::{
    module_registry, DependencyError, HostedService, Scope, ServiceResolver,
};
use std::any::{Any, TypeId};
use std::sync::Arc;

use crate::provider::ServiceProvider;

/// 按实例的运行时类型查表执行属性注入
///
/// 先解引用再取 `TypeId`，查表键是具体类型而非擦除后的引用。
fn inject_by_runtime_type(
    instance: &mut (dyn Any + Send + Sync + 'static),
    resolver: &dyn ServiceResolver,
) -> Result<(), DependencyError> {
    let type_id = (*instance).type_id();
    match module_registry().injector_for(type_id) {
        Some(inject) => inject(instance, resolver),
        // 无注入钩子的类型按原样返回
        None => Ok(()),
    }
}

/// 包装解析器
///
/// 注入发生在实例仍被独占持有时，单例缓存中保存的已是注入完成的
/// 实例；注入依赖与构造依赖之间出现环时解析以
/// [`DependencyError::CircularDependency`] 失败，而非未定义行为。
pub struct InjectingProvider {
    inner: ServiceProvider,
}

impl InjectingProvider {
    /// 包装一个服务提供者
    pub fn new(inner: ServiceProvider) -> Self {
        Self { inner }
    }

    /// 内层提供者
    pub fn inner(&self) -> &ServiceProvider {
        &self.inner
    }

    /// 拆除包装，返回内层提供者
    pub fn into_inner(self) -> ServiceProvider {
        self.inner
    }

    /// 创建根作用域的子作用域
    pub fn create_scope(&self, name: impl Into<String>) -> Scope {
        self.inner.create_scope(name)
    }

    /// 在指定作用域内解析具体类型的服务（经属性注入）
    ///
    /// 作用域随解析上下文传递：注入链上的作用域依赖也落在
    /// 同一作用域，而不是退回根作用域。
    pub fn resolve_in_scope<T: Send + Sync + 'static>(
        &self,
        scope: &Scope,
    ) -> Result<Arc<T>, DependencyError> {
        let view = ScopedInjectingView {
            provider: self,
            scope,
        };
        let instance = self
            .inner
            .resolve_entry(TypeId::of::<T>(), Some(scope), &view)?;
        instance
            .downcast::<T>()
            .map_err(|_| DependencyError::TypeMismatch {
                type_name: std::any::type_name::<T>().to_string(),
            })
    }

    /// 手动向已有对象注入属性依赖
    pub fn inject<T: Any + Send + Sync>(&self, target: &mut T) -> Result<(), DependencyError> {
        self.inject_into(target as &mut (dyn Any + Send + Sync + 'static))
    }

    /// 获取全部宿主服务实例（经属性注入解析）
    pub fn hosted_services(&self) -> Result<Vec<Arc<dyn HostedService>>, DependencyError> {
        self.inner.hosted_services(self)
    }
}

impl ServiceResolver for InjectingProvider {
    fn resolve_key(&self, key: TypeId) -> Result<Arc<dyn Any + Send + Sync>, DependencyError> {
        self.inner.resolve_entry(key, None, self)
    }

    fn inject_into(
        &self,
        instance: &mut (dyn Any + Send + Sync + 'static),
    ) -> Result<(), DependencyError> {
        inject_by_runtime_type(instance, self)
    }
}

impl std::fmt::Debug for InjectingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectingProvider")
            .field("inner", &self.inner)
            .finish()
    }
}

/// 绑定作用域的包装解析视图
///
/// 嵌套解析与属性注入都带着当前作用域回到内层提供者。
struct ScopedInjectingView<'a> {
    provider: &'a InjectingProvider,
    scope: &'a Scope,
}

impl ServiceResolver for ScopedInjectingView<'_> {
    fn resolve_key(&self, key: TypeId) -> Result<Arc<dyn Any + Send + Sync>, DependencyError> {
        self.provider
            .inner
            .resolve_entry(key, Some(self.scope), self)
    }

    fn inject_into(
        &self,
        instance: &mut (dyn Any + Send + Sync + 'static),
    ) -> Result<(), DependencyError> {
        inject_by_runtime_type(instance, self)
    }
}
