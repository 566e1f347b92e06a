//! 服务提供者
//!
//! 注册表封存后的只读视图。条目表在构建后不再变化，
//! 单例与作用域缓存使用无锁映射，最终化后的解析可安全并发读取。

use dashmap::DashMap;
use host_common::{
    DependencyError, HostedService, Lifetime, Scope, ServiceKey, ServiceResolver,
};
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

use crate::collection::{Construct, HostedEntry, Registration};

thread_local! {
    static RESOLUTION_STACK: RefCell<Vec<ServiceKey>> = RefCell::new(Vec::new());
}

/// 服务提供者
///
/// 按生命周期策略解析实例：瞬时每次新建，单例全局缓存，
/// 作用域按 [`Scope`] 缓存；未显式给出作用域时使用根作用域。
pub struct ServiceProvider {
    entries: HashMap<TypeId, Registration>,
    hosted: Vec<HostedEntry>,
    singletons: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    scoped: DashMap<(uuid::Uuid, TypeId), Arc<dyn Any + Send + Sync>>,
    root_scope: Scope,
}

impl ServiceProvider {
    pub(crate) fn new(entries: HashMap<TypeId, Registration>, hosted: Vec<HostedEntry>) -> Self {
        Self {
            entries,
            hosted,
            singletons: DashMap::new(),
            scoped: DashMap::new(),
            root_scope: Scope::root(),
        }
    }

    /// 根作用域
    pub fn root_scope(&self) -> &Scope {
        &self.root_scope
    }

    /// 创建根作用域的子作用域
    pub fn create_scope(&self, name: impl Into<String>) -> Scope {
        self.root_scope.child(name)
    }

    /// 指定服务键是否已注册
    pub fn contains_key(&self, key: TypeId) -> bool {
        self.entries.contains_key(&key)
    }

    /// 指定类型（或 trait 对象键）是否已注册
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.contains_key(TypeId::of::<T>())
    }

    /// 已注册服务的键与生命周期列表（诊断用）
    pub fn registered_services(&self) -> Vec<(ServiceKey, Lifetime)> {
        self.entries
            .values()
            .map(|registration| (registration.key, registration.lifetime))
            .collect()
    }

    /// 在指定作用域内解析具体类型的服务（不经属性注入）
    ///
    /// 作用域随解析上下文传递，工厂内的嵌套解析落在同一作用域。
    pub fn resolve_in_scope<T: Send + Sync + 'static>(
        &self,
        scope: &Scope,
    ) -> Result<Arc<T>, DependencyError> {
        let view = ScopedView {
            provider: self,
            scope,
        };
        downcast_concrete::<T>(self.resolve_entry(TypeId::of::<T>(), Some(scope), &view)?)
    }

    /// 获取全部宿主服务实例
    pub(crate) fn hosted_services(
        &self,
        ctx: &dyn ServiceResolver,
    ) -> Result<Vec<Arc<dyn HostedService>>, DependencyError> {
        self.hosted.iter().map(|entry| (entry.fetch)(ctx)).collect()
    }

    /// 宿主服务条目数
    pub fn hosted_len(&self) -> usize {
        self.hosted.len()
    }

    /// 按服务键解析实例
    ///
    /// `ctx` 是外层解析器：包装提供者把自身传入，嵌套解析与属性注入
    /// 因此都经过包装层。
    pub(crate) fn resolve_entry(
        &self,
        key: TypeId,
        scope: Option<&Scope>,
        ctx: &dyn ServiceResolver,
    ) -> Result<Arc<dyn Any + Send + Sync>, DependencyError> {
        let entry = self
            .entries
            .get(&key)
            .ok_or_else(|| DependencyError::ServiceNotRegistered {
                type_name: format!("TypeId({key:?})"),
            })?;

        match entry.lifetime {
            Lifetime::Transient => self.materialize(entry, ctx),
            Lifetime::Singleton => {
                if let Some(cached) = self.singletons.get(&key) {
                    return Ok(cached.clone());
                }
                let created = self.materialize(entry, ctx)?;
                // 启动序列单线程运行，首个插入即生效
                Ok(self.singletons.entry(key).or_insert(created).clone())
            }
            Lifetime::Scoped => {
                let scope_id = scope.unwrap_or(&self.root_scope).id;
                if let Some(cached) = self.scoped.get(&(scope_id, key)) {
                    return Ok(cached.clone());
                }
                let created = self.materialize(entry, ctx)?;
                Ok(self.scoped.entry((scope_id, key)).or_insert(created).clone())
            }
        }
    }

    /// 构造一个实例：循环检测、工厂构造、属性注入、收尾转换
    fn materialize(
        &self,
        entry: &Registration,
        ctx: &dyn ServiceResolver,
    ) -> Result<Arc<dyn Any + Send + Sync>, DependencyError> {
        let cycle = RESOLUTION_STACK.with(|stack| {
            let stack = stack.borrow();
            if stack.iter().any(|pending| pending.id == entry.key.id) {
                let chain = stack
                    .iter()
                    .map(ServiceKey::short_name)
                    .chain(std::iter::once(entry.key.short_name()))
                    .collect::<Vec<_>>()
                    .join(" -> ");
                Some(chain)
            } else {
                None
            }
        });
        if let Some(dependency_chain) = cycle {
            return Err(DependencyError::CircularDependency { dependency_chain });
        }

        RESOLUTION_STACK.with(|stack| stack.borrow_mut().push(entry.key));
        let result = self.construct_and_inject(entry, ctx);
        RESOLUTION_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
        result
    }

    fn construct_and_inject(
        &self,
        entry: &Registration,
        ctx: &dyn ServiceResolver,
    ) -> Result<Arc<dyn Any + Send + Sync>, DependencyError> {
        trace!("构造服务实例: {}", entry.implementation.name);
        let mut boxed = match &entry.construct {
            Construct::Factory(construct) => construct(ctx)?,
            Construct::Instance(slot) => {
                slot.lock()
                    .take()
                    .ok_or_else(|| DependencyError::InstanceConsumed {
                        type_name: entry.implementation.name.to_string(),
                    })?
            }
        };
        ctx.inject_into(boxed.as_mut())?;
        (entry.finish)(boxed)
    }
}

impl ServiceResolver for ServiceProvider {
    fn resolve_key(&self, key: TypeId) -> Result<Arc<dyn Any + Send + Sync>, DependencyError> {
        self.resolve_entry(key, None, self)
    }
}

impl std::fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("entries", &self.entries.len())
            .field("hosted", &self.hosted.len())
            .field("root_scope", &self.root_scope)
            .finish()
    }
}

/// 绑定作用域的解析视图
///
/// 作为嵌套解析的上下文传入，使作用域沿解析链保持不变。
struct ScopedView<'a> {
    provider: &'a ServiceProvider,
    scope: &'a Scope,
}

impl ServiceResolver for ScopedView<'_> {
    fn resolve_key(&self, key: TypeId) -> Result<Arc<dyn Any + Send + Sync>, DependencyError> {
        self.provider.resolve_entry(key, Some(self.scope), self)
    }
}

fn downcast_concrete<T: Send + Sync + 'static>(
    instance: Arc<dyn Any + Send + Sync>,
) -> Result<Arc<T>, DependencyError> {
    instance
        .downcast::<T>()
        .map_err(|_| DependencyError::TypeMismatch {
            type_name: std::any::type_name::<T>().to_string(),
        })
}
