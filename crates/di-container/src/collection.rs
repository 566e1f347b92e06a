//! 服务注册表
//!
//! 注册阶段的可变表。`build` 封存注册表并产出提供者，
//! 封存之后的任何注册调用都以 [`RegistryError::AlreadySealed`] 拒绝。

use host_common::{
    finish_concrete, resolve_concrete, ConstructFn, DependencyError, FinishFn, HostedService,
    Lifetime, RegistryError, RegistryResult, ServiceDescriptor, ServiceKey, ServiceResolver,
};
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::injecting::InjectingProvider;
use crate::provider::ServiceProvider;

/// 服务键冲突策略
///
/// 上游实现对重复键静默地后写覆盖；这里把策略显式化并可配置。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// 后写覆盖（默认，与上游行为一致，覆盖时输出警告日志）
    LastWins,
    /// 保留首个注册，忽略后续
    KeepFirst,
    /// 拒绝重复注册，返回 [`RegistryError::DuplicateService`]
    Reject,
}

impl Default for ConflictPolicy {
    fn default() -> Self {
        Self::LastWins
    }
}

/// 服务实例的构造来源
pub(crate) enum Construct {
    /// 每次由工厂构造
    Factory(ConstructFn),
    /// 预构建实例，首次解析时取出（仅单例）
    Instance(Mutex<Option<Box<dyn Any + Send + Sync>>>),
}

/// 注册表条目
pub(crate) struct Registration {
    pub key: ServiceKey,
    pub implementation: ServiceKey,
    pub lifetime: Lifetime,
    pub construct: Construct,
    pub finish: FinishFn,
}

/// 宿主服务条目
pub(crate) struct HostedEntry {
    pub name: &'static str,
    pub fetch: Arc<
        dyn Fn(&dyn ServiceResolver) -> Result<Arc<dyn HostedService>, DependencyError>
            + Send
            + Sync,
    >,
}

/// 服务注册表
///
/// 从模块扫描与手动注册两条路径收集条目，`build` 之后只读。
pub struct ServiceCollection {
    entries: HashMap<TypeId, Registration>,
    hosted: Vec<HostedEntry>,
    policy: ConflictPolicy,
    sealed: bool,
}

impl ServiceCollection {
    /// 创建空注册表（默认冲突策略）
    pub fn new() -> Self {
        Self::with_conflict_policy(ConflictPolicy::default())
    }

    /// 以指定冲突策略创建空注册表
    pub fn with_conflict_policy(policy: ConflictPolicy) -> Self {
        Self {
            entries: HashMap::new(),
            hosted: Vec::new(),
            policy,
            sealed: false,
        }
    }

    /// 当前冲突策略
    pub fn conflict_policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// 注册表是否已封存
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// 已注册条目数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 注册表是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 指定类型（或 trait 对象键）是否已注册
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// 注册扫描得到的服务描述符
    pub fn register_descriptor(&mut self, descriptor: ServiceDescriptor) -> RegistryResult<()> {
        self.insert(Registration {
            key: descriptor.key,
            implementation: descriptor.implementation,
            lifetime: descriptor.lifetime,
            construct: Construct::Factory(descriptor.construct),
            finish: descriptor.finish,
        })
    }

    /// 以指定生命周期注册类型自身为服务键的服务
    pub fn register<T>(&mut self, lifetime: Lifetime) -> RegistryResult<()>
    where
        T: Default + Send + Sync + 'static,
    {
        self.insert(Registration {
            key: ServiceKey::of::<T>(),
            implementation: ServiceKey::of::<T>(),
            lifetime,
            construct: Construct::Factory(Arc::new(|_resolver| {
                Ok(Box::new(T::default()) as Box<dyn Any + Send + Sync>)
            })),
            finish: finish_concrete::<T>,
        })
    }

    /// 注册单例服务
    pub fn register_singleton<T: Default + Send + Sync + 'static>(&mut self) -> RegistryResult<()> {
        self.register::<T>(Lifetime::Singleton)
    }

    /// 注册作用域服务
    pub fn register_scoped<T: Default + Send + Sync + 'static>(&mut self) -> RegistryResult<()> {
        self.register::<T>(Lifetime::Scoped)
    }

    /// 注册瞬时服务
    pub fn register_transient<T: Default + Send + Sync + 'static>(&mut self) -> RegistryResult<()> {
        self.register::<T>(Lifetime::Transient)
    }

    /// 注册预构建的单例实例
    ///
    /// 实例在首次解析时经过属性注入后进入单例缓存。
    pub fn register_instance<T: Send + Sync + 'static>(&mut self, instance: T) -> RegistryResult<()> {
        self.insert(Registration {
            key: ServiceKey::of::<T>(),
            implementation: ServiceKey::of::<T>(),
            lifetime: Lifetime::Singleton,
            construct: Construct::Instance(Mutex::new(Some(Box::new(instance)))),
            finish: finish_concrete::<T>,
        })
    }

    /// 注册无参工厂服务
    pub fn register_factory<T, F>(&mut self, lifetime: Lifetime, factory: F) -> RegistryResult<()>
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.insert(Registration {
            key: ServiceKey::of::<T>(),
            implementation: ServiceKey::of::<T>(),
            lifetime,
            construct: Construct::Factory(Arc::new(move |_resolver| {
                Ok(Box::new(factory()) as Box<dyn Any + Send + Sync>)
            })),
            finish: finish_concrete::<T>,
        })
    }

    /// 注册可失败的工厂服务
    ///
    /// 工厂自身的错误以 [`DependencyError::FactoryFailed`] 包装后
    /// 从解析处返回。
    pub fn register_try_factory<T, F, E>(
        &mut self,
        lifetime: Lifetime,
        factory: F,
    ) -> RegistryResult<()>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        E: std::fmt::Display,
    {
        self.insert(Registration {
            key: ServiceKey::of::<T>(),
            implementation: ServiceKey::of::<T>(),
            lifetime,
            construct: Construct::Factory(Arc::new(move |_resolver| {
                factory()
                    .map(|value| Box::new(value) as Box<dyn Any + Send + Sync>)
                    .map_err(|error| DependencyError::FactoryFailed {
                        type_name: std::any::type_name::<T>().to_string(),
                        message: error.to_string(),
                    })
            })),
            finish: finish_concrete::<T>,
        })
    }

    /// 注册带解析器参数的工厂服务（构造注入）
    pub fn register_factory_with<T, F>(
        &mut self,
        lifetime: Lifetime,
        factory: F,
    ) -> RegistryResult<()>
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn ServiceResolver) -> Result<T, DependencyError> + Send + Sync + 'static,
    {
        self.insert(Registration {
            key: ServiceKey::of::<T>(),
            implementation: ServiceKey::of::<T>(),
            lifetime,
            construct: Construct::Factory(Arc::new(move |resolver| {
                factory(resolver).map(|value| Box::new(value) as Box<dyn Any + Send + Sync>)
            })),
            finish: finish_concrete::<T>,
        })
    }

    /// 注册宿主服务
    ///
    /// 类型以单例注册（若尚未注册），并加入宿主运行循环的驱动列表。
    pub fn add_hosted<T>(&mut self) -> RegistryResult<()>
    where
        T: HostedService + Default + Send + Sync + 'static,
    {
        if !self.contains::<T>() {
            self.register::<T>(Lifetime::Singleton)?;
        }
        self.hosted.push(HostedEntry {
            name: std::any::type_name::<T>(),
            fetch: Arc::new(|resolver| {
                let service = resolve_concrete::<T, _>(resolver)?;
                Ok(service as Arc<dyn HostedService>)
            }),
        });
        Ok(())
    }

    /// 封存注册表并构建服务提供者
    pub fn build(&mut self) -> RegistryResult<ServiceProvider> {
        if self.sealed {
            return Err(RegistryError::AlreadySealed);
        }
        self.sealed = true;
        let entries = std::mem::take(&mut self.entries);
        let hosted = std::mem::take(&mut self.hosted);
        info!("注册表封存，共 {} 个服务", entries.len());
        Ok(ServiceProvider::new(entries, hosted))
    }

    /// 封存注册表并构建带属性注入的包装提供者
    pub fn build_with_injection(&mut self) -> RegistryResult<InjectingProvider> {
        Ok(InjectingProvider::new(self.build()?))
    }

    fn insert(&mut self, registration: Registration) -> RegistryResult<()> {
        if self.sealed {
            return Err(RegistryError::AlreadySealed);
        }

        match self.entries.entry(registration.key.id) {
            std::collections::hash_map::Entry::Occupied(mut occupied) => match self.policy {
                ConflictPolicy::Reject => Err(RegistryError::DuplicateService {
                    key_name: registration.key.name.to_string(),
                }),
                ConflictPolicy::KeepFirst => {
                    debug!("服务键已注册，保留首个: {}", registration.key.name);
                    Ok(())
                }
                ConflictPolicy::LastWins => {
                    warn!("服务键重复注册，后写覆盖: {}", registration.key.name);
                    occupied.insert(registration);
                    Ok(())
                }
            },
            std::collections::hash_map::Entry::Vacant(vacant) => {
                debug!(
                    "注册服务: {} ({})",
                    registration.key.name,
                    registration.lifetime.as_str()
                );
                vacant.insert(registration);
                Ok(())
            }
        }
    }
}

impl Default for ServiceCollection {
    fn default() -> Self {
        Self::new()
    }
}
