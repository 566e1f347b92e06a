//! 服务描述符与启动初始化器
//!
//! 标记宏在程序启动时将这些条目写入模块注册表，
//! 扫描与注册阶段只消费它们，不再做任何类型内省。

use crate::errors::DependencyError;
use crate::lifetime::Lifetime;
use crate::resolver::ServiceResolver;
use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 服务键
///
/// 注册与解析使用的键，携带类型名用于诊断输出。
#[derive(Debug, Clone, Copy)]
pub struct ServiceKey {
    /// 键的类型ID（具体类型或 trait 对象类型）
    pub id: TypeId,
    /// 键的完整类型名
    pub name: &'static str,
}

impl ServiceKey {
    /// 从类型获取服务键
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &str {
        self.name.split("::").last().unwrap_or(self.name)
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceKey {}

impl std::hash::Hash for ServiceKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// 服务构造函数类型
///
/// 接收解析器以支持构造注入；返回装箱的具体类型实例。
pub type ConstructFn =
    Arc<dyn Fn(&dyn ServiceResolver) -> DependencyResultBox + Send + Sync>;

/// 构造结果类型别名
pub type DependencyResultBox = Result<Box<dyn Any + Send + Sync>, DependencyError>;

/// 服务收尾函数类型
///
/// 将已完成属性注入的装箱实例转换为注册表保存的共享形式：
/// 无服务键覆盖时为 `Arc<T>`，有 `provides` 覆盖时为装箱的 `Arc<dyn Trait>`。
pub type FinishFn =
    fn(Box<dyn Any + Send + Sync>) -> Result<Arc<dyn Any + Send + Sync>, DependencyError>;

/// 属性注入钩子类型
///
/// 按实例的运行时类型查表调用，向实例的标记字段写入解析结果。
pub type InjectFn =
    fn(&mut (dyn Any + Send + Sync + 'static), &dyn ServiceResolver) -> Result<(), DependencyError>;

/// 具体类型的默认收尾函数
pub fn finish_concrete<T: Send + Sync + 'static>(
    boxed: Box<dyn Any + Send + Sync>,
) -> Result<Arc<dyn Any + Send + Sync>, DependencyError> {
    boxed
        .downcast::<T>()
        .map(|value| Arc::new(*value) as Arc<dyn Any + Send + Sync>)
        .map_err(|_| DependencyError::TypeMismatch {
            type_name: std::any::type_name::<T>().to_string(),
        })
}

/// 服务描述符
///
/// 元组 `(服务键, 实现类型, 生命周期)` 加上构造与收尾函数。
/// 在扫描阶段创建，注册表最终化后不再变化。
#[derive(Clone)]
pub struct ServiceDescriptor {
    /// 解析使用的服务键（`provides` 覆盖时为 trait 对象键）
    pub key: ServiceKey,
    /// 实现类型的键
    pub implementation: ServiceKey,
    /// 生命周期
    pub lifetime: Lifetime,
    /// 声明所在模块路径
    pub module_path: &'static str,
    /// 构造函数
    pub construct: ConstructFn,
    /// 收尾函数
    pub finish: FinishFn,
}

impl ServiceDescriptor {
    /// 创建以实现类型自身为键的描述符
    pub fn of<T>(lifetime: Lifetime, module_path: &'static str) -> Self
    where
        T: Default + Send + Sync + 'static,
    {
        Self::keyed::<T>(lifetime, module_path, ServiceKey::of::<T>(), finish_concrete::<T>)
    }

    /// 创建带显式服务键覆盖的描述符
    ///
    /// `finish` 负责把具体实例转换为键对应的共享形式，由标记宏
    /// 在声明处单态化生成（trait 对象强转无法在此泛型化表达）。
    pub fn keyed<T>(
        lifetime: Lifetime,
        module_path: &'static str,
        key: ServiceKey,
        finish: FinishFn,
    ) -> Self
    where
        T: Default + Send + Sync + 'static,
    {
        Self {
            key,
            implementation: ServiceKey::of::<T>(),
            lifetime,
            module_path,
            construct: Arc::new(|_resolver| Ok(Box::new(T::default()) as Box<dyn Any + Send + Sync>)),
            finish,
        }
    }

    /// 替换构造函数
    pub fn with_construct(mut self, construct: ConstructFn) -> Self {
        self.construct = construct;
        self
    }
}

impl std::fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("key", &self.key)
            .field("implementation", &self.implementation)
            .field("lifetime", &self.lifetime)
            .field("module_path", &self.module_path)
            .field("construct", &"<function>")
            .finish()
    }
}

/// 启动初始化器
///
/// 被 `#[initialize_on_startup]` 标记的类型在模块注册表中
/// 留下一条初始化记录，由编排器在注册任何服务之前执行。
#[derive(Debug)]
pub struct StartupInitializer {
    type_name: &'static str,
    module_path: &'static str,
    run: fn(),
    done: AtomicBool,
}

impl StartupInitializer {
    /// 为实现了 [`InitializeOnStartup`](crate::InitializeOnStartup) 的类型创建初始化记录
    pub fn new<T: crate::InitializeOnStartup + 'static>(module_path: &'static str) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            module_path,
            run: T::initialize,
            done: AtomicBool::new(false),
        }
    }

    /// 类型名
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// 声明所在模块路径
    pub fn module_path(&self) -> &'static str {
        self.module_path
    }

    /// 标记为已执行并返回本次是否需要运行
    ///
    /// 每个进程内最多成功一次；多个初始化器之间的顺序不作保证。
    pub fn take_pending(&self) -> Option<fn()> {
        if self.done.swap(true, Ordering::SeqCst) {
            None
        } else {
            Some(self.run)
        }
    }
}
