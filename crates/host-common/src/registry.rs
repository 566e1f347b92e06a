//! 进程级模块注册表
//!
//! 标记宏展开出的 `ctor` 钩子在 `main` 之前把服务描述符、启动初始化器
//! 和属性注入钩子写入这里。扫描器按模块路径过滤读取，本身没有副作用。

use crate::descriptor::{InjectFn, ServiceDescriptor, StartupInitializer};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::HashMap;
use tracing::debug;

static MODULE_REGISTRY: Lazy<ModuleRegistry> = Lazy::new(ModuleRegistry::new);

/// 获取进程级模块注册表
pub fn module_registry() -> &'static ModuleRegistry {
    &MODULE_REGISTRY
}

/// 模块注册表
///
/// 按声明站点收集标记元数据；同一声明站点同类标记至多一条
/// （属性注入钩子按 `TypeId` 去重，后写覆盖）。
pub struct ModuleRegistry {
    services: RwLock<Vec<ServiceDescriptor>>,
    initializers: RwLock<Vec<StartupInitializer>>,
    injectors: RwLock<HashMap<TypeId, InjectFn>>,
}

impl ModuleRegistry {
    fn new() -> Self {
        Self {
            services: RwLock::new(Vec::new()),
            initializers: RwLock::new(Vec::new()),
            injectors: RwLock::new(HashMap::new()),
        }
    }

    /// 登记服务描述符
    pub fn register_service(&self, descriptor: ServiceDescriptor) {
        debug!(
            "登记服务描述符: {} ({})",
            descriptor.key.name, descriptor.module_path
        );
        self.services.write().push(descriptor);
    }

    /// 登记启动初始化器
    pub fn register_initializer(&self, initializer: StartupInitializer) {
        debug!("登记启动初始化器: {}", initializer.type_name());
        self.initializers.write().push(initializer);
    }

    /// 登记属性注入钩子
    pub fn register_injector(&self, type_id: TypeId, inject: InjectFn) {
        self.injectors.write().insert(type_id, inject);
    }

    /// 获取全部服务描述符快照
    pub fn services(&self) -> Vec<ServiceDescriptor> {
        self.services.read().clone()
    }

    /// 获取模块路径满足条件的服务描述符快照
    pub fn services_in<F>(&self, matches: F) -> Vec<ServiceDescriptor>
    where
        F: Fn(&str) -> bool,
    {
        self.services
            .read()
            .iter()
            .filter(|descriptor| matches(descriptor.module_path))
            .cloned()
            .collect()
    }

    /// 执行模块路径满足条件且尚未运行过的启动初始化器
    ///
    /// 返回本次实际执行的数量。先在读锁内领取待执行项，
    /// 再在锁外运行，初始化逻辑因此可以安全地回写注册表。
    pub fn run_initializers_in<F>(&self, matches: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        let pending: Vec<(&'static str, fn())> = {
            let initializers = self.initializers.read();
            initializers
                .iter()
                .filter(|initializer| matches(initializer.module_path()))
                .filter_map(|initializer| {
                    initializer
                        .take_pending()
                        .map(|run| (initializer.type_name(), run))
                })
                .collect()
        };

        for (type_name, run) in &pending {
            debug!("执行启动初始化器: {}", type_name);
            run();
        }
        pending.len()
    }

    /// 按运行时类型查找属性注入钩子
    pub fn injector_for(&self, type_id: TypeId) -> Option<InjectFn> {
        self.injectors.read().get(&type_id).copied()
    }
}
