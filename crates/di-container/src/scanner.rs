//! 模块扫描器
//!
//! 按模块路径前缀过滤进程级模块注册表中的标记元数据。
//! 标记宏在声明站点记录 `module_path!()`，扫描器据此把
//! 「扫描某个 crate」落实为前缀匹配，不产生任何副作用。

use host_common::{module_registry, RegistryResult, ServiceDescriptor};
use tracing::info;

use crate::collection::ServiceCollection;

/// 模块扫描器
///
/// 前缀 `foo` 匹配 `foo` 自身以及 `foo::bar` 等子模块，
/// 但不匹配 `foobar` 这类仅字面前缀相同的路径。
#[derive(Debug, Clone)]
pub struct ModuleScanner {
    module_prefix: String,
}

impl ModuleScanner {
    /// 以指定模块路径前缀创建扫描器
    pub fn new(module_prefix: impl Into<String>) -> Self {
        Self {
            module_prefix: module_prefix.into(),
        }
    }

    /// 以类型所在 crate 为前缀创建扫描器
    pub fn for_type<T: ?Sized + 'static>() -> Self {
        let type_name = std::any::type_name::<T>();
        let crate_name = type_name.split("::").next().unwrap_or(type_name);
        Self::new(crate_name)
    }

    /// 扫描器的模块路径前缀
    pub fn module_prefix(&self) -> &str {
        &self.module_prefix
    }

    /// 模块路径是否落在扫描范围内
    pub fn matches(&self, module_path: &str) -> bool {
        match module_path.strip_prefix(self.module_prefix.as_str()) {
            Some("") => true,
            Some(rest) => rest.starts_with("::"),
            None => false,
        }
    }

    /// 获取扫描范围内的服务描述符快照
    pub fn descriptors(&self) -> Vec<ServiceDescriptor> {
        module_registry().services_in(|path| self.matches(path))
    }

    /// 把扫描范围内的服务描述符注册进注册表，返回注册数量
    pub fn register_into(&self, services: &mut ServiceCollection) -> RegistryResult<usize> {
        let descriptors = self.descriptors();
        let count = descriptors.len();
        for descriptor in descriptors {
            services.register_descriptor(descriptor)?;
        }
        info!(
            "模块扫描完成: 前缀 {} 下注册 {} 个服务",
            self.module_prefix, count
        );
        Ok(count)
    }

    /// 执行扫描范围内尚未运行过的启动初始化器，返回执行数量
    pub fn run_initializers(&self) -> usize {
        let count = module_registry().run_initializers_in(|path| self.matches(path));
        info!(
            "启动初始化完成: 前缀 {} 下执行 {} 个初始化器",
            self.module_prefix, count
        );
        count
    }
}
