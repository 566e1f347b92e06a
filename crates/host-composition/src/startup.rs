//! 启动配置契约

use di_container::ServiceCollection;
use host_common::RegistryResult;

/// 启动配置 trait
///
/// 宿主构建的入口类型。编排器先在临时注册表中以瞬时生命周期
/// 注册并解析它（启动类型自身因此可以被属性注入），再调用
/// [`configure_services`](Startup::configure_services) 补充标记宏
/// 覆盖不到的手动注册。
pub trait Startup: Default + Send + Sync + 'static {
    /// 手动注册钩子
    ///
    /// 在模块扫描注册完成之后、注册表封存之前调用一次。
    /// 默认实现不做任何注册。
    fn configure_services(&self, _services: &mut ServiceCollection) -> RegistryResult<()> {
        Ok(())
    }
}
