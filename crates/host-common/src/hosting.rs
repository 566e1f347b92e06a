//! 宿主服务契约

use crate::errors::BootstrapError;
use async_trait::async_trait;

/// 宿主服务 trait
///
/// 通过 `ServiceCollection::add_hosted` 注册，宿主构建完成后
/// 由运行循环并发驱动直至全部结束。
#[async_trait]
pub trait HostedService: Send + Sync + 'static {
    /// 服务名称
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// 运行服务直至完成
    async fn run(&self) -> Result<(), BootstrapError>;
}
