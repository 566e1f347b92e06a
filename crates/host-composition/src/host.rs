//! 构建完成的宿主

use crate::config::HostSettings;
use di_container::InjectingProvider;
use host_common::{BootstrapError, BootstrapResult};
use std::sync::Arc;
use tracing::info;

/// 构建完成的宿主
///
/// 持有封存后的包装提供者与生效的宿主设置。
/// [`run`](Host::run) 并发驱动全部宿主服务直至结束。
pub struct Host {
    provider: Arc<InjectingProvider>,
    settings: HostSettings,
}

impl Host {
    pub(crate) fn new(provider: InjectingProvider, settings: HostSettings) -> Self {
        Self {
            provider: Arc::new(provider),
            settings,
        }
    }

    /// 宿主的包装提供者
    pub fn provider(&self) -> &Arc<InjectingProvider> {
        &self.provider
    }

    /// 生效的宿主设置
    pub fn settings(&self) -> &HostSettings {
        &self.settings
    }

    /// 运行全部宿主服务直至结束
    ///
    /// 任一服务失败即返回错误；没有注册宿主服务时立即返回。
    pub async fn run(&self) -> BootstrapResult<()> {
        let services = self.provider.hosted_services()?;
        if services.is_empty() {
            info!("没有注册宿主服务，运行循环立即结束");
            return Ok(());
        }

        info!("启动 {} 个宿主服务", services.len());
        let tasks = services.into_iter().map(|service| async move {
            let name = service.name();
            info!("宿主服务开始运行: {}", name);
            service
                .run()
                .await
                .map_err(|error| BootstrapError::HostedService {
                    name: name.to_string(),
                    message: error.to_string(),
                })
        });

        futures::future::try_join_all(tasks).await?;
        info!("全部宿主服务运行结束");
        Ok(())
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("provider", &self.provider)
            .field("settings", &self.settings)
            .finish()
    }
}
