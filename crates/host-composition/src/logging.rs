//! 日志初始化

use host_common::{BootstrapError, BootstrapResult};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 过滤指令（`tracing_subscriber::EnvFilter` 语法）
    pub level: String,
    /// 是否输出 JSON 格式
    pub json: bool,
    /// 是否输出事件来源目标
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            with_target: true,
        }
    }
}

impl LoggingConfig {
    /// 开发环境配置：调试级别的可读输出
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json: false,
            with_target: true,
        }
    }

    /// 生产环境配置：信息级别的 JSON 输出
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
            with_target: false,
        }
    }
}

/// 初始化全局日志订阅器
///
/// 进程内只能成功一次，重复初始化返回
/// [`BootstrapError::LoggingInit`]。
pub fn init_logging(config: &LoggingConfig) -> BootstrapResult<()> {
    let filter =
        EnvFilter::try_new(&config.level).map_err(|error| BootstrapError::LoggingInit {
            message: error.to_string(),
        })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|error| BootstrapError::LoggingInit {
        message: error.to_string(),
    })
}
