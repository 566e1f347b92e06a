//! 宿主设置
//!
//! TOML 配置文件加环境变量覆盖。设置以单例实例注册进注册表，
//! 服务通过 `#[inject]` 字段获取。

use crate::logging::LoggingConfig;
use host_common::{BootstrapError, BootstrapResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// 应用基本信息
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    /// 应用名称
    pub name: String,
    /// 运行环境（development / production）
    pub environment: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            name: "service-host".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// 宿主设置
///
/// 未在配置文件中出现的字段取默认值；`values` 收纳应用自定义的
/// 字符串键值项。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSettings {
    /// 应用基本信息
    pub application: ApplicationSettings,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 应用自定义键值项
    pub values: BTreeMap<String, String>,
}

impl HostSettings {
    /// 从 TOML 配置文件加载设置
    pub fn load(path: impl AsRef<Path>) -> BootstrapResult<Self> {
        let path = path.as_ref();
        debug!("加载宿主配置: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|error| BootstrapError::ConfigParse {
            message: error.to_string(),
        })
    }

    /// 用带前缀的环境变量覆盖设置
    ///
    /// `{prefix}APPLICATION_NAME`、`{prefix}APPLICATION_ENVIRONMENT` 与
    /// `{prefix}LOGGING_LEVEL` 覆盖对应字段，其余带前缀的变量进入
    /// `values`（键转为小写）。
    pub fn apply_env_overrides(&mut self, prefix: &str) {
        for (key, value) in std::env::vars() {
            let Some(rest) = key.strip_prefix(prefix) else {
                continue;
            };
            match rest {
                "APPLICATION_NAME" => self.application.name = value,
                "APPLICATION_ENVIRONMENT" => self.application.environment = value,
                "LOGGING_LEVEL" => self.logging.level = value,
                other => {
                    self.values.insert(other.to_ascii_lowercase(), value);
                }
            }
        }
    }

    /// 读取应用自定义键值项
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.application.environment.eq_ignore_ascii_case("development")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_a_development_host() {
        let settings = HostSettings::default();
        assert_eq!(settings.application.name, "service-host");
        assert!(settings.is_development());
        assert!(settings.values.is_empty());
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_fields() {
        let settings: HostSettings = toml::from_str(
            r#"
            [application]
            name = "billing-host"

            [values]
            region = "eu-west-1"
            "#,
        )
        .unwrap();

        assert_eq!(settings.application.name, "billing-host");
        assert!(settings.is_development());
        assert_eq!(settings.get("region"), Some("eu-west-1"));
        assert_eq!(settings.get("missing"), None);
    }

    #[test]
    fn env_overrides_replace_known_fields_and_collect_the_rest() {
        std::env::set_var("HOST_CFG_TEST_APPLICATION_NAME", "from-env");
        std::env::set_var("HOST_CFG_TEST_LOGGING_LEVEL", "trace");
        std::env::set_var("HOST_CFG_TEST_REGION", "ap-east-1");

        let mut settings = HostSettings::default();
        settings.apply_env_overrides("HOST_CFG_TEST_");

        assert_eq!(settings.application.name, "from-env");
        assert_eq!(settings.logging.level, "trace");
        assert_eq!(settings.get("region"), Some("ap-east-1"));

        std::env::remove_var("HOST_CFG_TEST_APPLICATION_NAME");
        std::env::remove_var("HOST_CFG_TEST_LOGGING_LEVEL");
        std::env::remove_var("HOST_CFG_TEST_REGION");
    }
}
