//! 错误类型定义

use thiserror::Error;

/// 依赖解析错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("服务未注册: {type_name}")]
    ServiceNotRegistered { type_name: String },

    #[error("必需服务注入失败: {type_name}.{property}")]
    MissingRequiredService {
        type_name: String,
        property: String,
        #[source]
        source: Box<DependencyError>,
    },

    #[error("服务实例类型不匹配: {type_name}")]
    TypeMismatch { type_name: String },

    #[error("检测到循环依赖: {dependency_chain}")]
    CircularDependency { dependency_chain: String },

    #[error("预构建实例已被消费: {type_name}")]
    InstanceConsumed { type_name: String },

    #[error("服务工厂执行失败: {type_name}, 原因: {message}")]
    FactoryFailed { type_name: String, message: String },
}

impl DependencyError {
    /// 创建必需服务注入失败错误
    pub fn missing_required(
        type_name: impl Into<String>,
        property: impl Into<String>,
        source: DependencyError,
    ) -> Self {
        Self::MissingRequiredService {
            type_name: type_name.into(),
            property: property.into(),
            source: Box::new(source),
        }
    }
}

/// 服务注册错误类型
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("注册表已封存，无法继续注册")]
    AlreadySealed,

    #[error("服务键重复注册: {key_name}")]
    DuplicateService { key_name: String },
}

/// 宿主启动错误类型
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("启动类型解析失败: {type_name}")]
    StartupResolution {
        type_name: String,
        #[source]
        source: DependencyError,
    },

    #[error("服务注册失败: {source}")]
    Registry {
        #[from]
        source: RegistryError,
    },

    #[error("依赖解析失败: {source}")]
    Dependency {
        #[from]
        source: DependencyError,
    },

    #[error("配置文件读取失败: {source}")]
    ConfigRead {
        #[from]
        source: std::io::Error,
    },

    #[error("配置解析失败: {message}")]
    ConfigParse { message: String },

    #[error("日志初始化失败: {message}")]
    LoggingInit { message: String },

    #[error("宿主服务运行失败: {name}, 原因: {message}")]
    HostedService { name: String, message: String },
}

/// 结果类型别名
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type RegistryResult<T> = Result<T, RegistryError>;
pub type BootstrapResult<T> = Result<T, BootstrapError>;
