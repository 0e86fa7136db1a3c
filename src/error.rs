use std::fmt;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 文本提取错误
    Extraction(ExtractionError),
    /// 试题生成错误
    Generation(GenerationError),
    /// 配置错误
    Config(ConfigError),
    /// 状态机错误
    State(StateError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Extraction(e) => write!(f, "提取错误: {}", e),
            AppError::Generation(e) => write!(f, "生成错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::State(e) => write!(f, "状态错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Extraction(e) => Some(e),
            AppError::Generation(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::State(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 文本提取错误
///
/// 任意一个文件提取失败都会使整批提取失败，不保留部分结果
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// PDF 解析失败
    #[error("无法解析 PDF 文件 ({name}): {source}")]
    LoadFailed {
        name: String,
        #[source]
        source: lopdf::Error,
    },
    /// 提取某一页文本失败
    #[error("提取文本失败 ({name} 第 {page} 页): {source}")]
    TextFailed {
        name: String,
        page: u32,
        #[source]
        source: lopdf::Error,
    },
    /// 提取结果为空
    #[error("提取结果为空，PDF 中可能没有可提取的文本")]
    EmptyText,
}

/// 试题生成错误
#[derive(Debug, Error)]
pub enum GenerationError {
    /// LLM API 调用失败
    #[error("LLM API 调用失败 (模型: {model}): {source}")]
    RequestFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 凭证无效
    #[error("LLM API 凭证无效 (模型: {model})，请检查 LLM_API_KEY 是否正确")]
    InvalidApiKey { model: String },
    /// LLM 返回内容为空
    #[error("LLM 返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 返回的 JSON 解析失败
    #[error("LLM 返回的 JSON 解析失败 (响应预览: {preview}): {source}")]
    ParseFailed {
        preview: String,
        #[source]
        source: serde_json::Error,
    },
    /// 某道题目不符合题目格式约定
    #[error("第 {index} 道题目不符合要求: {reason}")]
    InvalidQuestion { index: usize, reason: String },
    /// 生成成功但没有返回任何题目
    #[error("LLM 没有返回任何题目，文本内容可能过短或过于复杂")]
    EmptyResult,
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 缺少 API 密钥（启动时致命错误）
    ApiKeyMissing,
    /// 环境变量解析失败
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件解析失败
    FileParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ApiKeyMissing => {
                write!(f, "未配置 LLM API 密钥，请设置环境变量 LLM_API_KEY")
            }
            ConfigError::EnvVarParseFailed {
                var_name,
                value,
                expected_type,
            } => {
                write!(
                    f,
                    "环境变量 {} 解析失败: 值 '{}' 无法转换为 {}",
                    var_name, value, expected_type
                )
            }
            ConfigError::FileParseFailed { path, source } => {
                write!(f, "配置文件解析失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 状态机错误
///
/// 表示调用方违反了状态机约定（在错误的状态下触发操作、
/// 在异步调用未完成时重复提交等），不属于用户可恢复的业务失败
#[derive(Debug)]
pub enum StateError {
    /// 在当前状态下不允许执行该操作
    InvalidTransition {
        state: &'static str,
        operation: &'static str,
    },
    /// 已有异步操作在进行中
    OperationInFlight { message: String },
    /// 选项索引超出范围
    IndexOutOfRange { index: usize, max_index: usize },
    /// 未选择答案就确认
    NoSelection,
    /// 未确认答案就进入下一题
    NotConfirmed,
    /// 测验已经结束
    QuizFinished,
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::InvalidTransition { state, operation } => {
                write!(f, "当前状态 {} 不允许执行操作 {}", state, operation)
            }
            StateError::OperationInFlight { message } => {
                write!(f, "已有操作在进行中: {}", message)
            }
            StateError::IndexOutOfRange { index, max_index } => {
                write!(f, "选项索引 {} 超出范围 [0, {}]", index, max_index)
            }
            StateError::NoSelection => write!(f, "尚未选择任何答案"),
            StateError::NotConfirmed => write!(f, "尚未确认当前题目的答案"),
            StateError::QuizFinished => write!(f, "测验已经结束"),
        }
    }
}

impl std::error::Error for StateError {}

// ========== 从常见错误类型转换 ==========

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        AppError::Extraction(err)
    }
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        AppError::Generation(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<StateError> for AppError {
    fn from(err: StateError) -> Self {
        AppError::State(err)
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建"操作进行中"错误
    pub fn operation_in_flight(message: impl Into<String>) -> Self {
        AppError::State(StateError::OperationInFlight {
            message: message.into(),
        })
    }

    /// 创建非法状态转换错误
    pub fn invalid_transition(state: &'static str, operation: &'static str) -> Self {
        AppError::State(StateError::InvalidTransition { state, operation })
    }

    /// 创建其他错误
    pub fn other(message: impl Into<String>) -> Self {
        AppError::Other(message.into())
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
