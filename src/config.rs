use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{AppResult, ConfigError};

/// 默认的 OpenAI 兼容 API 地址（Google Gemini 的兼容端点）
const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// 默认模型
const DEFAULT_MODEL_NAME: &str = "gemini-2.5-flash";

/// 可选的本地配置文件
const CONFIG_FILE: &str = "config.toml";

/// 程序配置
///
/// 加载顺序：默认值 → config.toml（可选） → 环境变量。
/// API 密钥没有默认值，缺失时启动直接失败
#[derive(Clone, Debug)]
pub struct Config {
    /// LLM API 密钥
    pub llm_api_key: String,
    /// LLM API 基础 URL（OpenAI 兼容端点）
    pub llm_api_base_url: String,
    /// 模型名称
    pub llm_model_name: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

/// config.toml 的反序列化结构，所有字段可选
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    llm_api_key: Option<String>,
    llm_api_base_url: Option<String>,
    llm_model_name: Option<String>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 加载配置
    ///
    /// # 返回
    /// API 密钥缺失时返回 ConfigError::ApiKeyMissing
    pub fn load() -> AppResult<Self> {
        let file = Self::load_file(Path::new(CONFIG_FILE))?;

        let llm_api_key = std::env::var("LLM_API_KEY")
            .ok()
            .or(file.llm_api_key)
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::ApiKeyMissing)?;

        let llm_api_base_url = std::env::var("LLM_API_BASE_URL")
            .ok()
            .or(file.llm_api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let llm_model_name = std::env::var("LLM_MODEL_NAME")
            .ok()
            .or(file.llm_model_name)
            .unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string());

        let verbose_logging = match std::env::var("VERBOSE_LOGGING") {
            Ok(value) => value.parse().map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: "VERBOSE_LOGGING".to_string(),
                value,
                expected_type: "bool".to_string(),
            })?,
            Err(_) => file.verbose_logging.unwrap_or(false),
        };

        Ok(Self {
            llm_api_key,
            llm_api_base_url,
            llm_model_name,
            verbose_logging,
        })
    }

    /// 读取可选的配置文件，文件不存在时返回默认值
    fn load_file(path: &Path) -> AppResult<ConfigFile> {
        if !path.exists() {
            return Ok(ConfigFile::default());
        }

        debug!("读取配置文件: {}", path.display());

        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileParseFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })?;

        let file = toml::from_str(&content).map_err(|e| ConfigError::FileParseFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

        Ok(file)
    }
}
