//! 测验流程 - 流程层
//!
//! 核心职责：编排"提取 → 配置 → 生成"的异步调用，
//! 把服务层的结果转换为状态机转换
//!
//! ## 约定
//! - 同一时间只允许一个异步操作在进行中（单飞约定），由会话的
//!   loading 标记强制执行，而不是依赖界面不可用
//! - 协作方的失败在这里被捕获并转成会话上的可读错误信息，
//!   不向上传播，也不自动重试

use std::path::PathBuf;

use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{AppError, AppResult, ExtractionError};
use crate::models::QuizConfig;
use crate::services::{PdfExtractor, QuizGenerator};
use crate::utils::logging::{log_extraction_done, log_generation_done, truncate_text};
use crate::workflow::session::{AppState, QuizSession};

/// 测验流程
///
/// 职责：
/// - 持有两个业务能力（提取、生成）
/// - 不持有会话，会话由调用方传入
pub struct QuizFlow {
    extractor: PdfExtractor,
    generator: QuizGenerator,
    verbose_logging: bool,
}

impl QuizFlow {
    /// 创建新的测验流程
    pub fn new(config: &Config) -> Self {
        Self {
            extractor: PdfExtractor::new(),
            generator: QuizGenerator::new(config),
            verbose_logging: config.verbose_logging,
        }
    }

    /// 提交一批 PDF 文件做文本提取
    ///
    /// 提取失败会记录在会话上并停留在 Intake，方法本身仍返回 Ok；
    /// 返回 Err 只发生在违反状态机约定时
    pub async fn submit_files(
        &self,
        session: &mut QuizSession,
        paths: &[PathBuf],
    ) -> AppResult<()> {
        if !matches!(session.state(), AppState::Intake) {
            return Err(AppError::invalid_transition(
                session.state().name(),
                "submit_files",
            ));
        }

        session.begin_loading("正在从 PDF 提取文本...")?;
        info!("⏳ 正在从 PDF 提取文本...");

        match self.read_and_extract(paths).await {
            Ok(text) => {
                if self.verbose_logging {
                    debug!("提取文本预览: {}", truncate_text(&text, 200));
                }
                log_extraction_done(paths.len(), text.chars().count());
                session.extraction_succeeded(text)?;
            }
            Err(e) => {
                error!("❌ {}", e);
                session.extraction_failed(e.to_string());
            }
        }

        Ok(())
    }

    /// 提交测验配置做试题生成
    ///
    /// 生成失败会记录在会话上并停留在 Configuring，方法本身仍返回 Ok；
    /// 返回 Err 只发生在违反状态机约定时
    pub async fn submit_config(
        &self,
        session: &mut QuizSession,
        config: QuizConfig,
    ) -> AppResult<()> {
        let source_text = match session.state() {
            AppState::Configuring { source_text } => source_text.clone(),
            state => {
                return Err(AppError::invalid_transition(state.name(), "submit_config"));
            }
        };

        session.begin_loading("正在通过 LLM 生成试题，可能需要一点时间...")?;
        info!("⏳ 正在通过 LLM 生成试题，可能需要一点时间...");

        match self.generator.generate(&source_text, &config).await {
            Ok(questions) => {
                log_generation_done(questions.len(), config.difficulty.label());
                session.generation_succeeded(config, questions)?;
            }
            Err(e) => {
                error!("❌ {}", e);
                session.generation_failed(e.to_string());
            }
        }

        Ok(())
    }

    /// 按输入顺序读取所有文件并整批提取
    async fn read_and_extract(&self, paths: &[PathBuf]) -> Result<String, ExtractionError> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes =
                tokio::fs::read(path)
                    .await
                    .map_err(|e| ExtractionError::ReadFailed {
                        path: path.display().to_string(),
                        source: e,
                    })?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            files.push((name, bytes));
        }
        self.extractor.extract_all(&files)
    }
}
