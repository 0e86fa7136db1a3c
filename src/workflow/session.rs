//! 应用状态机 - 流程层
//!
//! 核心职责：管理四个界面状态之间的转换，携带各状态下合法的数据
//!
//! ## 状态转换
//! - Intake → Configuring：提取成功且文本非空
//! - Configuring → Running：生成成功且至少返回 1 道题目
//! - Configuring → Intake：用户返回，清除已提取文本
//! - Running → Results：执行器上报完成
//! - Running → Intake：用户确认停止，清空整个会话
//! - Results → Intake：用户重新开始，清空整个会话
//!
//! 提取或生成失败时停留在原状态并记录可读的错误信息。
//! 异步调用未完成时 loading 字段非空，期间拒绝重复提交

use crate::error::{AppResult, GenerationError, StateError};
use crate::models::{Question, QuizConfig};
use crate::workflow::runner::QuizRunner;

/// 应用状态
///
/// 每个变体只携带该状态下合法的数据
pub enum AppState {
    /// 等待用户提交 PDF 文件
    Intake,
    /// 文本已提取，等待用户配置测验
    Configuring { source_text: String },
    /// 测验进行中
    Running {
        config: QuizConfig,
        runner: QuizRunner,
    },
    /// 测验完成，展示结果
    Results {
        score: usize,
        total: usize,
        elapsed_secs: u64,
    },
}

impl AppState {
    /// 状态名称，用于日志和错误信息
    pub fn name(&self) -> &'static str {
        match self {
            AppState::Intake => "Intake",
            AppState::Configuring { .. } => "Configuring",
            AppState::Running { .. } => "Running",
            AppState::Results { .. } => "Results",
        }
    }
}

/// 会话：状态机独占持有的全部临时数据
///
/// 职责：
/// - 持有当前状态、错误信息和 loading 信息
/// - 提供受保护的状态转换方法，非法转换返回错误
/// - 转换方法本身是同步纯逻辑，异步调用由流程层负责
pub struct QuizSession {
    state: AppState,
    error: Option<String>,
    loading: Option<String>,
}

impl QuizSession {
    /// 创建新会话，初始状态为 Intake
    pub fn new() -> Self {
        Self {
            state: AppState::Intake,
            error: None,
            loading: None,
        }
    }

    /// 当前状态
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// 当前错误信息
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// 当前 loading 信息，非空表示有异步操作在进行中
    pub fn loading(&self) -> Option<&str> {
        self.loading.as_deref()
    }

    /// 获取执行器的可变引用（仅 Running 状态）
    pub fn runner_mut(&mut self) -> Option<&mut QuizRunner> {
        match &mut self.state {
            AppState::Running { runner, .. } => Some(runner),
            _ => None,
        }
    }

    /// 标记一个异步操作开始
    ///
    /// 同一时间只允许一个操作在进行中，重复提交返回错误
    pub fn begin_loading(&mut self, message: impl Into<String>) -> AppResult<()> {
        if let Some(current) = &self.loading {
            return Err(StateError::OperationInFlight {
                message: current.clone(),
            }
            .into());
        }
        self.loading = Some(message.into());
        self.error = None;
        Ok(())
    }

    /// 提取成功：Intake → Configuring
    pub fn extraction_succeeded(&mut self, source_text: String) -> AppResult<()> {
        if !matches!(self.state, AppState::Intake) {
            return Err(StateError::InvalidTransition {
                state: self.state.name(),
                operation: "extraction_succeeded",
            }
            .into());
        }
        self.state = AppState::Configuring { source_text };
        self.loading = None;
        self.error = None;
        Ok(())
    }

    /// 提取失败：停留在 Intake 并记录错误
    pub fn extraction_failed(&mut self, message: String) {
        self.loading = None;
        self.error = Some(message);
    }

    /// 生成成功：Configuring → Running
    pub fn generation_succeeded(
        &mut self,
        config: QuizConfig,
        questions: Vec<Question>,
    ) -> AppResult<()> {
        if !matches!(self.state, AppState::Configuring { .. }) {
            return Err(StateError::InvalidTransition {
                state: self.state.name(),
                operation: "generation_succeeded",
            }
            .into());
        }
        if questions.is_empty() {
            return Err(GenerationError::EmptyResult.into());
        }
        self.state = AppState::Running {
            config,
            runner: QuizRunner::new(questions),
        };
        self.loading = None;
        self.error = None;
        Ok(())
    }

    /// 生成失败：停留在 Configuring 并记录错误
    pub fn generation_failed(&mut self, message: String) {
        self.loading = None;
        self.error = Some(message);
    }

    /// 用户返回：Configuring → Intake，丢弃已提取文本
    pub fn back_to_intake(&mut self) -> AppResult<()> {
        if !matches!(self.state, AppState::Configuring { .. }) {
            return Err(StateError::InvalidTransition {
                state: self.state.name(),
                operation: "back_to_intake",
            }
            .into());
        }
        self.state = AppState::Intake;
        self.error = None;
        Ok(())
    }

    /// 执行器上报完成：Running → Results
    pub fn quiz_completed(
        &mut self,
        score: usize,
        total: usize,
        elapsed_secs: u64,
    ) -> AppResult<()> {
        if !matches!(self.state, AppState::Running { .. }) {
            return Err(StateError::InvalidTransition {
                state: self.state.name(),
                operation: "quiz_completed",
            }
            .into());
        }
        self.state = AppState::Results {
            score,
            total,
            elapsed_secs,
        };
        self.error = None;
        Ok(())
    }

    /// 用户确认停止：Running → Intake，清空整个会话
    pub fn quiz_stopped(&mut self) -> AppResult<()> {
        match &mut self.state {
            AppState::Running { runner, .. } => {
                runner.stop();
                self.state = AppState::Intake;
                self.error = None;
                self.loading = None;
                Ok(())
            }
            state => Err(StateError::InvalidTransition {
                state: state.name(),
                operation: "quiz_stopped",
            }
            .into()),
        }
    }

    /// 重新开始：任意状态 → Intake，清空整个会话
    pub fn restart(&mut self) {
        if let AppState::Running { runner, .. } = &mut self.state {
            runner.stop();
        }
        self.state = AppState::Intake;
        self.error = None;
        self.loading = None;
    }
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

/// 准确率（百分比，四舍五入取整）
pub fn accuracy_percent(score: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((score as f64 / total as f64) * 100.0).round() as u32
}
