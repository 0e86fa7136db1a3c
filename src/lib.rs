//! # PDF Quiz Generator
//!
//! 一个从 PDF 文档生成选择题测验的终端应用程序
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 纯数据类型，不依赖任何流程
//! - `Question` - 一道选择题（题干 / 4 个选项 / 正确答案 / 解析）
//! - `QuizConfig` - 测验配置（题目数量 + 难度）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个服务只管一件事
//! - `PdfExtractor` - PDF 字节 → 纯文本能力
//! - `QuizGenerator` - 文本 → 选择题列表能力（LLM）
//! - `QuizTimer` - 按秒计时能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义状态转换和作答流程
//! - `QuizSession` - 四状态的应用状态机（Intake / Configuring / Running / Results）
//! - `QuizRunner` - 逐题作答、判分、上报结果
//! - `QuizFlow` - 编排异步调用，把服务结果转成状态转换
//!
//! ### ④ 编排层（App）
//! - `app` - 终端界面主循环，把输入翻译成流程调用
//!
//! ## 模块结构

pub mod app;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Difficulty, Question, QuizConfig};
pub use services::{PdfExtractor, QuizGenerator, QuizTimer};
pub use workflow::{AdvanceOutcome, AppState, QuizFlow, QuizRunner, QuizSession};
