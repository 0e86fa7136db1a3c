//! 应用入口 - 编排层
//!
//! 持有会话和测验流程，把终端输入翻译成流程调用，
//! 按当前状态渲染四个界面中的一个

use std::path::PathBuf;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

use crate::config::Config;
use crate::models::{Difficulty, QuizConfig, QUESTION_COUNT_OPTIONS};
use crate::services::format_elapsed;
use crate::utils::logging::{log_startup, print_final_stats};
use crate::workflow::{
    accuracy_percent, AdvanceOutcome, AppState, QuizFlow, QuizRunner, QuizSession,
};

/// 默认题目数量
const DEFAULT_NUM_QUESTIONS: usize = 10;

/// 应用主结构
pub struct App {
    flow: QuizFlow,
    session: QuizSession,
    input: Lines<BufReader<Stdin>>,
}

/// 界面处理结果
enum ScreenOutcome {
    /// 继续主循环
    Continue,
    /// 退出程序
    Quit,
}

/// 主循环用的界面标识，避免长期借用会话状态
enum Screen {
    Intake,
    Configuring,
    Running,
    Results,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config.llm_model_name);

        Ok(Self {
            flow: QuizFlow::new(&config),
            session: QuizSession::new(),
            input: BufReader::new(tokio::io::stdin()).lines(),
        })
    }

    /// 运行应用主循环
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let screen = match self.session.state() {
                AppState::Intake => Screen::Intake,
                AppState::Configuring { .. } => Screen::Configuring,
                AppState::Running { .. } => Screen::Running,
                AppState::Results { .. } => Screen::Results,
            };

            let outcome = match screen {
                Screen::Intake => self.intake_screen().await?,
                Screen::Configuring => self.configuring_screen().await?,
                Screen::Running => self.running_screen().await?,
                Screen::Results => self.results_screen().await?,
            };

            if matches!(outcome, ScreenOutcome::Quit) {
                break;
            }
        }

        info!("👋 会话结束，所有数据已丢弃");
        Ok(())
    }

    /// 界面 1：提交 PDF 文件
    async fn intake_screen(&mut self) -> Result<ScreenOutcome> {
        println!();
        println!("━━━ 上传 PDF ━━━");
        if let Some(error) = self.session.error() {
            println!("❌ {}", error);
        }
        println!("请输入 PDF 文件路径（多个文件用空格分隔，q 退出）：");

        let line = match Self::read_line(&mut self.input).await? {
            Some(line) => line,
            None => return Ok(ScreenOutcome::Quit),
        };
        if line.is_empty() {
            return Ok(ScreenOutcome::Continue);
        }
        if line == "q" {
            return Ok(ScreenOutcome::Quit);
        }

        let paths: Vec<PathBuf> = line.split_whitespace().map(PathBuf::from).collect();

        // 扩展名过滤只做提示，不做强制校验
        for path in &paths {
            let is_pdf = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false);
            if !is_pdf {
                warn!("⚠️ {} 不是 .pdf 扩展名，仍按 PDF 尝试解析", path.display());
            }
        }

        self.flow.submit_files(&mut self.session, &paths).await?;
        Ok(ScreenOutcome::Continue)
    }

    /// 界面 2：配置测验
    async fn configuring_screen(&mut self) -> Result<ScreenOutcome> {
        println!();
        println!("━━━ 配置测验 ━━━");
        if let Some(error) = self.session.error() {
            println!("❌ {}", error);
        }

        println!(
            "题目数量 {:?}（默认 {}，b 返回，q 退出）：",
            QUESTION_COUNT_OPTIONS, DEFAULT_NUM_QUESTIONS
        );
        let line = match Self::read_line(&mut self.input).await? {
            Some(line) => line,
            None => return Ok(ScreenOutcome::Quit),
        };
        if line == "q" {
            return Ok(ScreenOutcome::Quit);
        }
        if line == "b" {
            self.session.back_to_intake()?;
            return Ok(ScreenOutcome::Continue);
        }
        let num_questions = if line.is_empty() {
            DEFAULT_NUM_QUESTIONS
        } else {
            match line.parse::<usize>() {
                Ok(n) => n,
                Err(_) => {
                    println!("无法识别的数量: {}", line);
                    return Ok(ScreenOutcome::Continue);
                }
            }
        };

        println!("难度 1) Fácil 2) Medio 3) Difícil（默认 2，b 返回）：");
        let line = match Self::read_line(&mut self.input).await? {
            Some(line) => line,
            None => return Ok(ScreenOutcome::Quit),
        };
        if line == "q" {
            return Ok(ScreenOutcome::Quit);
        }
        if line == "b" {
            self.session.back_to_intake()?;
            return Ok(ScreenOutcome::Continue);
        }
        let difficulty = match line.as_str() {
            "" | "2" => Difficulty::Medium,
            "1" => Difficulty::Easy,
            "3" => Difficulty::Hard,
            other => match Difficulty::from_label(other) {
                Some(difficulty) => difficulty,
                None => {
                    println!("无法识别的难度: {}", other);
                    return Ok(ScreenOutcome::Continue);
                }
            },
        };

        let config = match QuizConfig::new(num_questions, difficulty) {
            Ok(config) => config,
            Err(reason) => {
                println!("{}", reason);
                return Ok(ScreenOutcome::Continue);
            }
        };

        self.flow.submit_config(&mut self.session, config).await?;
        Ok(ScreenOutcome::Continue)
    }

    /// 界面 3：逐题作答
    async fn running_screen(&mut self) -> Result<ScreenOutcome> {
        // 计时从进入本界面开始，start 幂等
        let answered = match self.session.runner_mut() {
            Some(runner) => {
                runner.start();
                runner.is_answered()
            }
            None => return Ok(ScreenOutcome::Continue),
        };

        if let AppState::Running { config, runner } = self.session.state() {
            render_question(config, runner);
        }

        let line = match Self::read_line(&mut self.input).await? {
            Some(line) => line,
            None => return Ok(ScreenOutcome::Quit),
        };

        if line == "s" {
            return self.confirm_stop().await;
        }

        if !answered {
            match line.as_str() {
                "c" => {
                    if let Some(runner) = self.session.runner_mut() {
                        if runner.confirm_answer().is_err() {
                            println!("请先选择一个答案再确认");
                        }
                    }
                }
                other => match other.parse::<usize>() {
                    Ok(n) if (1..=4).contains(&n) => {
                        if let Some(runner) = self.session.runner_mut() {
                            runner.select_answer(n - 1)?;
                        }
                    }
                    _ => println!("无法识别的输入: {}", other),
                },
            }
        } else if line.is_empty() {
            let outcome = match self.session.runner_mut() {
                Some(runner) => runner.advance()?,
                None => return Ok(ScreenOutcome::Continue),
            };
            if let AdvanceOutcome::Finished {
                score,
                total,
                elapsed_secs,
            } = outcome
            {
                self.session.quiz_completed(score, total, elapsed_secs)?;
            }
        } else {
            println!("无法识别的输入: {}", line);
        }

        Ok(ScreenOutcome::Continue)
    }

    /// 界面 4：展示结果
    async fn results_screen(&mut self) -> Result<ScreenOutcome> {
        if let AppState::Results {
            score,
            total,
            elapsed_secs,
        } = self.session.state()
        {
            let (score, total, elapsed_secs) = (*score, *total, *elapsed_secs);
            let accuracy = accuracy_percent(score, total);

            print_final_stats(score, total, accuracy, &format_elapsed(elapsed_secs));
            println!("{}", feedback_message(accuracy));
            println!("按回车重新开始，q 退出：");

            let line = match Self::read_line(&mut self.input).await? {
                Some(line) => line,
                None => return Ok(ScreenOutcome::Quit),
            };
            if line == "q" {
                return Ok(ScreenOutcome::Quit);
            }
            self.session.restart();
        }
        Ok(ScreenOutcome::Continue)
    }

    /// 停止测验前的二次确认
    async fn confirm_stop(&mut self) -> Result<ScreenOutcome> {
        println!("确定要停止测验吗？当前进度将丢失 (s/n)：");
        let line = match Self::read_line(&mut self.input).await? {
            Some(line) => line,
            None => return Ok(ScreenOutcome::Quit),
        };
        if line.eq_ignore_ascii_case("s") {
            self.session.quiz_stopped()?;
            info!("🛑 测验已停止，未记录成绩");
        }
        Ok(ScreenOutcome::Continue)
    }

    /// 读取一行输入并去掉首尾空白，EOF 时返回 None
    async fn read_line(input: &mut Lines<BufReader<Stdin>>) -> Result<Option<String>> {
        Ok(input
            .next_line()
            .await?
            .map(|line| line.trim().to_string()))
    }
}

/// 渲染当前题目和作答提示
fn render_question(config: &QuizConfig, runner: &QuizRunner) {
    println!();
    println!(
        "━━━ 第 {}/{} 题 | 难度 {} | 用时 {} ━━━",
        runner.current_number(),
        runner.total(),
        config.difficulty,
        runner.formatted_time()
    );

    let question = runner.current_question();
    println!("{}", question.question);
    for (index, option) in question.options.iter().enumerate() {
        let marker = if runner.is_answered() {
            if *option == question.correct_answer {
                " ✓"
            } else if runner.selected() == Some(index) {
                " ✗"
            } else {
                ""
            }
        } else if runner.selected() == Some(index) {
            " ←"
        } else {
            ""
        };
        println!("  {}) {}{}", index + 1, option, marker);
    }

    if runner.is_answered() {
        let correct = runner
            .selected()
            .map(|index| question.options[index] == question.correct_answer)
            .unwrap_or(false);
        if correct {
            println!("✓ 回答正确");
        } else {
            println!("✗ 回答错误，正确答案是: {}", question.correct_answer);
        }
        println!("解析: {}", question.explanation);
        if runner.is_last_question() {
            println!("按回车查看结果（s 停止测验）：");
        } else {
            println!("按回车进入下一题（s 停止测验）：");
        }
    } else {
        println!("输入 1-4 选择答案，c 确认，s 停止测验：");
    }
}

/// 按准确率给出一句总评
fn feedback_message(accuracy: u32) -> &'static str {
    if accuracy >= 90 {
        "🏆 非常出色！"
    } else if accuracy >= 70 {
        "🎉 表现很好！"
    } else if accuracy >= 50 {
        "💪 继续努力！"
    } else {
        "📖 多加练习！"
    }
}
