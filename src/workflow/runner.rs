//! 测验执行器 - 流程层
//!
//! 核心职责：带着用户按顺序逐题作答，维护得分和单题作答状态
//!
//! ## 约定
//! - 题目按列表顺序出示，不打乱题目和选项
//! - 确认前可以反复改选，确认后选择被冻结
//! - 得分只在确认时按完全字符串相等判定累加
//! - 完成时恰好上报一次 (得分, 用时秒数)

use crate::error::{AppResult, StateError};
use crate::models::Question;
use crate::services::QuizTimer;

/// 进入下一题的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// 还有下一题
    NextQuestion,
    /// 全部题目完成
    Finished {
        score: usize,
        total: usize,
        elapsed_secs: u64,
    },
}

/// 测验执行器
///
/// 职责：
/// - 持有题目列表和单次作答状态
/// - 计时器随测验启动和停止
/// - 完成或停止后不再接受任何作答操作
pub struct QuizRunner {
    questions: Vec<Question>,
    current_index: usize,
    selected: Option<usize>,
    answered: bool,
    score: usize,
    finished: bool,
    timer: QuizTimer,
}

impl QuizRunner {
    /// 创建新的执行器
    ///
    /// 调用方保证题目列表非空（由状态机在生成成功时校验）
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            current_index: 0,
            selected: None,
            answered: false,
            score: 0,
            finished: false,
            timer: QuizTimer::new(),
        }
    }

    /// 启动计时，幂等
    pub fn start(&mut self) {
        self.timer.start();
    }

    /// 当前题目
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    /// 当前题号（从 1 开始，用于显示）
    pub fn current_number(&self) -> usize {
        self.current_index + 1
    }

    /// 题目总数
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// 当前累计得分
    pub fn score(&self) -> usize {
        self.score
    }

    /// 当前题目是否已确认
    pub fn is_answered(&self) -> bool {
        self.answered
    }

    /// 当前选中的选项索引
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// 是否在最后一题
    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }

    /// 测验是否已结束（完成或停止）
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// 已用秒数
    pub fn elapsed_secs(&self) -> u64 {
        self.timer.elapsed_secs()
    }

    /// MM:SS 格式的已用时间
    pub fn formatted_time(&self) -> String {
        self.timer.formatted()
    }

    /// 选择一个选项
    ///
    /// 确认前重复选择会覆盖之前的选择；确认后选择是空操作
    pub fn select_answer(&mut self, option_index: usize) -> AppResult<()> {
        if self.finished {
            return Err(StateError::QuizFinished.into());
        }
        if self.answered {
            return Ok(());
        }

        let max_index = self.current_question().options.len() - 1;
        if option_index > max_index {
            return Err(StateError::IndexOutOfRange {
                index: option_index,
                max_index,
            }
            .into());
        }

        self.selected = Some(option_index);
        Ok(())
    }

    /// 确认当前选择
    ///
    /// 冻结选择并按完全字符串相等判分。未选择时拒绝确认；
    /// 重复确认不会重复计分
    ///
    /// # 返回
    /// 返回本题是否答对
    pub fn confirm_answer(&mut self) -> AppResult<bool> {
        if self.finished {
            return Err(StateError::QuizFinished.into());
        }

        let selected = self.selected.ok_or(StateError::NoSelection)?;
        let question = &self.questions[self.current_index];
        let correct = question.options[selected] == question.correct_answer;

        if !self.answered {
            self.answered = true;
            if correct {
                self.score += 1;
            }
        }

        Ok(correct)
    }

    /// 进入下一题
    ///
    /// 非最后一题时重置单题状态并推进索引；最后一题时停止计时
    /// 并恰好上报一次最终结果
    pub fn advance(&mut self) -> AppResult<AdvanceOutcome> {
        if self.finished {
            return Err(StateError::QuizFinished.into());
        }
        if !self.answered {
            return Err(StateError::NotConfirmed.into());
        }

        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            self.selected = None;
            self.answered = false;
            Ok(AdvanceOutcome::NextQuestion)
        } else {
            self.finished = true;
            self.timer.stop();
            Ok(AdvanceOutcome::Finished {
                score: self.score,
                total: self.questions.len(),
                elapsed_secs: self.timer.elapsed_secs(),
            })
        }
    }

    /// 停止测验（用户主动放弃）
    ///
    /// 停止计时，此后不再接受任何作答操作，不上报得分。
    /// 二次确认由调用方负责
    pub fn stop(&mut self) {
        self.timer.stop();
        self.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 构造 n 道题目，正确答案都在索引 0
    fn make_questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| Question {
                question: format!("¿Pregunta {}?", i + 1),
                options: vec![
                    format!("correcta {}", i + 1),
                    "mala 1".to_string(),
                    "mala 2".to_string(),
                    "mala 3".to_string(),
                ],
                correct_answer: format!("correcta {}", i + 1),
                explanation: format!("Explicación {}.", i + 1),
            })
            .collect()
    }

    #[test]
    fn test_score_counts_exact_matches() {
        let mut runner = QuizRunner::new(make_questions(10));

        // 前 7 题答对，后 3 题答错
        for i in 0..10 {
            let option = if i < 7 { 0 } else { 1 };
            runner.select_answer(option).unwrap();
            let correct = runner.confirm_answer().unwrap();
            assert_eq!(correct, i < 7);
            let outcome = runner.advance().unwrap();
            if i < 9 {
                assert_eq!(outcome, AdvanceOutcome::NextQuestion);
            } else {
                assert!(matches!(
                    outcome,
                    AdvanceOutcome::Finished {
                        score: 7,
                        total: 10,
                        ..
                    }
                ));
            }
        }
        assert_eq!(runner.score(), 7);
        assert!(runner.is_finished());
    }

    #[test]
    fn test_confirm_without_selection_rejected() {
        let mut runner = QuizRunner::new(make_questions(3));

        let result = runner.confirm_answer();

        assert!(result.is_err());
        assert_eq!(runner.score(), 0);
        assert!(!runner.is_answered());
    }

    #[test]
    fn test_reselect_overwrites_previous_selection() {
        let mut runner = QuizRunner::new(make_questions(1));

        runner.select_answer(1).unwrap();
        runner.select_answer(2).unwrap();
        runner.select_answer(0).unwrap();
        assert_eq!(runner.selected(), Some(0));

        assert!(runner.confirm_answer().unwrap());
        assert_eq!(runner.score(), 1);
    }

    #[test]
    fn test_select_after_confirm_is_noop() {
        let mut runner = QuizRunner::new(make_questions(1));

        runner.select_answer(0).unwrap();
        runner.confirm_answer().unwrap();
        runner.select_answer(3).unwrap();

        assert_eq!(runner.selected(), Some(0));
    }

    #[test]
    fn test_repeated_confirm_does_not_rescore() {
        let mut runner = QuizRunner::new(make_questions(1));

        runner.select_answer(0).unwrap();
        assert!(runner.confirm_answer().unwrap());
        assert!(runner.confirm_answer().unwrap());

        assert_eq!(runner.score(), 1);
    }

    #[test]
    fn test_select_out_of_range() {
        let mut runner = QuizRunner::new(make_questions(1));

        let result = runner.select_answer(4);

        assert!(result.is_err());
        assert_eq!(runner.selected(), None);
    }

    #[test]
    fn test_advance_before_confirm_rejected() {
        let mut runner = QuizRunner::new(make_questions(2));

        runner.select_answer(0).unwrap();
        let result = runner.advance();

        assert!(result.is_err());
        assert_eq!(runner.current_number(), 1);
    }

    #[test]
    fn test_advance_resets_per_question_state() {
        let mut runner = QuizRunner::new(make_questions(2));

        runner.select_answer(1).unwrap();
        runner.confirm_answer().unwrap();
        runner.advance().unwrap();

        assert_eq!(runner.current_number(), 2);
        assert_eq!(runner.selected(), None);
        assert!(!runner.is_answered());
        assert_eq!(runner.score(), 0);
    }

    #[test]
    fn test_finished_reported_exactly_once() {
        let mut runner = QuizRunner::new(make_questions(1));

        runner.select_answer(0).unwrap();
        runner.confirm_answer().unwrap();
        assert!(matches!(
            runner.advance().unwrap(),
            AdvanceOutcome::Finished { .. }
        ));

        assert!(runner.advance().is_err());
        assert!(runner.confirm_answer().is_err());
    }

    #[test]
    fn test_stop_ends_quiz_without_score() {
        let mut runner = QuizRunner::new(make_questions(10));

        runner.select_answer(0).unwrap();
        runner.confirm_answer().unwrap();
        runner.advance().unwrap();
        runner.stop();

        assert!(runner.is_finished());
        assert!(runner.select_answer(0).is_err());
        assert!(runner.advance().is_err());
    }
}
