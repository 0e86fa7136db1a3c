use serde::{Deserialize, Serialize};

use crate::models::difficulty::Difficulty;

/// 每道题目的选项数量
pub const OPTIONS_PER_QUESTION: usize = 4;

/// 可选的题目数量档位
pub const QUESTION_COUNT_OPTIONS: [usize; 4] = [10, 20, 30, 40];

/// 一道选择题
///
/// 字段名与 LLM 返回的 JSON 字段一一对应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// 题干
    pub question: String,
    /// 恰好 4 个备选答案
    pub options: Vec<String>,
    /// 正确答案，必须与 options 中的某个字符串完全一致
    #[serde(rename = "correctAnswer")]
    pub correct_answer: String,
    /// 答案解析
    pub explanation: String,
}

impl Question {
    /// 校验题目是否满足格式约定
    ///
    /// # 返回
    /// 不满足约定时返回具体原因
    pub fn validate(&self) -> Result<(), String> {
        if self.options.len() != OPTIONS_PER_QUESTION {
            return Err(format!(
                "选项数量为 {}，应为 {}",
                self.options.len(),
                OPTIONS_PER_QUESTION
            ));
        }
        let matched = self
            .options
            .iter()
            .filter(|option| *option == &self.correct_answer)
            .count();
        if matched != 1 {
            return Err(format!(
                "正确答案 '{}' 在选项中出现 {} 次，应恰好出现 1 次",
                self.correct_answer, matched
            ));
        }
        Ok(())
    }
}

/// 测验配置
///
/// 提交给生成器后不可再修改
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizConfig {
    /// 题目数量，只能取 QUESTION_COUNT_OPTIONS 中的值
    pub num_questions: usize,
    /// 难度
    pub difficulty: Difficulty,
}

impl QuizConfig {
    /// 创建测验配置
    ///
    /// # 返回
    /// 题目数量不在可选档位中时返回错误说明
    pub fn new(num_questions: usize, difficulty: Difficulty) -> Result<Self, String> {
        if !QUESTION_COUNT_OPTIONS.contains(&num_questions) {
            return Err(format!(
                "题目数量 {} 不在可选档位 {:?} 中",
                num_questions, QUESTION_COUNT_OPTIONS
            ));
        }
        Ok(Self {
            num_questions,
            difficulty,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_question() -> Question {
        Question {
            question: "¿Cuál es la capital de España?".to_string(),
            options: vec![
                "Madrid".to_string(),
                "Barcelona".to_string(),
                "Sevilla".to_string(),
                "Valencia".to_string(),
            ],
            correct_answer: "Madrid".to_string(),
            explanation: "Madrid es la capital de España.".to_string(),
        }
    }

    #[test]
    fn test_validate_well_formed() {
        assert!(sample_question().validate().is_ok());
    }

    #[test]
    fn test_validate_wrong_option_count() {
        let mut question = sample_question();
        question.options.pop();
        assert!(question.validate().is_err());
    }

    #[test]
    fn test_validate_correct_answer_not_in_options() {
        let mut question = sample_question();
        question.correct_answer = "Granada".to_string();
        assert!(question.validate().is_err());
    }

    #[test]
    fn test_validate_is_case_sensitive() {
        let mut question = sample_question();
        question.correct_answer = "madrid".to_string();
        assert!(question.validate().is_err());
    }

    #[test]
    fn test_deserialize_wire_format() {
        let raw = r#"{
            "question": "¿Pregunta?",
            "options": ["a", "b", "c", "d"],
            "correctAnswer": "b",
            "explanation": "Porque sí."
        }"#;
        let question: Question = serde_json::from_str(raw).unwrap();
        assert_eq!(question.correct_answer, "b");
        assert!(question.validate().is_ok());
    }

    #[test]
    fn test_deserialize_missing_explanation_fails() {
        let raw = r#"{
            "question": "¿Pregunta?",
            "options": ["a", "b", "c", "d"],
            "correctAnswer": "b"
        }"#;
        assert!(serde_json::from_str::<Question>(raw).is_err());
    }

    #[test]
    fn test_quiz_config_valid_counts() {
        for count in QUESTION_COUNT_OPTIONS {
            assert!(QuizConfig::new(count, Difficulty::Medium).is_ok());
        }
    }

    #[test]
    fn test_quiz_config_invalid_count() {
        assert!(QuizConfig::new(15, Difficulty::Medium).is_err());
        assert!(QuizConfig::new(0, Difficulty::Easy).is_err());
    }
}
