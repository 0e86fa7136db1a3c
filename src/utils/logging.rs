/// 日志工具模块
///
/// 提供启动横幅、结果统计等输出的辅助函数
use tracing::info;

/// 记录程序启动信息
///
/// # 参数
/// - `model_name`: 使用的 LLM 模型名称
pub fn log_startup(model_name: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 PDF 测验生成器启动");
    info!("🤖 模型: {}", model_name);
    info!("{}", "=".repeat(60));
}

/// 记录提取完成信息
///
/// # 参数
/// - `file_count`: 文件数量
/// - `char_count`: 提取出的字符总数
pub fn log_extraction_done(file_count: usize, char_count: usize) {
    info!(
        "✓ 文本提取完成: {} 个文件，共 {} 个字符",
        file_count, char_count
    );
}

/// 记录生成完成信息
///
/// # 参数
/// - `question_count`: 实际返回的题目数量
/// - `difficulty`: 难度标签
pub fn log_generation_done(question_count: usize, difficulty: &str) {
    info!(
        "✓ 试题生成完成: {} 道题目，难度 {}",
        question_count, difficulty
    );
}

/// 打印最终统计信息
///
/// # 参数
/// - `score`: 得分
/// - `total`: 题目总数
/// - `accuracy`: 准确率（百分比，取整）
/// - `formatted_time`: MM:SS 格式的用时
pub fn print_final_stats(score: usize, total: usize, accuracy: u32, formatted_time: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 测验完成");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 得分: {}/{}", score, total);
    info!("🎯 准确率: {}%", accuracy);
    info!("⏱️ 用时: {}", formatted_time);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_short() {
        assert_eq!(truncate_text("hola", 10), "hola");
    }

    #[test]
    fn test_truncate_text_long() {
        assert_eq!(truncate_text("abcdefghij", 4), "abcd...");
    }

    #[test]
    fn test_truncate_text_multibyte() {
        assert_eq!(truncate_text("测验生成器", 2), "测验...");
    }
}
