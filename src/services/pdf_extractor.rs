//! PDF 文本提取服务 - 业务能力层
//!
//! 只负责"PDF 字节 → 纯文本"能力，不关心流程
//!
//! ## 约定
//! - 按输入顺序逐个文件处理，文件内按页码顺序提取
//! - 每页文本后追加一个换行符
//! - 任意文件失败则整批失败，不保留部分结果

use lopdf::Document;
use tracing::{debug, info};

use crate::error::ExtractionError;

/// PDF 文本提取服务
///
/// 职责：
/// - 将一批 PDF 文件的字节内容合并提取为一个文本
/// - 不出现 Question / QuizConfig
/// - 不关心流程顺序
pub struct PdfExtractor;

impl PdfExtractor {
    /// 创建新的提取服务
    pub fn new() -> Self {
        Self
    }

    /// 提取一批 PDF 文件的全部文本
    ///
    /// # 参数
    /// - `files`: (文件名, 文件字节) 列表，按用户提交的顺序排列
    ///
    /// # 返回
    /// 返回所有文件、所有页面按顺序拼接的文本
    pub fn extract_all(&self, files: &[(String, Vec<u8>)]) -> Result<String, ExtractionError> {
        let mut full_text = String::new();

        for (name, bytes) in files {
            debug!("开始解析 PDF: {} ({} 字节)", name, bytes.len());

            let doc = Document::load_mem(bytes).map_err(|e| ExtractionError::LoadFailed {
                name: name.clone(),
                source: e,
            })?;

            let pages = doc.get_pages();
            let page_count = pages.len();

            for (page_num, _page_id) in pages {
                let content =
                    doc.extract_text(&[page_num])
                        .map_err(|e| ExtractionError::TextFailed {
                            name: name.clone(),
                            page: page_num,
                            source: e,
                        })?;
                full_text.push_str(&content);
                full_text.push('\n');
            }

            info!("✓ 已提取 {} ({} 页)", name, page_count);
        }

        if full_text.trim().is_empty() {
            return Err(ExtractionError::EmptyText);
        }

        Ok(full_text)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}
