//! Script Segmenter - 按停顿标记切分冥想脚本
//!
//! 与标点分段不同，这里只识别字面量 `---PAUSE---`，
//! 段落内容原样保留（包括前后空白），是否可朗读由调用方判断

/// 停顿标记
pub const PAUSE_DELIMITER: &str = "---PAUSE---";

/// 脚本段落
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSegment {
    /// 在脚本中的位置（从 0 开始）
    pub index: usize,
    pub text: String,
}

impl ScriptSegment {
    /// 是否包含可朗读内容
    pub fn is_speakable(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// 按分隔符切分脚本
///
/// n 个分隔符产生 n + 1 个段落；开头、结尾或连续的分隔符会产生空段落。
/// 空分隔符视为不切分。
pub fn split_script(script: &str, delimiter: &str) -> Vec<ScriptSegment> {
    if delimiter.is_empty() {
        return vec![ScriptSegment {
            index: 0,
            text: script.to_string(),
        }];
    }

    script
        .split(delimiter)
        .enumerate()
        .map(|(index, text)| ScriptSegment {
            index,
            text: text.to_string(),
        })
        .collect()
}
