/// 难度枚举
///
/// 标签为固定的西班牙语文案，会原样写入生成提示词
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Difficulty {
    /// 简单
    Easy,
    /// 中等
    Medium,
    /// 困难
    Hard,
}

impl Difficulty {
    /// 获取标签文案
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Fácil",
            Difficulty::Medium => "Medio",
            Difficulty::Hard => "Difícil",
        }
    }

    /// 从标签解析难度
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Fácil" => Some(Difficulty::Easy),
            "Medio" => Some(Difficulty::Medium),
            "Difícil" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// 所有难度，按从易到难排列
    pub fn all() -> [Difficulty; 3] {
        [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
