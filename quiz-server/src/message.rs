use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 答题表单提交的数据
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubmitForm {
    /// 题号（表单中为字符串）
    #[serde(default)]
    pub question_id: String,
    /// 用户答案
    #[serde(default)]
    pub answer: String,
}

impl SubmitForm {
    /// 解析题号，无法解析时返回 0（必然越界）
    pub fn question_id(&self) -> i64 {
        self.question_id.trim().parse().unwrap_or(0)
    }
}

/// 首页查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartQuery {
    #[serde(default)]
    pub reset: Option<String>,
}

impl StartQuery {
    pub fn wants_reset(&self) -> bool {
        self.reset.as_deref() == Some("1")
    }
}

/// 反馈请求
///
/// Fields accept any JSON value; `null` counts as missing.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub feedback: Option<Value>,
}

impl FeedbackRequest {
    /// 反馈内容（字符串形式）
    pub fn label(&self) -> Option<String> {
        self.feedback.as_ref().and_then(text_of)
    }
}

/// 按钮点击记录请求
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClickRequest {
    #[serde(default)]
    pub button: Option<Value>,
    #[serde(default)]
    pub page: Option<Value>,
}

impl ClickRequest {
    /// 按钮与页面名称，任一缺失时返回 None
    pub fn labels(&self) -> Option<(String, String)> {
        let button = self.button.as_ref().and_then(text_of)?;
        let page = self.page.as_ref().and_then(text_of)?;
        Some((button, page))
    }
}

/// Strings are taken as-is, other present values in their JSON form.
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// 提交答案的响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub const INVALID_SUBMISSION_MESSAGE: &str = "Données invalides";
pub const INCORRECT_ANSWER_MESSAGE: &str = "Réponse incorrecte, essaie encore ! 💫";

impl SubmitResponse {
    /// 创建数据无效响应
    pub fn invalid() -> Self {
        Self::failure(INVALID_SUBMISSION_MESSAGE)
    }

    /// 创建答案错误响应
    pub fn incorrect() -> Self {
        Self::failure(INCORRECT_ANSWER_MESSAGE)
    }

    /// 创建进入下一题的响应
    pub fn next_question(redirect: String) -> Self {
        Self {
            success: true,
            completed: Some(false),
            redirect: Some(redirect),
            message: None,
        }
    }

    /// 创建完成响应
    pub fn completed(redirect: String) -> Self {
        Self {
            success: true,
            completed: Some(true),
            redirect: Some(redirect),
            message: None,
        }
    }

    fn failure(message: &str) -> Self {
        Self {
            success: false,
            completed: None,
            redirect: None,
            message: Some(message.to_string()),
        }
    }
}

/// 简单确认响应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckResponse {
    pub success: bool,
}
