use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::HWTrackerError;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}$").expect("Invalid email regex")
});

/// 作业标题最大长度
pub const MAX_TITLE_LEN: usize = 200;
/// 作业描述最大长度
pub const MAX_DESCRIPTION_LEN: usize = 5000;
/// 科目最大长度
pub const MAX_SUBJECT_LEN: usize = 100;

fn validate_text_field(
    field: &str,
    value: &str,
    max_len: usize,
    allow_newlines: bool,
) -> Result<(), HWTrackerError> {
    if value.chars().count() > max_len {
        return Err(HWTrackerError::validation(format!(
            "{field} 最多 {max_len} 个字符"
        )));
    }
    let has_control = value
        .chars()
        .any(|c| c.is_control() && !(allow_newlines && matches!(c, '\n' | '\r' | '\t')));
    if has_control {
        return Err(HWTrackerError::validation(format!("{field} 包含非法控制字符")));
    }
    Ok(())
}

/// 校验作业的文本字段，标题必填
pub fn validate_assignment_fields(
    title: &str,
    description: &str,
    subject: &str,
) -> Result<(), HWTrackerError> {
    if title.trim().is_empty() {
        return Err(HWTrackerError::validation("title 为必填项"));
    }
    validate_text_field("title", title, MAX_TITLE_LEN, false)?;
    validate_text_field("description", description, MAX_DESCRIPTION_LEN, true)?;
    validate_text_field("subject", subject, MAX_SUBJECT_LEN, false)?;
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), &'static str> {
    let len = name.trim().chars().count();
    if len == 0 || len > 50 {
        return Err("Name length must be between 1 and 50 characters");
    }
    if name.chars().any(char::is_control) {
        return Err("Name must not contain control characters");
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    // 邮箱格式校验：必须包含 @ 和 .
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 密码策略验证结果
#[derive(Debug, Clone)]
pub struct PasswordValidationResult {
    pub is_valid: bool,
    pub errors: Vec<&'static str>,
}

impl PasswordValidationResult {
    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }
}

/// 验证密码是否符合安全策略
///
/// 策略要求：
/// - 最小长度：8 字符
/// - 必须包含：大写字母 + 小写字母 + 数字
/// - 可选：特殊字符（增强安全性）
pub fn validate_password(password: &str) -> PasswordValidationResult {
    let mut errors = Vec::new();

    // 1. 长度检查：至少 8 个字符
    if password.len() < 8 {
        errors.push("Password must be at least 8 characters long");
    }

    // 2. 大写字母检查
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter");
    }

    // 3. 小写字母检查
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain at least one lowercase letter");
    }

    // 4. 数字检查
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one digit");
    }

    // 5. 常见弱密码检查
    let weak_passwords = [
        "password",
        "12345678",
        "123456789",
        "qwerty123",
        "admin123",
        "password1",
        "Password1",
        "Qwerty123",
        "Abcd1234",
    ];
    if weak_passwords
        .iter()
        .any(|&weak| password.eq_ignore_ascii_case(weak))
    {
        errors.push("Password is too common, please choose a stronger password");
    }

    PasswordValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}
