//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_hwtracker_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum HWTrackerError {
            $($variant(String),)*
        }

        impl HWTrackerError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(HWTrackerError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(HWTrackerError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(HWTrackerError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl HWTrackerError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        HWTrackerError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_hwtracker_errors! {
    ConfigLoad("E001", "Configuration Error"),
    DatabaseConfig("E002", "Database Configuration Error"),
    DatabaseConnection("E003", "Database Connection Error"),
    DatabaseOperation("E004", "Database Operation Error"),
    Io("E005", "IO Error"),
    Validation("E006", "Validation Error"),
    NotFound("E007", "Resource Not Found"),
    Serialization("E008", "Serialization Error"),
    DateParse("E009", "Date Parse Error"),
    Authentication("E010", "Authentication Error"),
    Authorization("E011", "Authorization Error"),
    InvalidRecurrenceType("E012", "Invalid Recurrence Type"),
    InvalidEndType("E013", "Invalid End Type"),
}

impl HWTrackerError {
    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for HWTrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for HWTrackerError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for HWTrackerError {
    fn from(err: sea_orm::DbErr) -> Self {
        HWTrackerError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for HWTrackerError {
    fn from(err: std::io::Error) -> Self {
        HWTrackerError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for HWTrackerError {
    fn from(err: serde_json::Error) -> Self {
        HWTrackerError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for HWTrackerError {
    fn from(err: chrono::ParseError) -> Self {
        HWTrackerError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HWTrackerError>;
