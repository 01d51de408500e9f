//! 业务数据模型
//!
//! 与 `entity` 中的数据库实体分离，服务层与 API 层只使用这里的类型。

pub mod api_keys;
pub mod assignments;
pub mod common;
pub mod recurring;
pub mod statistics;
pub mod users;

pub use common::{ApiResponse, PaginatedResponse, PaginationInfo, PaginationQuery};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// API 响应中的业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    ValidationFailed = 1005,
    InternalServerError = 1500,

    // 认证
    ApiKeyInvalid = 2000,
    ApiKeyNotFound = 2001,
    ApiKeyCreationFailed = 2002,

    // 用户
    UserNotFound = 3000,
    UserAlreadyExists = 3001,
    UserEmailInvalid = 3002,
    UserNameInvalid = 3003,
    UserPasswordInvalid = 3004,
    UserCreationFailed = 3005,
    UserUpdateFailed = 3006,
    UserDeleteFailed = 3007,
    CanNotDeleteCurrentUser = 3008,

    // 作业
    AssignmentNotFound = 4000,
    AssignmentCreationFailed = 4001,
    AssignmentUpdateFailed = 4002,
    AssignmentDeleteFailed = 4003,
    InvalidDate = 4004,

    // 周期作业
    RecurringNotFound = 5000,
    InvalidRecurrenceType = 5001,
    InvalidEndType = 5002,
    RecurringCreationFailed = 5003,
    RecurringUpdateFailed = 5004,
    RecurringDeleteFailed = 5005,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", *self as i32)
    }
}
