use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// API 密钥，只保存哈希值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    #[serde(skip_serializing, default)]
    pub key_hash: String,
    pub last_used: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// 创建 API 密钥请求
#[derive(Debug, Deserialize)]
pub struct CreateApiKeyRequest {
    pub name: String,
    /// 为指定用户创建，缺省为当前用户
    pub user_id: Option<i64>,
}

/// 创建成功后返回明文密钥，仅此一次
#[derive(Debug, Serialize)]
pub struct CreatedApiKeyResponse {
    #[serde(flatten)]
    pub api_key: ApiKey,
    pub key: String,
}
