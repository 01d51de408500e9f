use crate::config::AppConfig;
use crate::middlewares::ApiKeyCache;
use crate::models::users::entities::{User, UserRole};
use crate::services::RecurringOrchestrator;
use crate::storage::Storage;
use crate::utils::api_key::{generate_api_key, hash_api_key};
use crate::utils::clock::AppClock;
use crate::utils::password::hash_password;
use std::sync::Arc;
use tracing::{debug, info, warn};

const ADMIN_EMAIL: &str = "admin@localhost";
const ADMIN_NAME: &str = "Administrator";

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub orchestrator: Arc<RecurringOrchestrator>,
    pub key_cache: ApiKeyCache,
}

/// 生成随机密码
fn generate_random_password(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// 初始化默认管理员账号
/// 如果数据库中没有任何用户，则创建一个默认的 admin 账号
async fn seed_admin(storage: &Arc<dyn Storage>) -> Option<User> {
    match storage.count_users().await {
        Ok(count) if count > 0 => {
            debug!(
                "Database already has {} user(s), skipping admin seed",
                count
            );
            return None;
        }
        Ok(_) => {
            info!("No users found in database, creating default admin account...");
        }
        Err(e) => {
            warn!("Failed to count users: {}, skipping admin seed", e);
            return None;
        }
    }

    // 获取密码：优先从环境变量，否则生成随机密码
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        let pwd = generate_random_password(16);
        warn!("==========================================================");
        warn!("  ADMIN PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Generated admin password: {}", pwd);
        warn!("  Please save this password or set ADMIN_PASSWORD env var");
        warn!("==========================================================");
        pwd
    });

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Failed to hash admin password: {}, skipping admin seed", e);
            return None;
        }
    };

    match storage
        .create_user(ADMIN_EMAIL, ADMIN_NAME, &password_hash, UserRole::Admin)
        .await
    {
        Ok(user) => {
            info!(
                "Default admin account created successfully (ID: {}, email: {})",
                user.id, user.email
            );
            Some(user)
        }
        Err(e) => {
            warn!("Failed to create admin account: {}", e);
            None
        }
    }
}

/// 没有任何 API 密钥时为管理员签发一个，明文只在日志中出现一次
async fn seed_admin_api_key(storage: &Arc<dyn Storage>, admin: Option<User>) {
    match storage.count_api_keys().await {
        Ok(0) => {}
        Ok(count) => {
            debug!("Found {} API key(s), skipping initial key", count);
            return;
        }
        Err(e) => {
            warn!("Failed to count API keys: {}, skipping initial key", e);
            return;
        }
    }

    let admin = match admin {
        Some(admin) => admin,
        None => match storage.get_user_by_email(ADMIN_EMAIL).await {
            Ok(Some(admin)) => admin,
            Ok(None) => {
                warn!("No default admin account found, skipping initial API key");
                return;
            }
            Err(e) => {
                warn!("Failed to load admin account: {}, skipping initial API key", e);
                return;
            }
        },
    };

    let key = generate_api_key();
    match storage
        .create_api_key(admin.id, "initial", &hash_api_key(&key))
        .await
    {
        Ok(_) => {
            warn!("==========================================================");
            warn!("  INITIAL ADMIN API KEY (shown only once)");
            warn!("  {}", key);
            warn!("==========================================================");
        }
        Err(e) => warn!("Failed to create initial API key: {}", e),
    }
}

/// 准备服务器启动的上下文
/// 包括存储、周期作业编排与密钥缓存
pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = AppConfig::get();

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    // 初始化默认管理员账号与密钥（如果需要）
    let admin = seed_admin(&storage).await;
    seed_admin_api_key(&storage, admin).await;

    let clock = AppClock::system(config.recurring.utc_offset_minutes);
    info!("Using local UTC offset {}", clock.offset());
    let orchestrator = Arc::new(RecurringOrchestrator::new(storage.clone(), clock));

    let key_cache = ApiKeyCache::new(
        config.auth.api_key_cache_ttl,
        config.auth.api_key_cache_capacity,
    );

    StartupContext {
        storage,
        orchestrator,
        key_cache,
    }
}
