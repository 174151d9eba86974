//! Token bookkeeping service backed by Redis.
//!
//! Token issuance and verification live in the auth layer; this service only
//! tracks which token ids are live per user and moves them onto the
//! blacklist set when a user is disabled.

use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use uuid::Uuid;

use crate::{
    config::TokenConfig,
    error::{AppError, AppResult},
};

const BLACKLIST_KEY: &str = "tokens:blacklist";

/// Revocation seam consumed by the user-disable workflow
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRevoker: Send + Sync {
    /// Move every live access and refresh token of the user onto the
    /// blacklist; returns how many tokens were revoked.
    async fn revoke_all(&self, user_id: i32) -> AppResult<u64>;
}

/// Generate a fresh token identifier for registration
pub fn new_token_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Clone)]
pub struct TokenService {
    client: Client,
    config: TokenConfig,
}

impl TokenService {
    /// Create a new token service and verify the Redis connection
    pub async fn new(url: &str, config: TokenConfig) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { client, config })
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))
    }

    fn access_key(user_id: i32) -> String {
        format!("tokens:access:{}", user_id)
    }

    fn refresh_key(user_id: i32) -> String {
        format!("tokens:refresh:{}", user_id)
    }

    /// Track a freshly issued access token for the user
    pub async fn register_access_token(&self, user_id: i32, token_id: &str) -> AppResult<()> {
        let mut conn = self.connection().await?;
        let key = Self::access_key(user_id);

        conn.sadd::<_, _, ()>(&key, token_id)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to register access token: {}", e)))?;
        conn.expire::<_, ()>(&key, self.config.access_ttl_seconds as i64)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to refresh token key TTL: {}", e)))?;

        Ok(())
    }

    /// Track a freshly issued refresh token for the user
    pub async fn register_refresh_token(&self, user_id: i32, token_id: &str) -> AppResult<()> {
        let mut conn = self.connection().await?;
        let key = Self::refresh_key(user_id);

        conn.sadd::<_, _, ()>(&key, token_id)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to register refresh token: {}", e)))?;
        conn.expire::<_, ()>(&key, self.config.refresh_ttl_seconds as i64)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to refresh token key TTL: {}", e)))?;

        Ok(())
    }

    /// True when the token id has been revoked
    pub async fn is_blacklisted(&self, token_id: &str) -> AppResult<bool> {
        let mut conn = self.connection().await?;

        let blacklisted: bool = conn
            .sismember(BLACKLIST_KEY, token_id)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to check token blacklist: {}", e)))?;

        Ok(blacklisted)
    }
}

#[async_trait]
impl TokenRevoker for TokenService {
    async fn revoke_all(&self, user_id: i32) -> AppResult<u64> {
        let mut conn = self.connection().await?;
        let mut revoked = 0u64;

        for key in [Self::access_key(user_id), Self::refresh_key(user_id)] {
            let tokens: Vec<String> = conn
                .smembers(&key)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to read live tokens: {}", e)))?;

            if !tokens.is_empty() {
                conn.sadd::<_, _, ()>(BLACKLIST_KEY, &tokens)
                    .await
                    .map_err(|e| {
                        AppError::Internal(format!("Failed to blacklist tokens: {}", e))
                    })?;
                revoked += tokens.len() as u64;
            }

            conn.del::<_, ()>(&key)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to clear live tokens: {}", e)))?;
        }

        tracing::info!(user_id, revoked, "user tokens revoked");

        Ok(revoked)
    }
}
