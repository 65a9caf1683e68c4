// 🌐 Bank API Client
// Thin async wrapper over the family bank REST endpoints
//
// Every failure is reported, never retried. The backend is the authority on
// balances, permissions and split totals; local checks only save a round trip.

use crate::config::ClientConfig;
use crate::entities::{
    Account, AllowanceConfig, AllowanceSplit, AllowanceUpdate, InterestConfig, InterestUpdate,
    NewCheckingAccount, NicknameUpdate,
};
use crate::error::ApiError;
use crate::splits::{prepare_submission, SplitEntry};
use reqwest::{header, Client, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

const FALLBACK_ERROR: &str = "Something went wrong";

/// `{success, message}` body returned by mutating endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub message: Option<String>,

    /// Present when an account was created
    #[serde(default)]
    pub account_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

pub struct ApiClient {
    client: Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(ApiClient { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ========================================================================
    // ACCOUNTS
    // ========================================================================

    /// GET /api/accounts
    pub async fn get_accounts(&self) -> Result<Vec<Account>, ApiError> {
        self.request(Method::GET, "/api/accounts", None).await
    }

    /// POST /api/accounts/checking
    pub async fn create_checking_account(&self, account: &NewCheckingAccount) -> Result<ActionResponse, ApiError> {
        let body = NewCheckingAccount {
            user_id: account.user_id,
            nickname: account.nickname.trim().to_string(),
        };
        self.request(Method::POST, "/api/accounts/checking", Some(to_body(&body)?))
            .await
    }

    /// PUT /api/accounts/{id}/nickname
    pub async fn update_nickname(&self, account_id: i64, nickname: &str) -> Result<ActionResponse, ApiError> {
        let body = NicknameUpdate {
            nickname: nickname.trim().to_string(),
        };
        self.request(
            Method::PUT,
            &format!("/api/accounts/{}/nickname", account_id),
            Some(to_body(&body)?),
        )
        .await
    }

    /// POST /api/accounts/{id}/set-default
    pub async fn set_default_account(&self, account_id: i64) -> Result<ActionResponse, ApiError> {
        self.request(Method::POST, &format!("/api/accounts/{}/set-default", account_id), None)
            .await
    }

    /// DELETE /api/accounts/{id}
    pub async fn delete_account(&self, account_id: i64) -> Result<ActionResponse, ApiError> {
        self.request(Method::DELETE, &format!("/api/accounts/{}", account_id), None)
            .await
    }

    // ========================================================================
    // ALLOWANCES
    // ========================================================================

    /// GET /api/admin/allowances
    pub async fn get_allowances(&self) -> Result<Vec<AllowanceConfig>, ApiError> {
        self.request(Method::GET, "/api/admin/allowances", None).await
    }

    /// PUT /api/admin/allowances/{id}
    pub async fn update_allowance(&self, config_id: i64, update: &AllowanceUpdate) -> Result<ActionResponse, ApiError> {
        self.request(
            Method::PUT,
            &format!("/api/admin/allowances/{}", config_id),
            Some(to_body(update)?),
        )
        .await
    }

    /// GET /api/admin/allowances/{id}/splits
    pub async fn get_allowance_splits(&self, config_id: i64) -> Result<Vec<AllowanceSplit>, ApiError> {
        self.request(Method::GET, &format!("/api/admin/allowances/{}/splits", config_id), None)
            .await
    }

    /// PUT /api/admin/allowances/{id}/splits
    ///
    /// Zero entries are dropped and the rest checked before anything is sent.
    pub async fn update_allowance_splits(
        &self,
        config_id: i64,
        entries: &[SplitEntry],
    ) -> Result<ActionResponse, ApiError> {
        let submission = prepare_submission(entries)?;
        self.request(
            Method::PUT,
            &format!("/api/admin/allowances/{}/splits", config_id),
            Some(to_body(&submission)?),
        )
        .await
    }

    // ========================================================================
    // INTEREST
    // ========================================================================

    /// GET /api/admin/interest
    pub async fn get_interest(&self) -> Result<Vec<InterestConfig>, ApiError> {
        self.request(Method::GET, "/api/admin/interest", None).await
    }

    /// PUT /api/admin/interest/{id}
    pub async fn update_interest(&self, config_id: i64, update: &InterestUpdate) -> Result<ActionResponse, ApiError> {
        self.request(
            Method::PUT,
            &format!("/api/admin/interest/{}", config_id),
            Some(to_body(update)?),
        )
        .await
    }

    // ========================================================================
    // TRANSPORT
    // ========================================================================

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let url = self.config.endpoint(path);
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(header::ACCEPT, "application/json");

        if let Some(session) = &self.config.session_cookie {
            request = request.header(header::COOKIE, format!("session={}", session));
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(format!("{} {} failed: {e}", method, path)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| FALLBACK_ERROR.to_string());
            warn!("{} {} returned {}: {}", method, path, status, message);
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        info!("{} {} -> {}", method, path, status);
        serde_json::from_str(&text).map_err(|e| ApiError::Deserialization(format!("{} {}: {e}", method, path)))
    }
}

fn to_body<T: Serialize>(value: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Deserialization(format!("Failed to encode request: {e}")))
}
