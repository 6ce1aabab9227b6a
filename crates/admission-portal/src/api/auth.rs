//! Authentication and profile endpoints. Login is the only writer of the
//! session store; logout is the only other mutation.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::{ApiClient, ApiError};
use crate::session::{AccessToken, SessionError, SessionStorage, UserInfo};

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub msg: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserInfo,
}

/// Partial profile update; unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl<S: SessionStorage> ApiClient<S> {
    /// Authenticate and persist the session (token and user together) on
    /// success.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let builder = self
            .request(Method::POST, "api/v1/auth/login")
            .json(&json!({ "username": username, "password": password }));
        let response: LoginResponse = self.execute(builder).await?;

        self.session()
            .write(&AccessToken(response.access_token.clone()), &response.user)?;
        info!(
            username = response.user.username,
            role = response.user.role.label(),
            "login succeeded"
        );
        Ok(response)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        let builder = self
            .request(Method::POST, "api/v1/auth/register")
            .json(request);
        self.execute(builder).await
    }

    pub async fn current_user(&self) -> Result<UserInfo, ApiError> {
        let builder = self.request(Method::GET, "api/v1/auth/me");
        self.execute(builder).await
    }

    pub async fn update_current_user(&self, update: &UserUpdate) -> Result<UserInfo, ApiError> {
        let builder = self.request(Method::PUT, "api/v1/auth/me").json(update);
        self.execute(builder).await
    }

    /// Drop the session. Purely local; the backend token is simply no longer
    /// presented.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.session().clear()
    }
}
