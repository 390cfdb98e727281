//! `reqwest`-backed [`AuthApi`].

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::time::Duration;

use serde::de::DeserializeOwned;

use super::types::{
    Accepted, ApiError, AuthPayload, Credentials, PasswordChange, ProfileUpdate, RegisterRequest, UserPayload,
    decode_envelope,
};
use super::{AuthApi, LOGIN_PATH, PASSWORD_PATH, PROFILE_PATH, REGISTER_PATH};
use crate::config::{ClientConfig, Timeouts};
use crate::session::UserRecord;

pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// Build a client for `base_url` with the given timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the TLS backend fails to initialize.
    pub fn new(base_url: &str, timeouts: Timeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    /// # Errors
    ///
    /// See [`HttpApi::new`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(&config.api_url, config.timeouts)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<Accepted<T>, ApiError> {
        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        tracing::debug!(status, bytes = text.len(), "api response");
        decode_envelope(status, &text)
    }
}

#[async_trait::async_trait]
impl AuthApi for HttpApi {
    async fn login(&self, credentials: &Credentials) -> Result<AuthPayload, ApiError> {
        let request = self.http.post(self.url(LOGIN_PATH)).json(credentials);
        self.send(request).await?.require_data()
    }

    async fn register(&self, register: &RegisterRequest) -> Result<AuthPayload, ApiError> {
        let request = self.http.post(self.url(REGISTER_PATH)).json(register);
        self.send(request).await?.require_data()
    }

    async fn fetch_profile(&self, token: &str) -> Result<UserRecord, ApiError> {
        let request = self.http.get(self.url(PROFILE_PATH)).bearer_auth(token);
        let payload: UserPayload = self.send(request).await?.require_data()?;
        Ok(payload.user)
    }

    async fn update_profile(&self, token: &str, update: &ProfileUpdate) -> Result<Option<UserRecord>, ApiError> {
        let request = self.http.put(self.url(PROFILE_PATH)).bearer_auth(token).json(update);
        let accepted: Accepted<UserPayload> = self.send(request).await?;
        Ok(accepted.data.map(|payload| payload.user))
    }

    async fn change_password(&self, token: &str, change: &PasswordChange) -> Result<Option<String>, ApiError> {
        let request = self.http.put(self.url(PASSWORD_PATH)).bearer_auth(token).json(change);
        let accepted: Accepted<serde_json::Value> = self.send(request).await?;
        Ok(accepted.message)
    }
}
