//! JobTrack API client implementation
//!
//! Every resource call goes through [`JobTrackClient::execute`], which adds
//! the bearer token and handles a 401 by renewing the session once and
//! replaying the request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::api::{AccountApi, ApplicationApi, JobOfferApi, TaskApi, UserApi};
use super::models::{
    Application, ApplicationUpdate, CollectSummary, JobOffer, JobOfferFilter, JobOfferStats,
    NewApplication, NewTask, NewUser, OfferCount, PasswordChange, Task, TaskUpdate, User,
    UserUpdate,
};
use super::{GENERIC_ERROR, error_detail, status_error};
use crate::error::{ApiError, Result};
use crate::session::{LogoutReason, Session};

/// A request that can be replayed after a token renewal
#[derive(Debug, Clone)]
struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(&'static str, String)>,
    body: Option<serde_json::Value>,
    authenticated: bool,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            authenticated: true,
        }
    }

    fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    fn post<B: Serialize>(path: impl Into<String>, body: &B) -> Result<Self> {
        Self::new(Method::POST, path).json(body)
    }

    fn put<B: Serialize>(path: impl Into<String>, body: &B) -> Result<Self> {
        Self::new(Method::PUT, path).json(body)
    }

    fn json<B: Serialize>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    fn query(mut self, params: Vec<(&'static str, String)>) -> Self {
        self.query = params;
        self
    }

    fn without_auth(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

/// JobTrack API client bound to a [`Session`]
#[derive(Clone)]
pub struct JobTrackClient {
    http: HttpClient,
    base_url: String,
    session: Session,
}

impl JobTrackClient {
    pub fn new(base_url: &str, timeout: Duration, session: Session) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Send a request, renewing the session and replaying once on 401
    async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        if !request.authenticated {
            let response = self.send(&request, None).await?;
            return Self::decode(response).await;
        }

        let token = self.session.access_token();
        if token.is_none() && !self.session.has_refresh_token() {
            return Err(ApiError::Unauthorized.into());
        }

        let response = self.send(&request, token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::decode(response).await;
        }

        log::debug!("{} {} returned 401, renewing session", request.method, request.path);
        let pair = match self.session.renew().await {
            Ok(pair) => pair,
            Err(e) => {
                log::debug!("Renewal after 401 failed: {}", e);
                return Err(ApiError::SessionExpired.into());
            }
        };

        let retry = self.send(&request, Some(&pair.access_token)).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            log::warn!("Request still unauthorized after renewal, ending session");
            self.session.expire(LogoutReason::Unauthorized);
            return Err(ApiError::SessionExpired.into());
        }
        Self::decode(retry).await
    }

    async fn send(&self, request: &ApiRequest, token: Option<&str>) -> Result<Response> {
        let url = format!("{}{}", self.base_url, request.path);
        log::debug!("{} {}", request.method, url);

        let mut builder = self.http.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(ApiError::from)?;
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await.map_err(ApiError::from)?;

        if !status.is_success() {
            let message = error_detail(&body).unwrap_or_else(|| GENERIC_ERROR.to_string());
            return Err(status_error(status, message).into());
        }

        // 204 and empty bodies decode as null, which covers `()`
        let text = if body.trim().is_empty() {
            "null"
        } else {
            body.as_str()
        };
        serde_json::from_str(text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response: {}", e)).into()
        })
    }

    async fn execute_unit(&self, request: ApiRequest) -> Result<()> {
        let _: serde_json::Value = self.execute(request).await?;
        Ok(())
    }
}

#[async_trait]
impl AccountApi for JobTrackClient {
    async fn register(&self, user: &NewUser) -> Result<User> {
        self.execute(ApiRequest::post("/auth/register", user)?.without_auth())
            .await
    }

    async fn me(&self) -> Result<User> {
        self.execute(ApiRequest::get("/auth/me")).await
    }

    async fn change_password(&self, change: &PasswordChange) -> Result<User> {
        self.execute(ApiRequest::post("/auth/change-password", change)?)
            .await
    }
}

#[async_trait]
impl UserApi for JobTrackClient {
    async fn list_users(&self) -> Result<Vec<User>> {
        self.execute(ApiRequest::get("/users/")).await
    }

    async fn get_user(&self, id: &str) -> Result<User> {
        self.execute(ApiRequest::get(format!("/users/{}", id))).await
    }

    async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<User> {
        self.execute(ApiRequest::put(format!("/users/{}", id), update)?)
            .await
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        self.execute_unit(ApiRequest::delete(format!("/users/{}", id)))
            .await
    }
}

#[async_trait]
impl TaskApi for JobTrackClient {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        self.execute(ApiRequest::get("/tasks/")).await
    }

    async fn get_task(&self, id: &str) -> Result<Task> {
        self.execute(ApiRequest::get(format!("/tasks/{}", id))).await
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task> {
        self.execute(ApiRequest::post("/tasks/", task)?).await
    }

    async fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task> {
        self.execute(ApiRequest::put(format!("/tasks/{}", id), update)?)
            .await
    }

    async fn delete_task(&self, id: &str) -> Result<()> {
        self.execute_unit(ApiRequest::delete(format!("/tasks/{}", id)))
            .await
    }
}

#[async_trait]
impl ApplicationApi for JobTrackClient {
    async fn list_applications(&self, status: Option<&str>) -> Result<Vec<Application>> {
        let query = status
            .map(|s| vec![("status", s.to_string())])
            .unwrap_or_default();
        self.execute(ApiRequest::get("/applications/").query(query))
            .await
    }

    async fn get_application(&self, id: &str) -> Result<Application> {
        self.execute(ApiRequest::get(format!("/applications/{}", id)))
            .await
    }

    async fn create_application(&self, app: &NewApplication) -> Result<Application> {
        self.execute(ApiRequest::post("/applications/", app)?).await
    }

    async fn update_application(
        &self,
        id: &str,
        update: &ApplicationUpdate,
    ) -> Result<Application> {
        self.execute(ApiRequest::put(format!("/applications/{}", id), update)?)
            .await
    }

    async fn delete_application(&self, id: &str) -> Result<()> {
        self.execute_unit(ApiRequest::delete(format!("/applications/{}", id)))
            .await
    }
}

#[async_trait]
impl JobOfferApi for JobTrackClient {
    async fn list_offers(&self, filter: &JobOfferFilter) -> Result<Vec<JobOffer>> {
        self.execute(ApiRequest::get("/job-offers/").query(filter.to_query()))
            .await
    }

    async fn get_offer(&self, id: &str) -> Result<JobOffer> {
        self.execute(ApiRequest::get(format!("/job-offers/{}", id)))
            .await
    }

    async fn delete_offer(&self, id: &str) -> Result<()> {
        self.execute_unit(ApiRequest::delete(format!("/job-offers/{}", id)))
            .await
    }

    async fn offer_stats(&self) -> Result<JobOfferStats> {
        self.execute(ApiRequest::get("/job-offers/stats/summary"))
            .await
    }

    async fn collect_offers(&self, query: &str) -> Result<CollectSummary> {
        let body = serde_json::json!({ "query": query });
        self.execute(ApiRequest::post("/job-offers/collect", &body)?)
            .await
    }

    async fn count_offers(&self, filter: &JobOfferFilter) -> Result<u64> {
        let count: OfferCount = self
            .execute(ApiRequest::get("/job-offers/count/").query(filter.search_query()))
            .await?;
        Ok(count.total)
    }
}
