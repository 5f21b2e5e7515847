//! Remote backend client.
//!
//! Talks to the hosted auth/data service over REST: a password-grant token
//! endpoint plus row-level-secured `profiles` and `tasks` tables. Updates
//! and deletes ask the service to echo the affected rows
//! (`Prefer: return=representation`); an empty echo means the row does not
//! exist and maps to a not-found error. No client-side retries; every
//! failure is terminal for that attempt.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::profile::{Profile, ProfilePatch, Session};
use crate::store::{AuthService, SignUp, TaskService};
use crate::task::{NewTask, Task, TaskPatch};

const USER_AGENT: &str = concat!("taskdeck/", env!("CARGO_PKG_VERSION"));

pub struct RemoteStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    user: AuthUser,
}

/// Sign-up responses come in two shapes: a full token grant when the service
/// signs the account in immediately, or a bare user record when email
/// verification is still pending.
#[derive(Debug, Deserialize)]
struct SignUpResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    user: Option<AuthUser>,
    #[serde(default)]
    id: Option<Uuid>,
}

impl RemoteStore {
    pub fn new(url: &str, api_key: &str) -> Result<Self> {
        if url.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "service url is required for the remote backend".to_string(),
            ));
        }
        if api_key.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "service api key is required for the remote backend".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| Error::Service(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn base_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", value);
        }
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    async fn token_grant(&self, grant_type: &str, body: serde_json::Value) -> Result<TokenResponse> {
        let response = self
            .client
            .post(format!("{}?grant_type={grant_type}", self.auth_url("token")))
            .headers(self.base_headers())
            .json(&body)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                debug!(grant_type, "token grant rejected");
                Err(Error::InvalidCredentials)
            }
            _ => Err(service_error(response).await),
        }
    }

    async fn fetch_profile_row(&self, session: &Session) -> Result<Profile> {
        let response = self
            .client
            .get(self.table_url("profiles"))
            .headers(self.base_headers())
            .bearer_auth(&session.access_token)
            .query(&[
                ("id", format!("eq.{}", session.user_id)),
                ("select", "*".to_string()),
            ])
            .send()
            .await?;

        let rows: Vec<Profile> = check(response).await?.json().await?;
        rows.into_iter().next().ok_or(Error::ProfileNotFound)
    }
}

#[async_trait::async_trait]
impl AuthService for RemoteStore {
    async fn sign_in(&self, email: &str, password: &str) -> Result<(Session, Profile)> {
        let grant = self
            .token_grant("password", json!({ "email": email, "password": password }))
            .await?;
        let session = Session {
            user_id: grant.user.id,
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
        };
        let profile = self.fetch_profile_row(&session).await?;
        Ok((session, profile))
    }

    async fn sign_up(&self, email: &str, password: &str, username: &str) -> Result<SignUp> {
        let response = self
            .client
            .post(self.auth_url("signup"))
            .headers(self.base_headers())
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "username": username },
            }))
            .send()
            .await?;

        let parsed: SignUpResponse = check(response).await?.json().await?;
        let Some(access_token) = parsed.access_token else {
            // Account exists but cannot sign in until the address is
            // confirmed out of band.
            return Ok(SignUp::VerificationPending);
        };

        let user_id = parsed
            .user
            .map(|user| user.id)
            .or(parsed.id)
            .ok_or_else(|| Error::Service("sign-up response missing user id".to_string()))?;
        let session = Session {
            user_id,
            access_token,
            refresh_token: parsed.refresh_token,
        };
        let profile = self.fetch_profile_row(&session).await?;
        Ok(SignUp::SignedIn { session, profile })
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        let response = self
            .client
            .post(self.auth_url("logout"))
            .headers(self.base_headers())
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    async fn restore(&self, session: &Session) -> Result<(Session, Profile)> {
        // Prefer a refresh grant: it survives access-token expiry. Fall back
        // to validating the access token directly.
        let session = match &session.refresh_token {
            Some(refresh_token) => {
                let grant = self
                    .token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
                    .await?;
                Session {
                    user_id: grant.user.id,
                    access_token: grant.access_token,
                    refresh_token: grant.refresh_token,
                }
            }
            None => {
                let response = self
                    .client
                    .get(self.auth_url("user"))
                    .headers(self.base_headers())
                    .bearer_auth(&session.access_token)
                    .send()
                    .await?;
                let user: AuthUser = check(response).await?.json().await?;
                Session {
                    user_id: user.id,
                    access_token: session.access_token.clone(),
                    refresh_token: None,
                }
            }
        };

        let profile = self.fetch_profile_row(&session).await?;
        Ok((session, profile))
    }

    async fn fetch_profile(&self, session: &Session) -> Result<Profile> {
        self.fetch_profile_row(session).await
    }

    async fn update_profile(&self, session: &Session, patch: &ProfilePatch) -> Result<Profile> {
        let response = self
            .client
            .patch(self.table_url("profiles"))
            .headers(self.base_headers())
            .bearer_auth(&session.access_token)
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{}", session.user_id))])
            .json(patch)
            .send()
            .await?;

        let rows: Vec<Profile> = check(response).await?.json().await?;
        rows.into_iter().next().ok_or(Error::ProfileNotFound)
    }
}

#[async_trait::async_trait]
impl TaskService for RemoteStore {
    async fn list(&self, session: &Session) -> Result<Vec<Task>> {
        let response = self
            .client
            .get(self.table_url("tasks"))
            .headers(self.base_headers())
            .bearer_auth(&session.access_token)
            .query(&[
                ("user_id", format!("eq.{}", session.user_id)),
                ("select", "*".to_string()),
                ("order", "created_at.asc".to_string()),
            ])
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    async fn insert(&self, session: &Session, new: &NewTask) -> Result<Task> {
        new.validate()?;
        let response = self
            .client
            .post(self.table_url("tasks"))
            .headers(self.base_headers())
            .bearer_auth(&session.access_token)
            .header("Prefer", "return=representation")
            .json(&json!({
                "title": new.title,
                "description": new.description,
                "priority": new.priority,
                "status": crate::task::Status::Todo,
                "user_id": session.user_id,
            }))
            .send()
            .await?;

        let rows: Vec<Task> = check(response).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| Error::Service("insert returned no row".to_string()))
    }

    async fn update(&self, session: &Session, id: Uuid, patch: &TaskPatch) -> Result<Task> {
        let response = self
            .client
            .patch(self.table_url("tasks"))
            .headers(self.base_headers())
            .bearer_auth(&session.access_token)
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{id}"))])
            .json(patch)
            .send()
            .await?;

        let rows: Vec<Task> = check(response).await?.json().await?;
        rows.into_iter().next().ok_or(Error::TaskNotFound(id))
    }

    async fn delete(&self, session: &Session, id: Uuid) -> Result<()> {
        let response = self
            .client
            .delete(self.table_url("tasks"))
            .headers(self.base_headers())
            .bearer_auth(&session.access_token)
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;

        let rows: Vec<Task> = check(response).await?.json().await?;
        if rows.is_empty() {
            return Err(Error::TaskNotFound(id));
        }
        Ok(())
    }
}

/// Map non-success responses to the error taxonomy before the caller tries
/// to parse a body.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(Error::NotAuthenticated);
    }
    Err(service_error(response).await)
}

async fn service_error(response: Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = body.trim();
    if detail.is_empty() {
        Error::Service(format!("service returned {status}"))
    } else {
        let mut snippet = detail.to_string();
        if snippet.len() > 200 {
            snippet.truncate(200);
        }
        Error::Service(format!("service returned {status}: {snippet}"))
    }
}
