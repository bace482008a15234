//! HTTP client wrapper with bearer/CSRF headers and envelope handling.

use std::{sync::Arc, time::Duration};

use log::{debug, error, info};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use super::{ApiError, ListResponse, Resource};
use crate::{
    models::{
        reference_model::{
            FilterOptions, Group, GroupCourse, Room, SchedulePlan, Subject, Subsidiary, Teacher,
        },
        Config, Id,
    },
    session::Session,
};

const CSRF_HEADER: &str = "X-CSRFToken";
const TOKEN_PATH: &str = "auth/token/";

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access: String,
}

/// Client for the scheduling REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: Arc<Session>,
}

impl ApiClient {
    /// Creates a client for `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(config: &Config, session: Arc<Session>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()?;
        Self::with_http_client(http, &config.base_url, session)
    }

    pub fn with_http_client(
        http: Client,
        base_url: &str,
        session: Arc<Session>,
    ) -> Result<Self, ApiError> {
        // Url::join drops the last segment of a base without a trailing slash
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.base_url.join(path)?;
        Ok(self.request_url(method, url))
    }

    fn request_url(&self, method: Method, url: Url) -> RequestBuilder {
        let mutating = method != Method::GET && method != Method::HEAD;
        let mut req = self.http.request(method, url);
        if let Some(token) = self.session.token() {
            req = req.bearer_auth(token);
        }
        if mutating {
            if let Some(csrf) = self.session.csrf_token() {
                req = req.header(CSRF_HEADER, csrf);
            }
        }
        req
    }

    /// Sends a request and maps every non-2xx status to an error.
    ///
    /// A 401 resets the session before the error is returned.
    async fn execute(&self, req: RequestBuilder) -> Result<String, ApiError> {
        let resp = req.send().await.map_err(|e| ApiError::Network {
            message: e.to_string(),
        })?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| ApiError::Network {
            message: e.to_string(),
        })?;

        if status.is_success() {
            return Ok(body);
        }
        error!("Backend answered {}: {}", status, body);
        if status == StatusCode::UNAUTHORIZED {
            self.session.handle_auth_failure();
            return Err(ApiError::Auth { body });
        }
        Err(ApiError::Http {
            status: status.as_u16(),
            body,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        let body = self.execute(req).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Exchanges credentials for a bearer token and keeps it in the session.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<(), ApiError> {
        info!("Authenticating as {}", username);
        let req = self
            .request(Method::POST, TOKEN_PATH)?
            .json(&Credentials { username, password });
        let token: TokenResponse = self.send_json(req).await?;
        self.session.set_token(&token.access);
        info!("Authenticated as {}", username);
        Ok(())
    }

    /// Fetches a collection, following `next` through every page. Query pairs
    /// are sent as given, so callers leave out absent values instead of
    /// passing empty strings.
    pub async fn list<T: DeserializeOwned>(
        &self,
        resource: Resource,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, ApiError> {
        info!("GET {} {:?}", resource.path(), query);
        let mut req = self.request(Method::GET, resource.path())?.query(query);
        let mut items = Vec::new();
        loop {
            let page: ListResponse<T> = self.send_json(req).await?;
            let next = page.next_page().map(|next| self.base_url.join(next)).transpose()?;
            items.extend(page.into_items());
            match next {
                Some(url) => {
                    debug!("Following next page {}", url);
                    req = self.request_url(Method::GET, url);
                }
                None => break,
            }
        }
        debug!("Received {} item(s) from {}", items.len(), resource.path());
        Ok(items)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        resource: Resource,
        id: Id,
    ) -> Result<T, ApiError> {
        let path = resource.item_path(id);
        info!("GET {}", path);
        self.send_json(self.request(Method::GET, &path)?).await
    }

    pub async fn create<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        resource: Resource,
        body: &B,
    ) -> Result<T, ApiError> {
        info!("POST {}", resource.path());
        let req = self.request(Method::POST, resource.path())?.json(body);
        self.send_json(req).await
    }

    pub async fn update<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        resource: Resource,
        id: Id,
        body: &B,
    ) -> Result<T, ApiError> {
        let path = resource.item_path(id);
        info!("PUT {}", path);
        let req = self.request(Method::PUT, &path)?.json(body);
        self.send_json(req).await
    }

    pub async fn delete(&self, resource: Resource, id: Id) -> Result<(), ApiError> {
        let path = resource.item_path(id);
        info!("DELETE {}", path);
        self.execute(self.request(Method::DELETE, &path)?).await?;
        Ok(())
    }

    /// Triggers a plan action such as `check_conflicts`.
    pub(super) async fn plan_action<T: DeserializeOwned>(
        &self,
        plan_id: Id,
        action: &str,
    ) -> Result<T, ApiError> {
        let path = format!("{}{}/", Resource::SchedulePlans.item_path(plan_id), action);
        info!("POST {}", path);
        self.send_json(self.request(Method::POST, &path)?).await
    }

    pub(super) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        info!("POST {}", path);
        self.send_json(self.request(Method::POST, path)?).await
    }

    pub async fn list_teachers(&self) -> Result<Vec<Teacher>, ApiError> {
        self.list(Resource::Teachers, &[]).await
    }

    pub async fn list_groups(&self) -> Result<Vec<Group>, ApiError> {
        self.list(Resource::Groups, &[]).await
    }

    pub async fn list_subjects(&self) -> Result<Vec<Subject>, ApiError> {
        self.list(Resource::Subjects, &[]).await
    }

    pub async fn list_rooms(&self) -> Result<Vec<Room>, ApiError> {
        self.list(Resource::Rooms, &[]).await
    }

    pub async fn list_subsidiaries(&self) -> Result<Vec<Subsidiary>, ApiError> {
        self.list(Resource::Subsidiaries, &[]).await
    }

    pub async fn list_schedule_plans(&self) -> Result<Vec<SchedulePlan>, ApiError> {
        self.list(Resource::SchedulePlans, &[]).await
    }

    pub async fn list_group_courses(&self) -> Result<Vec<GroupCourse>, ApiError> {
        self.list(Resource::GroupCourses, &[]).await
    }

    /// Loads the four filter facets concurrently.
    pub async fn filter_options(&self) -> Result<FilterOptions, ApiError> {
        let (groups, teachers, subjects, rooms) = futures::try_join!(
            self.list_groups(),
            self.list_teachers(),
            self.list_subjects(),
            self.list_rooms()
        )?;
        info!(
            "Filter options: {} group(s), {} teacher(s), {} subject(s), {} room(s)",
            groups.len(),
            teachers.len(),
            subjects.len(),
            rooms.len()
        );
        Ok(FilterOptions {
            groups,
            teachers,
            subjects,
            rooms,
        })
    }
}
