use std::sync::Arc;

use anyhow::anyhow;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Response};
use serde_json::{Value, json};

use crate::config::ApiConfig;
use crate::error::{LibError, Result};
use crate::models::{
    Employee, EmployeeId, HeadCountRecord, HeadcountId, ListQuery, LoginRequest, LoginResponse,
    Paged, ProjectId, Resource, decode_page,
};
use crate::sync::HeadcountStore;

const NGROK_SKIP_WARNING: &str = "ngrok-skip-browser-warning";
const LOGIN_PATH: &str = "AdminApplicationUser/Login";
const EMPLOYEE_SEARCH_LIMIT: u32 = 10;

/// HTTP client for the headcount backend.
#[derive(Clone)]
pub struct RosterClient {
    http: reqwest::Client,
    config: Arc<ApiConfig>,
}

impl RosterClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        if config.skip_ngrok_warning {
            headers.insert(
                HeaderName::from_static(NGROK_SKIP_WARNING),
                HeaderValue::from_static("true"),
            );
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| {
                LibError::transport("HTTP client could not be built", anyhow!(err))
            })?;

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub async fn list<R: Resource>(&self, query: ListQuery) -> Result<Paged<R>> {
        let (page, limit) = query.pagination();
        let url = self.config.endpoint(R::PATH);
        let response = self
            .http
            .get(&url)
            .query(&query.query_pairs())
            .send()
            .await?;
        let body = read_json(Method::GET, R::PATH, response).await?;
        let paged = decode_page::<R>(body, page, limit)?;
        tracing::debug!(
            resource = R::PATH,
            page,
            limit,
            total = paged.total,
            returned = paged.items.len(),
            "listed resources"
        );
        Ok(paged)
    }

    pub async fn get<R: Resource>(&self, id: i64) -> Result<R> {
        let path = format!("{}/{}", R::PATH, id);
        let response = self.http.get(self.config.endpoint(&path)).send().await?;
        let body = read_json(Method::GET, &path, response).await?;
        if body.is_null() {
            return Err(LibError::not_found(
                "Resource not found",
                anyhow!("{} returned an empty body", path),
            ));
        }
        serde_json::from_value(body).map_err(|err| {
            LibError::decode(
                "Backend response could not be decoded",
                anyhow!("failed to decode {}: {}", path, err),
            )
        })
    }

    pub async fn create<R: Resource>(&self, item: &R) -> Result<()> {
        let response = self
            .http
            .post(self.config.endpoint(R::PATH))
            .json(item)
            .send()
            .await?;
        ensure_success(Method::POST, R::PATH, response).await?;
        tracing::info!(resource = R::PATH, "created resource");
        Ok(())
    }

    /// Updates an existing item; the id travels in the body.
    pub async fn update<R: Resource>(&self, item: &R) -> Result<()> {
        let Some(id) = item.resource_id() else {
            return Err(LibError::invalid_with_code(
                "missing_resource_id",
                "Only saved items can be updated",
                anyhow!("{} update without an id", R::PATH),
            ));
        };
        let response = self
            .http
            .put(self.config.endpoint(R::PATH))
            .json(item)
            .send()
            .await?;
        ensure_success(Method::PUT, R::PATH, response).await?;
        tracing::info!(resource = R::PATH, id, "updated resource");
        Ok(())
    }

    pub async fn delete<R: Resource>(&self, id: i64) -> Result<()> {
        let response = self
            .http
            .delete(self.config.endpoint(R::PATH))
            .json(&json!({ "Id": id }))
            .send()
            .await?;
        ensure_success(Method::DELETE, R::PATH, response).await?;
        tracing::info!(resource = R::PATH, id, "deleted resource");
        Ok(())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .http
            .post(self.config.endpoint(LOGIN_PATH))
            .json(&request)
            .send()
            .await?;
        let body = read_json(Method::POST, LOGIN_PATH, response).await?;
        let login: LoginResponse = serde_json::from_value(body)?;
        if !login.is_success {
            tracing::warn!(message = ?login.message, "login rejected");
        }
        Ok(login)
    }

    pub async fn headcounts_for_project(
        &self,
        project_id: ProjectId,
        limit: u32,
    ) -> Result<Vec<HeadCountRecord>> {
        let query = ListQuery::new(1, limit).with_filter("ProjectId", project_id);
        Ok(self.list::<HeadCountRecord>(query).await?.items)
    }

    pub async fn employees_matching(&self, term: &str) -> Result<Vec<Employee>> {
        let query =
            ListQuery::new(1, EMPLOYEE_SEARCH_LIMIT).with_filter("FullName", term.trim());
        Ok(self.list::<Employee>(query).await?.items)
    }
}

impl HeadcountStore for RosterClient {
    async fn list_headcounts(
        &self,
        project_id: ProjectId,
        limit: u32,
    ) -> Result<Vec<HeadCountRecord>> {
        self.headcounts_for_project(project_id, limit).await
    }

    async fn create_headcount(&self, record: HeadCountRecord) -> Result<()> {
        self.create(&record).await
    }

    async fn update_headcount(&self, record: HeadCountRecord) -> Result<()> {
        self.update(&record).await
    }

    async fn delete_headcount(&self, id: HeadcountId) -> Result<()> {
        self.delete::<HeadCountRecord>(id.0).await
    }

    async fn search_employees(&self, term: &str) -> Result<Vec<Employee>> {
        self.employees_matching(term).await
    }

    async fn get_employee(&self, id: EmployeeId) -> Result<Employee> {
        self.get::<Employee>(id.0).await
    }
}

async fn ensure_success(method: Method, path: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::error!(
        method = %method,
        path,
        status = status.as_u16(),
        body = %body,
        "backend request failed"
    );
    Err(LibError::api(
        "Backend request failed",
        status.as_u16(),
        anyhow!("{} {} returned {}: {}", method, path, status, body),
    ))
}

/// Successful body as JSON; an empty body reads as `null`.
async fn read_json(method: Method, path: &str, response: Response) -> Result<Value> {
    let response = ensure_success(method, path, response).await?;
    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|err| {
        LibError::decode(
            "Backend response could not be decoded",
            anyhow!("{} response is not json: {}", path, err),
        )
    })
}
