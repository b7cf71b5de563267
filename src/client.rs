use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{CatalogError, Result};
use crate::responses::{AccessToken, TokenPair};
use crate::tokens::Credentials;

pub const LOGIN_PATH: &str = "token/";
pub const REFRESH_PATH: &str = "token/refresh/";
pub const LOGIN_ROUTE: &str = "login";

/// Body of an outgoing request. Kept as owned data so the request can be
/// rebuilt after a token refresh.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartBody),
}

#[derive(Debug, Clone, Default)]
pub struct MultipartBody {
    pub text: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl MultipartBody {
    fn to_form(&self) -> Result<Form> {
        let mut form = Form::new();

        for (name, value) in &self.text {
            form = form.text(name.clone(), value.clone());
        }

        for file in &self.files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(&file.content_type)?;
            form = form.part(file.field.clone(), part);
        }

        Ok(form)
    }
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn multipart(mut self, body: MultipartBody) -> Self {
        self.body = RequestBody::Multipart(body);
        self
    }

    /// Login and refresh exchanges never carry a bearer token and never
    /// trigger recovery.
    fn is_token_exchange(&self) -> bool {
        self.path == LOGIN_PATH || self.path == REFRESH_PATH
    }
}

/// Where the user is sent when the session cannot be recovered.
pub trait LoginRedirect: Send + Sync {
    /// `from` is the route the user was on, so they can resume it after
    /// logging in again.
    fn redirect_to_login(&self, from: &str);
}

/// Tells the terminal user to log in and re-run the interrupted command.
pub struct PromptLogin;

impl LoginRedirect for PromptLogin {
    fn redirect_to_login(&self, from: &str) {
        eprintln!("Session expired. Run `catalog login`, then re-run `catalog {from}`.");
    }
}

pub struct ApiClient {
    http: Client,
    base_url: Url,
    credentials: Credentials,
    route: String,
    redirect: Box<dyn LoginRedirect>,
}

impl ApiClient {
    pub fn new(http: Client, base_url: Url, credentials: Credentials) -> Self {
        Self {
            http,
            base_url,
            credentials,
            route: String::new(),
            redirect: Box::new(PromptLogin),
        }
    }

    /// Set the route (command line) this client is serving.
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = route.into();
        self
    }

    pub fn with_redirect(mut self, redirect: impl LoginRedirect + 'static) -> Self {
        self.redirect = Box::new(redirect);
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Exchange username/password for a token pair and store it.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let request = ApiRequest::post(LOGIN_PATH).json(&serde_json::json!({
            "username": username,
            "password": password,
        }))?;

        let pair: TokenPair = self.execute_json(&request).await?;
        self.credentials.set_tokens(&pair.access, &pair.refresh)?;
        info!("logged in as {username}");

        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        self.credentials.clear()
    }

    /// Send a request and decode its JSON body.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        let response = self.execute(request).await?;
        decode(response).await
    }

    /// Send a request, recovering once from an expired access token.
    /// Only 2xx responses are returned.
    pub async fn execute(&self, request: &ApiRequest) -> Result<Response> {
        let token = if request.is_token_exchange() {
            None
        } else {
            self.credentials.access()
        };

        let response = self.dispatch(request, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return ensure_success(response).await;
        }

        self.recover(request, response).await
    }

    async fn recover(&self, request: &ApiRequest, rejected: Response) -> Result<Response> {
        if request.is_token_exchange() || self.route == LOGIN_ROUTE {
            debug!(path = %request.path, "401 without recovery");
            return ensure_success(rejected).await;
        }

        let Some(refresh) = self.credentials.refresh() else {
            self.redirect.redirect_to_login(&self.route);
            return Err(CatalogError::AuthInvalid {
                reason: "not logged in".to_string(),
            });
        };

        info!(path = %request.path, "access token rejected, refreshing");

        let access = match self.refresh_access(&refresh).await {
            Ok(access) => access,
            Err(err) => {
                warn!(error = %err, "token refresh failed");
                self.credentials.clear()?;
                self.redirect.redirect_to_login(&self.route);
                return Err(CatalogError::AuthInvalid {
                    reason: "session could not be refreshed".to_string(),
                });
            }
        };

        self.credentials.set_access(&access)?;

        let retried = self.dispatch(request, Some(&access)).await?;

        if retried.status() == StatusCode::UNAUTHORIZED {
            warn!(path = %request.path, "refreshed token rejected");
            self.redirect.redirect_to_login(&self.route);
            return Err(CatalogError::AuthInvalid {
                reason: "refreshed token was rejected".to_string(),
            });
        }

        ensure_success(retried).await
    }

    async fn refresh_access(&self, refresh: &str) -> Result<String> {
        let request =
            ApiRequest::post(REFRESH_PATH).json(&serde_json::json!({ "refresh": refresh }))?;
        let response = self.dispatch(&request, None).await?;
        let response = ensure_success(response).await?;
        let token: AccessToken = decode(response).await?;

        Ok(token.access)
    }

    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> Result<Response> {
        let url = self
            .base_url
            .join(&request.path)
            .map_err(|source| CatalogError::InvalidUrl {
                url: request.path.clone(),
                source,
            })?;

        debug!(method = %request.method, %url, "sending request");

        let mut builder: RequestBuilder = self.http.request(request.method.clone(), url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(body) => builder.multipart(body.to_form()?),
        };

        Ok(builder.send().await?)
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    Err(CatalogError::Api {
        status: response.status().as_u16(),
        message: response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read response body>".to_string()),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status().as_u16();
    let bytes = response.bytes().await?;

    serde_json::from_slice(&bytes).map_err(|e| CatalogError::Decode {
        status,
        message: e.to_string(),
    })
}
