use crate::client::agent::HttpsAgent;
use crate::errors::ClientError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;

const API_TOKEN_HEADER: &str = "x-cybozu-api-token";
const PASSWORD_AUTH_HEADER: &str = "x-cybozu-authorization";

#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    ApiToken(String),
    Password { username: String, password: String },
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::ApiToken(_) => f.write_str("ApiToken([REDACTED])"),
            Auth::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Everything needed to construct a REST client.
#[derive(Debug, Clone)]
pub struct ClientParams {
    pub base_url: String,
    pub auth: Auth,
    pub basic_auth: Option<BasicAuth>,
    pub user_agent: String,
    pub https_agent: HttpsAgent,
}

fn header_value(value: &str) -> Result<HeaderValue, ClientError> {
    HeaderValue::from_str(value)
        .map_err(|err| ClientError::Build(format!("invalid header value: {}", err)))
}

pub fn default_headers(params: &ClientParams) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    match &params.auth {
        Auth::ApiToken(token) => {
            headers.insert(HeaderName::from_static(API_TOKEN_HEADER), header_value(token)?);
        }
        Auth::Password { username, password } => {
            let encoded = BASE64.encode(format!("{}:{}", username, password));
            headers.insert(
                HeaderName::from_static(PASSWORD_AUTH_HEADER),
                header_value(&encoded)?,
            );
        }
    }
    if let Some(basic) = &params.basic_auth {
        let encoded = BASE64.encode(format!("{}:{}", basic.username, basic.password));
        headers.insert(AUTHORIZATION, header_value(&format!("Basic {}", encoded))?);
    }
    Ok(headers)
}

#[derive(Debug, Deserialize)]
struct KintoneErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Thin kintone REST API client. Payloads are passed through as JSON.
#[derive(Debug, Clone)]
pub struct KintoneRestClient {
    http: Client,
    base_url: String,
    user_agent: String,
}

impl KintoneRestClient {
    pub fn new(params: ClientParams) -> Result<Self, ClientError> {
        let builder = Client::builder()
            .user_agent(params.user_agent.clone())
            .default_headers(default_headers(&params)?);
        let builder = params.https_agent.configure(builder)?;
        let http = builder
            .build()
            .map_err(|err| ClientError::Build(err.to_string()))?;
        Ok(Self {
            http,
            base_url: params.base_url.trim_end_matches('/').to_string(),
            user_agent: params.user_agent,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn record(&self) -> RecordApi<'_> {
        RecordApi { client: self }
    }

    pub fn app(&self) -> AppApi<'_> {
        AppApi { client: self }
    }

    pub fn file(&self) -> FileApi<'_> {
        FileApi { client: self }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/k/v1/{}.json", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.endpoint(path))
    }

    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let body: Option<KintoneErrorBody> = serde_json::from_str(&text).ok();
        let (code, message) = match body {
            Some(body) => (body.code, body.message),
            None => (String::new(), text),
        };
        Err(ClientError::Api {
            status,
            code,
            message,
        })
    }

    async fn send_json(&self, request: RequestBuilder) -> Result<Value, ClientError> {
        let response = Self::check(request.send().await?).await?;
        Ok(response.json::<Value>().await?)
    }
}

pub struct RecordApi<'a> {
    client: &'a KintoneRestClient,
}

impl RecordApi<'_> {
    pub async fn get_record(&self, app: &str, id: &str) -> Result<Value, ClientError> {
        let request = self
            .client
            .request(Method::GET, "record")
            .query(&[("app", app), ("id", id)]);
        self.client.send_json(request).await
    }

    pub async fn get_records(
        &self,
        app: &str,
        query: Option<&str>,
        fields: &[String],
    ) -> Result<Value, ClientError> {
        let mut body = json!({ "app": app, "totalCount": true });
        if let Some(query) = query {
            body["query"] = Value::String(query.to_string());
        }
        if !fields.is_empty() {
            body["fields"] = json!(fields);
        }
        // GET with a JSON body is accepted through the method override header.
        let request = self
            .client
            .request(Method::POST, "records")
            .header("x-http-method-override", "GET")
            .json(&body);
        self.client.send_json(request).await
    }

    pub async fn add_record(&self, app: &str, record: Value) -> Result<Value, ClientError> {
        let request = self
            .client
            .request(Method::POST, "record")
            .json(&json!({ "app": app, "record": record }));
        self.client.send_json(request).await
    }

    pub async fn update_record(
        &self,
        app: &str,
        id: &str,
        record: Value,
        revision: Option<i64>,
    ) -> Result<Value, ClientError> {
        let mut body = json!({ "app": app, "id": id, "record": record });
        if let Some(revision) = revision {
            body["revision"] = json!(revision);
        }
        let request = self.client.request(Method::PUT, "record").json(&body);
        self.client.send_json(request).await
    }

    pub async fn delete_records(&self, app: &str, ids: &[String]) -> Result<Value, ClientError> {
        let request = self
            .client
            .request(Method::DELETE, "records")
            .json(&json!({ "app": app, "ids": ids }));
        self.client.send_json(request).await
    }
}

pub struct AppApi<'a> {
    client: &'a KintoneRestClient,
}

impl AppApi<'_> {
    pub async fn get_app(&self, id: &str) -> Result<Value, ClientError> {
        let request = self
            .client
            .request(Method::GET, "app")
            .query(&[("id", id)]);
        self.client.send_json(request).await
    }

    pub async fn get_apps(&self, name: Option<&str>, limit: Option<u32>) -> Result<Value, ClientError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(name) = name {
            query.push(("name", name.to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        let request = self.client.request(Method::GET, "apps").query(&query);
        self.client.send_json(request).await
    }

    pub async fn get_form_fields(&self, app: &str) -> Result<Value, ClientError> {
        let request = self
            .client
            .request(Method::GET, "app/form/fields")
            .query(&[("app", app)]);
        self.client.send_json(request).await
    }

    pub async fn get_form_layout(&self, app: &str) -> Result<Value, ClientError> {
        let request = self
            .client
            .request(Method::GET, "app/form/layout")
            .query(&[("app", app)]);
        self.client.send_json(request).await
    }
}

pub struct FileApi<'a> {
    client: &'a KintoneRestClient,
}

impl FileApi<'_> {
    /// Uploads a file and returns its `fileKey`.
    pub async fn upload_file(&self, name: &str, content: Vec<u8>) -> Result<String, ClientError> {
        let form = Form::new().part("file", Part::bytes(content).file_name(name.to_string()));
        let request = self.client.request(Method::POST, "file").multipart(form);
        let value = self.client.send_json(request).await?;
        value
            .get("fileKey")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ClientError::Api {
                status: reqwest::StatusCode::OK,
                code: String::new(),
                message: "fileKey missing from upload response".to_string(),
            })
    }

    pub async fn download_file(&self, file_key: &str) -> Result<Bytes, ClientError> {
        let request = self
            .client
            .request(Method::GET, "file")
            .query(&[("fileKey", file_key)]);
        let response = KintoneRestClient::check(request.send().await?).await?;
        Ok(response.bytes().await?)
    }
}
