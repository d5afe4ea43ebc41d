use crate::decode;
use crate::{Action, ClientError, Result};
use reportclient_core::{keys, lenient, uri, ActionRequest, ClientConfig, ProxyConfig, ProxyKind, API_VERSION};
use reqwest::multipart::{Form, Part};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Reporting API client
///
/// Every operation builds its own [`ActionRequest`], so the action in flight
/// never lives on the client and one instance can serve concurrent tasks.
pub struct ReportClient {
    base_url: String,
    authtoken: String,
    proxy: Option<ProxyConfig>,
    connection_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
    client: HttpClient,
}

/// File attached to an IMPORT as the `ZOHO_FILE` part
pub(crate) struct FileUpload {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl ReportClient {
    /// Create a client against the default API endpoint
    pub fn new(authtoken: impl Into<String>) -> Result<Self> {
        Self::from_config(ClientConfig::new(authtoken))
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let connection_timeout = config.connection_timeout();
        let read_timeout = config.read_timeout();
        let client = build_http_client(config.proxy.as_ref(), connection_timeout, read_timeout)?;

        Ok(Self {
            base_url: config.base_url,
            authtoken: config.authtoken,
            proxy: config.proxy,
            connection_timeout,
            read_timeout,
            client,
        })
    }

    pub fn auth_token(&self) -> &str {
        &self.authtoken
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Route every request through `proxy`
    pub fn set_proxy(&mut self, proxy: ProxyConfig) -> Result<()> {
        self.client = build_http_client(Some(&proxy), self.connection_timeout, self.read_timeout)?;
        self.proxy = Some(proxy);
        Ok(())
    }

    pub fn proxy(&self) -> Option<&ProxyConfig> {
        self.proxy.as_ref()
    }

    pub fn set_connection_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.client = build_http_client(self.proxy.as_ref(), Some(timeout), self.read_timeout)?;
        self.connection_timeout = Some(timeout);
        Ok(())
    }

    pub fn set_read_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.client = build_http_client(self.proxy.as_ref(), self.connection_timeout, Some(timeout))?;
        self.read_timeout = Some(timeout);
        Ok(())
    }

    pub fn connection_timeout(&self) -> Option<Duration> {
        self.connection_timeout
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    /// Current settings as a [`ClientConfig`], e.g. to persist them
    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            authtoken: self.authtoken.clone(),
            proxy: self.proxy.clone(),
            connection_timeout_secs: self.connection_timeout.map(|d| d.as_secs()),
            read_timeout_secs: self.read_timeout.map(|d| d.as_secs()),
        }
    }

    /// Resource URI of a user account
    pub fn user_uri(&self, email: &str) -> String {
        uri::user_uri(&self.base_url, email)
    }

    /// Resource URI of a database
    pub fn db_uri(&self, email: &str, db_name: &str) -> String {
        uri::db_uri(&self.base_url, email, db_name)
    }

    /// Resource URI of a table or view
    pub fn table_uri(&self, email: &str, db_name: &str, table_name: &str) -> String {
        uri::table_uri(&self.base_url, email, db_name, table_name)
    }

    /// Full request URL: resource URI, fixed query parameters, then repeated list parameters
    pub(crate) fn request_url(&self, resource_uri: &str, request: &ActionRequest) -> String {
        let mut url = format!(
            "{}?ZOHO_ACTION={}&ZOHO_OUTPUT_FORMAT={}&ZOHO_ERROR_FORMAT=JSON&authtoken={}&ZOHO_API_VERSION={}",
            resource_uri,
            request.action(),
            request.format(),
            self.authtoken,
            API_VERSION
        );
        for (key, value) in request.url_params() {
            url.push_str(&format!("&{}={}", key, uri::encode(value)));
        }
        url
    }

    /// POST the request and return status and body; only transport failures are errors here
    async fn send(
        &self,
        resource_uri: &str,
        request: &ActionRequest,
        upload: Option<FileUpload>,
    ) -> Result<(u16, Vec<u8>)> {
        let action = request.action();
        let url = self.request_url(resource_uri, request);
        let body = request.body();

        tracing::debug!(
            %action,
            uri = resource_uri,
            format = request.format(),
            params = body.len(),
            upload = upload.is_some(),
            "sending request"
        );

        let builder = self.client.post(&url);
        let builder = match upload {
            None => builder.form(&body),
            Some(file) => {
                let mut form = Form::new();
                for (key, value) in body.iter() {
                    form = form.text(key.to_string(), value.to_string());
                }
                let part = Part::bytes(file.data)
                    .file_name(file.file_name)
                    .mime_str("json/csv")
                    .map_err(|e| transport_error(action, None, &e))?;
                builder.multipart(form.part(keys::FILE, part))
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(action, e.status().map(|s| s.as_u16()), &e))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(action, Some(status), &e))?;

        tracing::debug!(%action, status, bytes = bytes.len(), "received response");
        Ok((status, bytes.to_vec()))
    }

    /// Decode `response.result` (or a key below it) into `T`
    pub(crate) async fn fetch_json<T: DeserializeOwned>(
        &self,
        resource_uri: &str,
        request: ActionRequest,
        path: &[&str],
    ) -> Result<T> {
        let (status, body) = self.send(resource_uri, &request, None).await?;
        decode::decode_result(request.action(), status, &body, path)
    }

    /// Same as `fetch_json`, sending a multipart body with the file attached
    pub(crate) async fn upload_json<T: DeserializeOwned>(
        &self,
        resource_uri: &str,
        request: ActionRequest,
        upload: FileUpload,
        path: &[&str],
    ) -> Result<T> {
        let (status, body) = self.send(resource_uri, &request, Some(upload)).await?;
        decode::decode_result(request.action(), status, &body, path)
    }

    /// Scalar under `response.result.<key>` rendered as text (ids may come back as numbers)
    pub(crate) async fn fetch_text(
        &self,
        resource_uri: &str,
        request: ActionRequest,
        key: &str,
    ) -> Result<String> {
        let value: Value = self.fetch_json(resource_uri, request, &[key]).await?;
        Ok(lenient::value_as_string(&value))
    }

    pub(crate) async fn fetch_flag(
        &self,
        resource_uri: &str,
        request: ActionRequest,
        key: &str,
    ) -> Result<bool> {
        let action = request.action();
        let value: Value = self.fetch_json(resource_uri, request, &[key]).await?;
        lenient::value_as_bool(&value).ok_or(ClientError::Parse { action })
    }

    pub(crate) async fn fetch_unit(&self, resource_uri: &str, request: ActionRequest) -> Result<()> {
        let (status, body) = self.send(resource_uri, &request, None).await?;
        decode::decode_unit(request.action(), status, &body)
    }

    pub(crate) async fn fetch_raw(&self, resource_uri: &str, request: ActionRequest) -> Result<Vec<u8>> {
        debug_assert!(request.action().returns_raw_body());
        let (status, body) = self.send(resource_uri, &request, None).await?;
        decode::decode_raw(request.action(), status, body)
    }
}

fn transport_error(action: Action, status: Option<u16>, err: &dyn std::fmt::Display) -> ClientError {
    tracing::debug!(%action, error = %err, "transport failure");
    ClientError::Transport {
        message: err.to_string(),
        action,
        status,
    }
}

fn build_http_client(
    proxy: Option<&ProxyConfig>,
    connection_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
) -> Result<HttpClient> {
    let mut builder = HttpClient::builder();

    if let Some(timeout) = connection_timeout {
        builder = builder.connect_timeout(timeout);
    }
    if let Some(timeout) = read_timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(proxy) = proxy {
        let url = proxy.url();
        let mut reqwest_proxy = match proxy.kind {
            ProxyKind::Http => reqwest::Proxy::http(&url),
            ProxyKind::Https => reqwest::Proxy::https(&url),
            ProxyKind::Both => reqwest::Proxy::all(&url),
        }
        .map_err(|e| ClientError::Configuration(format!("invalid proxy {}: {}", url, e)))?;

        if let Some(username) = &proxy.username {
            reqwest_proxy = reqwest_proxy.basic_auth(username, proxy.password.as_deref().unwrap_or(""));
        }
        builder = builder.proxy(reqwest_proxy);
    }

    builder
        .build()
        .map_err(|e| ClientError::Configuration(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ReportClient {
        ReportClient::from_config(ClientConfig {
            base_url: "https://reports.example.com/api/".to_string(),
            ..ClientConfig::new("token123")
        })
        .unwrap()
    }

    #[test]
    fn test_request_url_fixed_parameters() {
        let client = client();
        let uri = client.table_uri("a@b.com", "Sales", "Q1");
        let request = ActionRequest::new(Action::GetInfo, None);

        assert_eq!(
            client.request_url(&uri, &request),
            "https://reports.example.com/api/a%40b.com/Sales/Q1?ZOHO_ACTION=GETINFO\
             &ZOHO_OUTPUT_FORMAT=JSON&ZOHO_ERROR_FORMAT=JSON&authtoken=token123&ZOHO_API_VERSION=1.0"
        );
    }

    #[test]
    fn test_request_url_list_parameters() {
        let client = client();
        let request = ActionRequest::new(Action::HideColumn, None)
            .url_list(keys::COLUMN_NAME, ["Region", "Unit Cost"]);

        let url = client.request_url("https://reports.example.com/api/x", &request);
        assert!(url.ends_with("&ZOHO_COLUMNNAME=Region&ZOHO_COLUMNNAME=Unit%20Cost"));
    }

    #[test]
    fn test_export_format_in_url() {
        let client = client();
        let request = ActionRequest::new(Action::Export, None).output_format("CSV");
        let url = client.request_url("u", &request);
        assert!(url.contains("ZOHO_ACTION=EXPORT&ZOHO_OUTPUT_FORMAT=CSV&ZOHO_ERROR_FORMAT=JSON"));
    }

    #[test]
    fn test_setters_rebuild_client() {
        let mut client = client();
        client
            .set_proxy(ProxyConfig {
                host: "proxy.local".to_string(),
                port: 8080,
                kind: ProxyKind::Both,
                username: Some("user".to_string()),
                password: Some("secret".to_string()),
            })
            .unwrap();
        client.set_connection_timeout(Duration::from_secs(3)).unwrap();
        client.set_read_timeout(Duration::from_secs(30)).unwrap();

        assert_eq!(client.proxy().map(|p| p.port), Some(8080));
        assert_eq!(client.connection_timeout(), Some(Duration::from_secs(3)));
        assert_eq!(client.read_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(client.auth_token(), "token123");

        let config = client.config();
        assert_eq!(config.read_timeout_secs, Some(30));
        assert_eq!(config.proxy.map(|p| p.host), Some("proxy.local".to_string()));
    }
}
