//! Authenticated HTTP engine with the 401 renewal protocol.
//!
//! Every data-path call goes through [`Connection::request`]: the
//! `Authorization` header is injected, query parameters are encoded, and a
//! 401 triggers at most one token renewal followed by exactly one retry of
//! the original request. All other non-success statuses are translated into
//! [`ErrorKind::Remote`](crate::ErrorKind::Remote) errors carrying the
//! remote's error code and message.

use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{remote_error, Error, ErrorKind, Result};
use crate::session::{delegated_credentials, AuthMode, Session, TokenResponse};

/// HTTP verb used by the engine. DELETE has a stricter success criterion
/// than the rest, so the distinction matters beyond dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Patch,
    Delete,
}

impl Verb {
    fn to_reqwest(self) -> reqwest::Method {
        match self {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
            Verb::Patch => reqwest::Method::PATCH,
            Verb::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One named part of a multipart POST.
#[derive(Debug, Clone)]
pub struct FormPart {
    pub name: String,
    pub body: FormPartBody,
}

/// Part payload: inline text or a named file.
#[derive(Debug, Clone)]
pub enum FormPartBody {
    Text(String),
    File {
        filename: String,
        content_type: String,
        data: Vec<u8>,
    },
}

impl FormPart {
    /// A plain text part.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: FormPartBody::Text(value.into()),
        }
    }

    /// A file part with an explicit content type.
    pub fn file(
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            body: FormPartBody::File {
                filename: filename.into(),
                content_type: content_type.into(),
                data: data.into(),
            },
        }
    }
}

/// A completed response from the engine: status plus the raw body text.
///
/// The body is kept as text so callers can route it through the lenient
/// JSON parser (`parse_lenient`) before materialization.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: u16,
    body: String,
}

impl ApiResponse {
    /// The HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The raw response body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Parse the body as JSON, repairing truncated surrogate escapes.
    pub fn json_value(&self) -> Result<serde_json::Value> {
        crate::repair::parse_lenient(&self.body)
    }

    /// Deserialize the body into a typed value.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(Into::into)
    }
}

/// Internal description of one request, kept so a renewed request can be
/// rebuilt verbatim for the single retry.
struct PendingRequest<'a> {
    verb: Verb,
    path: &'a str,
    body: Option<&'a serde_json::Value>,
    params: &'a [(&'a str, &'a str)],
    headers: &'a [(&'a str, &'a str)],
    parts: Option<&'a [FormPart]>,
}

/// Authenticated HTTP engine.
///
/// Clones share the underlying [`Session`], so a token renewed through one
/// clone is immediately visible to all others.
#[derive(Debug, Clone)]
pub struct Connection {
    http: reqwest::Client,
    config: ClientConfig,
    session: Session,
}

impl Connection {
    /// Create a new connection with the given configuration and an empty
    /// session.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self {
            http,
            config,
            session: Session::new(),
        })
    }

    /// Create a connection with default configuration.
    pub fn default_connection() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// The connection configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The shared session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Authenticate the session and return the access token.
    ///
    /// The password mode performs an OAuth password grant against the login
    /// host. The external-token mode performs no network call and requires
    /// both a token and an instance URL. The delegated mode extracts
    /// credentials from a provider bundle.
    #[instrument(skip(self, mode))]
    pub async fn authenticate(&self, mode: AuthMode) -> Result<String> {
        match mode {
            AuthMode::Password { username, password } => {
                let response = self
                    .token_grant(&[
                        ("grant_type", "password"),
                        ("username", &username),
                        ("password", &password),
                    ])
                    .await?;

                let (org_id, user_id) = response.identity();
                let token = response.access_token.clone();
                self.session.write(|s| {
                    s.access_token = Some(response.access_token);
                    s.instance_url = Some(response.instance_url);
                    s.refresh_token = response.refresh_token;
                    s.username = Some(username);
                    s.password = Some(password);
                    s.user_id = user_id;
                    s.org_id = org_id;
                });
                Ok(token)
            }
            AuthMode::ExternalToken {
                token,
                instance_url,
            } => {
                if token.is_empty() || instance_url.is_empty() {
                    return Err(Error::argument(
                        "external-token authentication requires both a token and an instance URL",
                    ));
                }
                self.session.write(|s| {
                    s.access_token = Some(token.clone());
                    s.instance_url = Some(instance_url);
                });
                Ok(token)
            }
            AuthMode::Delegated(bundle) => {
                let (token, instance_url, refresh_token, user_id, org_id) =
                    delegated_credentials(&bundle)?;
                self.session.write(|s| {
                    s.access_token = Some(token.clone());
                    s.instance_url = Some(instance_url);
                    s.refresh_token = refresh_token;
                    s.user_id = user_id;
                    s.org_id = org_id;
                });
                Ok(token)
            }
        }
    }

    /// Perform a token grant against the login host. Grant parameters are
    /// sent as query parameters per the remote store's token endpoint
    /// convention.
    async fn token_grant(&self, grant_params: &[(&str, &str)]) -> Result<TokenResponse> {
        let mut params = vec![
            ("client_id", self.config.consumer_key.as_str()),
            ("client_secret", self.config.consumer_secret()),
        ];
        params.extend_from_slice(grant_params);

        let response = self
            .http
            .post(self.token_endpoint())
            .query(&params)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        if !(200..300).contains(&status) {
            return Err(remote_error(status, &body));
        }

        serde_json::from_str(&body).map_err(Into::into)
    }

    fn token_endpoint(&self) -> String {
        let host = &self.config.login_host;
        if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}/services/oauth2/token", host.trim_end_matches('/'))
        } else {
            format!("https://{}/services/oauth2/token", host)
        }
    }

    // =========================================================================
    // Verb surface
    // =========================================================================

    /// Authenticated GET.
    pub async fn get(
        &self,
        path: &str,
        params: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse> {
        self.request(PendingRequest {
            verb: Verb::Get,
            path,
            body: None,
            params,
            headers,
            parts: None,
        })
        .await
    }

    /// Authenticated POST with an optional JSON body.
    pub async fn post(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
        params: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse> {
        self.request(PendingRequest {
            verb: Verb::Post,
            path,
            body,
            params,
            headers,
            parts: None,
        })
        .await
    }

    /// Authenticated PATCH with an optional JSON body.
    pub async fn patch(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
        params: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse> {
        self.request(PendingRequest {
            verb: Verb::Patch,
            path,
            body,
            params,
            headers,
            parts: None,
        })
        .await
    }

    /// Authenticated DELETE. Succeeds only on 204 No Content.
    pub async fn delete(
        &self,
        path: &str,
        params: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse> {
        self.request(PendingRequest {
            verb: Verb::Delete,
            path,
            body: None,
            params,
            headers,
            parts: None,
        })
        .await
    }

    /// Authenticated multipart/form-data POST with named parts.
    pub async fn post_multipart(
        &self,
        path: &str,
        parts: &[FormPart],
        params: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse> {
        self.request(PendingRequest {
            verb: Verb::Post,
            path,
            body: None,
            params,
            headers,
            parts: Some(parts),
        })
        .await
    }

    // =========================================================================
    // Dispatch and renewal
    // =========================================================================

    async fn request(&self, pending: PendingRequest<'_>) -> Result<ApiResponse> {
        let (status, body) = self.dispatch(&pending).await?;

        if status == 401 {
            let original = remote_error(status, &body);
            match self.renew_token().await {
                Ok(()) => {
                    debug!(path = pending.path, "access token renewed, retrying once");
                    let (status, body) = self.dispatch(&pending).await?;
                    return finish(pending.verb, status, body);
                }
                Err(renew_err) => {
                    warn!(error = %renew_err, "token renewal failed");
                    return Err(original);
                }
            }
        }

        finish(pending.verb, status, body)
    }

    /// Renew the access token after a 401. A refresh token takes priority;
    /// a refresh-grant failure does not fall back to the password grant.
    async fn renew_token(&self) -> Result<()> {
        let (refresh_token, username, password) = self.session.read(|s| {
            (
                s.refresh_token.clone(),
                s.username.clone(),
                s.password.clone(),
            )
        });

        let response = if let Some(refresh_token) = refresh_token {
            self.token_grant(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", &refresh_token),
            ])
            .await?
        } else if let (Some(username), Some(password)) = (username, password) {
            self.token_grant(&[
                ("grant_type", "password"),
                ("username", &username),
                ("password", &password),
            ])
            .await?
        } else {
            return Err(Error::argument(
                "no refresh token or password credentials held for renewal",
            ));
        };

        // Single assignment; concurrent readers see old or new, never partial.
        self.session.replace_access_token(response.access_token);
        Ok(())
    }

    async fn dispatch(&self, pending: &PendingRequest<'_>) -> Result<(u16, String)> {
        let url = self.resolve_url(pending.path)?;
        let token = self
            .session
            .access_token()
            .ok_or_else(|| Error::argument("not authenticated: call authenticate first"))?;

        let mut req = self.http.request(pending.verb.to_reqwest(), url.as_str());

        if !pending.params.is_empty() {
            req = req.query(pending.params);
        }

        // Injected first so caller-supplied headers can override it.
        req = req.header("Authorization", format!("OAuth {}", token));
        for (name, value) in pending.headers {
            req = req.header(*name, *value);
        }

        if let Some(body) = pending.body {
            req = req.json(body);
        }

        if let Some(parts) = pending.parts {
            let mut form = reqwest::multipart::Form::new();
            for part in parts {
                form = match &part.body {
                    FormPartBody::Text(value) => form.text(part.name.clone(), value.clone()),
                    FormPartBody::File {
                        filename,
                        content_type,
                        data,
                    } => {
                        let file = reqwest::multipart::Part::bytes(data.clone())
                            .file_name(filename.clone())
                            .mime_str(content_type)
                            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;
                        form.part(part.name.clone(), file)
                    }
                };
            }
            req = req.multipart(form);
        }

        if self.config.enable_tracing {
            debug!(verb = ?pending.verb, url = %url, "dispatching request");
        }

        let response = req.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        if self.config.enable_tracing {
            debug!(status, "response received");
        }

        Ok((status, body))
    }

    /// Resolve a path against the instance URL. Opaque cursor URLs that are
    /// already absolute are used as-is; they are never parsed or validated.
    fn resolve_url(&self, path: &str) -> Result<String> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(path.to_string());
        }

        let instance_url = self
            .session
            .instance_url()
            .ok_or_else(|| Error::argument("not authenticated: no instance URL"))?;

        if path.starts_with('/') {
            Ok(format!("{}{}", instance_url.trim_end_matches('/'), path))
        } else {
            Ok(format!("{}/{}", instance_url.trim_end_matches('/'), path))
        }
    }
}

/// Translate a final status into success or a `Remote` error. DELETE's
/// success criterion is strictly 204 No Content; every other verb accepts
/// the whole 2xx class.
fn finish(verb: Verb, status: u16, body: String) -> Result<ApiResponse> {
    let ok = match verb {
        Verb::Delete => status == 204,
        _ => (200..300).contains(&status),
    };

    if ok {
        Ok(ApiResponse { status, body })
    } else {
        Err(remote_error(status, &body))
    }
}
