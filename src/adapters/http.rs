/*!
 * HTTP Client Adapter
 * Dual-mode GET/POST over reqwest sessions
 *
 * The blocking session runs on the calling thread (sync context) or a
 * worker thread (bridged). The async session, when configured, is the
 * native non-blocking path; without one, async callers are bridged and the
 * adapter warns once.
 */

use crate::core::errors::{CallerError, ResourceError, Result};
use crate::dispatch::{unified_operation, Dispatched, Dispatcher, DualModeOperation};
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::info;

/// Per-request options
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    /// JSON request body; sent on POST only
    pub json: Option<serde_json::Value>,
    pub timeout: Option<Duration>,
}

/// Response status and raw body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .map_err(|err| ResourceError::Http(format!("invalid json body: {err}")).into())
    }
}

type HttpArgs = (String, RequestOptions);

/// Dual-mode HTTP facade rooted at a base URL
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    get_op: DualModeOperation<HttpArgs, HttpResponse>,
    post_op: DualModeOperation<HttpArgs, HttpResponse>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Post,
}

impl ApiClient {
    /// Blocking session only; async callers bridge through the worker pool
    pub fn new(base_url: impl Into<String>, dispatcher: &Dispatcher) -> Result<Self> {
        Self::with_sessions(
            base_url,
            reqwest::blocking::Client::new(),
            None,
            dispatcher,
        )
    }

    /// Blocking session plus an optional native async session
    pub fn with_sessions(
        base_url: impl Into<String>,
        sync_session: reqwest::blocking::Client,
        async_session: Option<reqwest::Client>,
        dispatcher: &Dispatcher,
    ) -> Result<Self> {
        let base_url = base_url.into();
        // Reject a bad base once, at construction, rather than on every call.
        parse_url(&base_url, "")?;

        let get_op = Self::build_op(
            Method::Get,
            "http.get",
            &base_url,
            &sync_session,
            async_session.as_ref(),
            dispatcher,
        );
        let post_op = Self::build_op(
            Method::Post,
            "http.post",
            &base_url,
            &sync_session,
            async_session.as_ref(),
            dispatcher,
        );

        info!(
            base_url = %base_url,
            native_async = async_session.is_some(),
            "api client ready"
        );

        Ok(Self {
            base_url,
            get_op,
            post_op,
        })
    }

    fn build_op(
        method: Method,
        name: &'static str,
        base_url: &str,
        sync_session: &reqwest::blocking::Client,
        async_session: Option<&reqwest::Client>,
        dispatcher: &Dispatcher,
    ) -> DualModeOperation<HttpArgs, HttpResponse> {
        let session = sync_session.clone();
        let base = base_url.to_owned();
        let mut builder = unified_operation(move |(path, opts): HttpArgs| {
            let url = parse_url(&base, &path)?;
            let mut request = match method {
                Method::Get => session.get(url),
                Method::Post => session.post(url),
            };
            for (key, value) in &opts.headers {
                request = request.header(key, value);
            }
            if !opts.query.is_empty() {
                request = request.query(&opts.query);
            }
            if let Some(timeout) = opts.timeout {
                request = request.timeout(timeout);
            }
            if method == Method::Post {
                if let Some(body) = &opts.json {
                    request = request.json(body);
                }
            }
            let response = request.send().map_err(ResourceError::from)?;
            let status = response.status().as_u16();
            let body = response.text().map_err(ResourceError::from)?;
            Ok(HttpResponse { status, body })
        })
        .named(name);

        match async_session {
            Some(native) => {
                let session = native.clone();
                let base = base_url.to_owned();
                builder = builder.with_async(
                    move |(path, opts): HttpArgs| -> BoxFuture<'static, Result<HttpResponse>> {
                        let session = session.clone();
                        let base = base.clone();
                        Box::pin(async move {
                            let url = parse_url(&base, &path)?;
                            let mut request = match method {
                                Method::Get => session.get(url),
                                Method::Post => session.post(url),
                            };
                            for (key, value) in &opts.headers {
                                request = request.header(key, value);
                            }
                            if !opts.query.is_empty() {
                                request = request.query(&opts.query);
                            }
                            if let Some(timeout) = opts.timeout {
                                request = request.timeout(timeout);
                            }
                            if method == Method::Post {
                                if let Some(body) = &opts.json {
                                    request = request.json(body);
                                }
                            }
                            let response = request.send().await.map_err(ResourceError::from)?;
                            let status = response.status().as_u16();
                            let body = response.text().await.map_err(ResourceError::from)?;
                            Ok(HttpResponse { status, body })
                        })
                    },
                );
            }
            None => {
                builder = builder.bridge_notice(
                    "no async http session configured; bridging the blocking session",
                );
            }
        }

        builder.bind(dispatcher)
    }

    /// GET relative to the base URL; context-detected
    pub fn get(&self, path: impl Into<String>, opts: RequestOptions) -> Dispatched<HttpResponse> {
        self.get_op.call((path.into(), opts))
    }

    /// POST relative to the base URL; context-detected
    pub fn post(&self, path: impl Into<String>, opts: RequestOptions) -> Dispatched<HttpResponse> {
        self.post_op.call((path.into(), opts))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Underlying operation, for explicit sync/async invocation
    pub fn get_operation(&self) -> &DualModeOperation<HttpArgs, HttpResponse> {
        &self.get_op
    }

    /// Underlying operation, for explicit sync/async invocation
    pub fn post_operation(&self) -> &DualModeOperation<HttpArgs, HttpResponse> {
        &self.post_op
    }
}

fn parse_url(base: &str, path: &str) -> Result<reqwest::Url> {
    let base = reqwest::Url::parse(base)
        .map_err(|err| CallerError::InvalidArgument(format!("invalid base url: {err}")))?;
    if path.is_empty() {
        return Ok(base);
    }
    base.join(path)
        .map_err(|err| CallerError::InvalidArgument(format!("invalid request path: {err}")).into())
}
