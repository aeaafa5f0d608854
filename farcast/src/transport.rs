//! Transport seam over the shared connection pool.

use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use tokio::sync::OnceCell;

use crate::error::Result;

/// A raw wire reply, before response materialization.
#[derive(Debug)]
pub struct RawReply {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Reason phrase, when one is known for the status.
    pub reason: Option<String>,
    /// The URL the reply was actually served from.
    pub url: String,
    /// Body text, fully read.
    pub text: String,
}

/// Upstream call seam.
///
/// The client never speaks HTTP itself; every exchange goes through this
/// trait. The bundled implementation is [`HttpTransport`]; tests and
/// embedders may substitute their own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs one HTTP exchange and reads the body to completion.
    async fn send(&self, method: &Method, url: &str, headers: &HeaderMap) -> Result<RawReply>;
}

/// Transport over a shared `reqwest` connection pool.
///
/// The pool is created lazily on first use and reused for every exchange
/// across the client's lifetime; all concurrent dispatch tasks share it.
pub struct HttpTransport {
    client: OnceCell<reqwest::Client>,
    user_agent: String,
}

impl HttpTransport {
    /// Creates a transport announcing the given user agent.
    pub fn new(user_agent: impl Into<String>) -> Self {
        HttpTransport {
            client: OnceCell::new(),
            user_agent: user_agent.into(),
        }
    }

    async fn client(&self) -> Result<&reqwest::Client> {
        self.client
            .get_or_try_init(|| async {
                let client = reqwest::Client::builder()
                    .user_agent(&self.user_agent)
                    .build()?;
                Ok::<_, crate::Error>(client)
            })
            .await
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, method: &Method, url: &str, headers: &HeaderMap) -> Result<RawReply> {
        let client = self.client().await?;
        let response = client
            .request(method.clone(), url)
            .headers(headers.clone())
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().to_string();
        let reason = status.canonical_reason().map(str::to_owned);
        let text = response.text().await?;

        Ok(RawReply {
            status,
            headers,
            reason,
            url,
            text,
        })
    }
}
