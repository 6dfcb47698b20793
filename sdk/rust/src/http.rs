//! Built-in HTTP transport.
//!
//! Speaks just enough HTTP/1.1 over a tokio `TcpStream` to POST a GraphQL
//! request and read the reply: one connection per request (`Connection:
//! close`), `Content-Length` or chunked response bodies, plain `http://` only.
//! Put a TLS-terminating proxy in front of HTTPS servers, or plug in another
//! [`Transport`].

use crate::config::EndpointConfig;
use crate::error::TransportError;
use crate::transport::{GraphqlRequest, RawResponse, Transport};
use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

/// GraphQL-over-HTTP POST transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransport;

impl HttpTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        config: &EndpointConfig,
        request: &GraphqlRequest,
    ) -> Result<RawResponse, TransportError> {
        let target = HttpTarget::parse(&config.url)?;
        let body =
            serde_json::to_vec(request).map_err(|e| TransportError::Serialize(e.to_string()))?;

        debug!(url = %config.url, bytes = body.len(), "posting GraphQL request");

        let response = timeout(config.timeout, post(&target, &body, &config.headers))
            .await
            .map_err(|_| TransportError::Timeout(config.timeout))??;

        if !(200..300).contains(&response.status) {
            warn!(url = %config.url, status = response.status, "GraphQL endpoint returned an HTTP error");
            return Err(TransportError::HttpStatus {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }

        let body = serde_json::from_slice(&response.body)
            .map_err(|e| TransportError::MalformedBody(e.to_string()))?;

        Ok(RawResponse {
            status: response.status,
            body,
        })
    }
}

/// Where to connect and what to ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HttpTarget {
    host: String,
    port: u16,
    path: String,
}

impl HttpTarget {
    /// Parses `http://host[:port][/path]`; a missing scheme means `http`.
    fn parse(url: &str) -> Result<Self, TransportError> {
        let url = url.trim();

        let without_scheme = if let Some(rest) = url.strip_prefix("http://") {
            rest
        } else if url.contains("://") {
            return Err(TransportError::UnsupportedScheme(url.to_string()));
        } else {
            url
        };

        let (authority, path) = match without_scheme.find('/') {
            Some(slash) => (&without_scheme[..slash], &without_scheme[slash..]),
            None => (without_scheme, "/"),
        };

        // Bracketed IPv6 literals carry colons of their own.
        let port_separator = match authority.rfind(']') {
            Some(bracket) => authority[bracket..].find(':').map(|i| bracket + i),
            None => authority.rfind(':'),
        };

        let (host, port) = match port_separator {
            Some(colon) => {
                let port = authority[colon + 1..]
                    .parse()
                    .map_err(|_| TransportError::InvalidUrl(url.to_string()))?;
                (&authority[..colon], port)
            }
            None => (authority, 80),
        };

        if host.is_empty() {
            return Err(TransportError::InvalidUrl(url.to_string()));
        }

        Ok(Self {
            host: host.to_string(),
            port,
            path: path.to_string(),
        })
    }

    fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn host_header(&self) -> String {
        if self.port == 80 {
            self.host.clone()
        } else {
            self.address()
        }
    }
}

struct HttpResponse {
    status: u16,
    body: Vec<u8>,
}

async fn post(
    target: &HttpTarget,
    body: &[u8],
    headers: &IndexMap<String, String>,
) -> Result<HttpResponse, TransportError> {
    let address = target.address();
    let mut stream = TcpStream::connect(&address)
        .await
        .map_err(|e| TransportError::Connect {
            address: address.clone(),
            message: e.to_string(),
        })?;

    let mut head = format!(
        "POST {} HTTP/1.1\r\n\
         Host: {}\r\n\
         Content-Type: application/json\r\n\
         Accept: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n",
        target.path,
        target.host_header(),
        body.len()
    );
    for (key, value) in headers {
        head.push_str(&format!("{key}: {value}\r\n"));
    }
    head.push_str("\r\n");

    stream
        .write_all(head.as_bytes())
        .await
        .map_err(|e| TransportError::Io(format!("write failed: {e}")))?;
    stream
        .write_all(body)
        .await
        .map_err(|e| TransportError::Io(format!("write failed: {e}")))?;

    let mut raw = Vec::new();
    stream
        .read_to_end(&mut raw)
        .await
        .map_err(|e| TransportError::Io(format!("read failed: {e}")))?;

    parse_http_response(&raw)
}

/// Splits a complete HTTP/1.1 response into status and decoded body.
fn parse_http_response(raw: &[u8]) -> Result<HttpResponse, TransportError> {
    let head_end = find(raw, b"\r\n\r\n")
        .ok_or_else(|| TransportError::InvalidResponse("missing end of headers".into()))?;
    let head = String::from_utf8_lossy(&raw[..head_end]);
    let rest = &raw[head_end + 4..];

    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap_or_default();
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| TransportError::InvalidResponse(format!("bad status line `{status_line}`")))?;

    let mut content_length = None;
    let mut chunked = false;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = Some(value.parse::<usize>().map_err(|_| {
                TransportError::InvalidResponse(format!("bad content-length `{value}`"))
            })?);
        } else if name.eq_ignore_ascii_case("transfer-encoding") {
            chunked = value.to_ascii_lowercase().contains("chunked");
        }
    }

    let body = if chunked {
        parse_chunked_body(rest)?
    } else if let Some(length) = content_length {
        if rest.len() < length {
            return Err(TransportError::InvalidResponse(format!(
                "body truncated: expected {length} bytes, got {}",
                rest.len()
            )));
        }
        rest[..length].to_vec()
    } else {
        rest.to_vec()
    };

    Ok(HttpResponse { status, body })
}

/// Decodes a chunked transfer encoding body.
fn parse_chunked_body(mut remaining: &[u8]) -> Result<Vec<u8>, TransportError> {
    let mut body = Vec::new();

    loop {
        let line_end = find(remaining, b"\r\n")
            .ok_or_else(|| TransportError::InvalidResponse("unterminated chunk size".into()))?;
        let size_line = String::from_utf8_lossy(&remaining[..line_end]);
        // Chunk extensions follow a ';'.
        let size_str = size_line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_str, 16)
            .map_err(|_| TransportError::InvalidResponse(format!("bad chunk size `{size_str}`")))?;

        remaining = &remaining[line_end + 2..];
        if size == 0 {
            return Ok(body);
        }
        if remaining.len() < size {
            return Err(TransportError::InvalidResponse("chunk truncated".into()));
        }

        body.extend_from_slice(&remaining[..size]);
        remaining = remaining[size..].strip_prefix(b"\r\n").unwrap_or(&remaining[size..]);
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
