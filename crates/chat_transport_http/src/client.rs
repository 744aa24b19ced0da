use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chat_transport::{
    ChatTransport, Method, TransportError, TransportRequest, TransportResponse, TransportResult,
};
use reqwest::Client;

use crate::config::HttpTransportConfig;
use crate::endpoint::normalize_endpoint_url;
use crate::error::{classify_request_error, parse_error_detail, HttpTransportError};
use crate::headers::{build_headers, to_header_map};

/// `reqwest`-backed transport. Closing drops the client and its connection
/// pool; requests already in flight keep their own handle and finish.
#[derive(Debug)]
pub struct HttpTransport {
    http: RwLock<Option<Client>>,
    config: HttpTransportConfig,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self, HttpTransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(HttpTransportError::Client)?;
        Ok(Self {
            http: RwLock::new(Some(http)),
            config,
        })
    }

    pub fn config(&self) -> &HttpTransportConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        read_unpoisoned(&self.http).is_none()
    }

    fn client(&self) -> Result<Client, HttpTransportError> {
        read_unpoisoned(&self.http)
            .clone()
            .ok_or(HttpTransportError::Closed)
    }

    pub fn build_request(
        &self,
        request: &TransportRequest,
    ) -> Result<reqwest::RequestBuilder, HttpTransportError> {
        let http = self.client()?;
        let url = normalize_endpoint_url(&request.url)?;
        let headers = to_header_map(&build_headers(&self.config, &request.headers))?;

        let builder = match request.method {
            Method::Get => http.get(url),
            Method::Post => http.post(url),
        };
        let builder = builder.headers(headers);

        Ok(match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        })
    }

    async fn execute(&self, request: TransportRequest) -> TransportResult {
        let method = request.method;
        let builder = self.build_request(&request)?;
        let response = builder.send().await.map_err(|error| {
            tracing::debug!(%method, url = %request.url, %error, "chat request failed");
            classify_request_error(&error)
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| classify_request_error(&error))?;

        if !status.is_success() {
            tracing::debug!(
                %method,
                url = %request.url,
                status = status.as_u16(),
                detail = %parse_error_detail(status, &body),
                "chat endpoint returned non-success status"
            );
        }

        Ok(TransportResponse {
            status: status.as_u16(),
            body,
        })
    }
}

impl ChatTransport for HttpTransport {
    async fn fetch_initial(&self, request: TransportRequest) -> TransportResult {
        self.execute(request).await
    }

    async fn send(&self, request: TransportRequest) -> TransportResult {
        self.execute(request).await
    }

    fn close(&self) {
        if write_unpoisoned(&self.http).take().is_some() {
            tracing::debug!("http client dropped");
        }
    }
}

fn read_unpoisoned<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_unpoisoned<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
