//! HTTP clients used by the CLI.

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use std::sync::Arc;
use taxsync_engine::{
    HttpClient, HttpConfig, HttpMethod, HttpRequest, HttpResponse, LoopbackServer,
};
use taxsync_server::TaxService;

/// Blocking `reqwest` client with optional bearer-token auth.
pub struct ReqwestClient {
    client: Client,
    token: Option<String>,
}

impl ReqwestClient {
    /// Builds a client honoring the timeout and user agent of `config`.
    pub fn new(config: &HttpConfig, token: Option<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, token })
    }
}

impl HttpClient for ReqwestClient {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, String> {
        let method = match request.method {
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &request.url)
            .header(ACCEPT, "application/json");
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder.send().map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(|e| e.to_string())?;
        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

/// Routes loopback requests to an in-process reference service.
pub struct LocalService(pub Arc<TaxService>);

impl LoopbackServer for LocalService {
    fn handle(&self, method: HttpMethod, path: &str, body: Option<&[u8]>) -> HttpResponse {
        let response = self.0.handle(method.as_str(), path, body);
        HttpResponse::new(response.status, response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxsync_engine::LoopbackClient;

    #[test]
    fn reqwest_client_builds() {
        let config = HttpConfig::new("http://127.0.0.1:9").with_timeout(std::time::Duration::from_secs(1));
        assert!(ReqwestClient::new(&config, Some("secret".into())).is_ok());
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        let config = HttpConfig::new("http://127.0.0.1:9").with_timeout(std::time::Duration::from_secs(1));
        let client = ReqwestClient::new(&config, None).unwrap();
        let result = client.send(HttpRequest {
            method: HttpMethod::Delete,
            url: config.item_url("customers", "1"),
            body: None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn local_service_answers_loopback_requests() {
        let service = Arc::new(TaxService::default());
        let client = LoopbackClient::new(LocalService(Arc::clone(&service)));

        let response = client
            .send(HttpRequest {
                method: HttpMethod::Delete,
                url: "memory://taxsync/customers/1".into(),
                body: None,
            })
            .unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(service.request_count(), 1);
    }
}
