use async_trait::async_trait;
use tracing::debug;

use crate::controller::ErrorInfo;
use crate::model::{ self, AnalysisResult };

pub const ANALYZE_PATH: &str = "/api/analyze-ip";

/// Boundary to the aggregation service. The controller only knows this
/// trait, so tests can substitute scripted responders.
#[async_trait]
pub trait AnalyzeBackend: Send + Sync {
    async fn analyze(&self, ip: &str) -> Result<AnalysisResult, ErrorInfo>;
}

pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: String) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        HttpBackend { base_url, client: reqwest::Client::new() }
    }
}

#[async_trait]
impl AnalyzeBackend for HttpBackend {
    // single GET per call, no retry and no timeout: the call runs until the
    // transport reports an outcome, and a superseding submission simply
    // orphans it
    async fn analyze(&self, ip: &str) -> Result<AnalysisResult, ErrorInfo> {
        let url = self.base_url.clone() + ANALYZE_PATH;
        debug!("querying {} for {}", url, ip);
        let resp = self.client
            .get(&url)
            .query(&[("ip", ip)])
            .send().await
            .map_err(|e| ErrorInfo::network(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text().await
            .map_err(|e| ErrorInfo::network(e.to_string()))?;
        if !status.is_success() {
            return Err(ErrorInfo::server(status.as_u16(), &body));
        }
        model::parse_analysis(&body).map_err(ErrorInfo::parse)
    }
}

#[cfg(test)]
mod test {
    use tracing::debug;
    use tracing_test::traced_test;

    use super::*;
    use crate::controller::ErrorCause;
    use crate::model::RiskLevel;

    fn ip_matcher(ip: &str) -> mockito::Matcher {
        mockito::Matcher::UrlEncoded("ip".into(), ip.into())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 3)]
    #[traced_test]
    async fn test_successful_analysis() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", ANALYZE_PATH)
            .match_query(ip_matcher("8.8.8.8"))
            .with_status(200)
            .with_body(r#"{"ip":"8.8.8.8","risk_level":"High","confidence":0.87}"#)
            .create_async().await;

        let backend = HttpBackend::new(server.url());
        debug!("using url: {}", server.url());
        let res = backend.analyze("8.8.8.8").await.unwrap();
        assert_eq!(res.ip, "8.8.8.8");
        assert_eq!(res.risk_level, RiskLevel::High);
        assert_eq!(res.confidence, Some(0.87));
        assert!(logs_contain("querying"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 3)]
    async fn test_server_error_with_detail() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", ANALYZE_PATH)
            .match_query(ip_matcher("999.1.2.3"))
            .with_status(404)
            .with_body(r#"{"detail":"unknown IP format"}"#)
            .create_async().await;

        let backend = HttpBackend::new(server.url());
        let e = backend.analyze("999.1.2.3").await.unwrap_err();
        assert_eq!(e.cause, ErrorCause::ServerError);
        assert_eq!(e.message, "unknown IP format");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 3)]
    async fn test_server_error_with_unparseable_body() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", ANALYZE_PATH)
            .match_query(ip_matcher("8.8.8.8"))
            .with_status(500)
            .with_body("Internal Server Error")
            .create_async().await;

        let backend = HttpBackend::new(server.url());
        let e = backend.analyze("8.8.8.8").await.unwrap_err();
        assert_eq!(e.cause, ErrorCause::ServerError);
        assert_eq!(e.message, "Request failed with status 500");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 3)]
    async fn test_parse_failure_on_2xx() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", ANALYZE_PATH)
            .match_query(ip_matcher("8.8.8.8"))
            .with_status(200)
            .with_body("<html>definitely not json</html>")
            .create_async().await;

        let backend = HttpBackend::new(server.url());
        let e = backend.analyze("8.8.8.8").await.unwrap_err();
        assert_eq!(e.cause, ErrorCause::ParseFailure);

        // 2xx body missing the one required field is a parse failure too
        let _m2 = server
            .mock("GET", ANALYZE_PATH)
            .match_query(ip_matcher("7.7.7.7"))
            .with_status(200)
            .with_body(r#"{"risk_level":"Low"}"#)
            .create_async().await;
        let e = backend.analyze("7.7.7.7").await.unwrap_err();
        assert_eq!(e.cause, ErrorCause::ParseFailure);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 3)]
    async fn test_network_failure() {
        // nothing listens here
        let backend = HttpBackend::new("http://127.0.0.1:9".to_string());
        let e = backend.analyze("8.8.8.8").await.unwrap_err();
        assert_eq!(e.cause, ErrorCause::NetworkFailure);
        assert!(!e.message.is_empty());
    }
}
