use async_trait::async_trait;
use reqwest::{Method, Request, Response, Url};

/// Transport used to pull remote source files.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;

    /// Issues a plain GET for `url`.
    async fn get(&self, url: Url) -> reqwest::Result<Response> {
        self.execute(Request::new(Method::GET, url)).await
    }
}
