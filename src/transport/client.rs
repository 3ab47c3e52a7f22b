use async_trait::async_trait;
use reqwest::{Request, Response};

/// Sends a fully-formed request and yields the server's response.
///
/// Implementations are layered: [`super::ApiKey`] wraps another `HttpClient`
/// and [`super::BasicClient`] sits at the bottom, talking to the network.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

#[async_trait]
impl<C: HttpClient + ?Sized> HttpClient for std::sync::Arc<C> {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        (**self).execute(req).await
    }
}
