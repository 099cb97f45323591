use std::future::Future;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

tokio::task_local! {
    static CURRENT: RequestContext;
}

/// Per-request correlation data. Lives exactly as long as the request
/// future it is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: String,
}

impl RequestContext {
    /// Fresh context with an 8-character lowercase hex id.
    pub fn generate() -> Self {
        Self {
            request_id: format!("{:08x}", rand::random::<u32>()),
        }
    }

    /// Context of the request currently being handled, if any.
    pub fn current() -> Option<Self> {
        CURRENT.try_with(Clone::clone).ok()
    }

    /// Request id for log fields; `-` outside a request.
    pub fn current_id() -> String {
        Self::current()
            .map(|ctx| ctx.request_id)
            .unwrap_or_else(|| "-".to_string())
    }

    pub async fn scope<F: Future>(self, fut: F) -> F::Output {
        CURRENT.scope(self, fut).await
    }
}
