use crate::core::models::CapturedResponse;
use crate::gateway::context::GatewayContext;

/// Body produced by an application: fragments in emission order. Each
/// fragment may be produced lazily and may fail.
pub type BodyChunks = Box<dyn Iterator<Item = anyhow::Result<Vec<u8>>> + Send>;

/// Synchronous gateway-interface application.
///
/// The application reads the request from `context`, reports its status line
/// and headers through [`CapturedResponse::start_response`], and returns the
/// body as a sequence of chunks.
pub trait Application: Send + Sync + 'static {
    fn call(
        &self,
        context: &mut GatewayContext,
        response: &mut CapturedResponse,
    ) -> anyhow::Result<BodyChunks>;
}

/// Application backed by a closure.
pub struct FnApplication<F>(F);

/// Wraps a closure as an [`Application`].
pub fn from_fn<F>(f: F) -> FnApplication<F>
where
    F: Fn(&mut GatewayContext, &mut CapturedResponse) -> anyhow::Result<BodyChunks>
        + Send
        + Sync
        + 'static,
{
    FnApplication(f)
}

impl<F> Application for FnApplication<F>
where
    F: Fn(&mut GatewayContext, &mut CapturedResponse) -> anyhow::Result<BodyChunks>
        + Send
        + Sync
        + 'static,
{
    fn call(
        &self,
        context: &mut GatewayContext,
        response: &mut CapturedResponse,
    ) -> anyhow::Result<BodyChunks> {
        (self.0)(context, response)
    }
}

/// Body made of already-produced chunks.
pub fn chunks<I>(parts: I) -> BodyChunks
where
    I: IntoIterator<Item = Vec<u8>>,
    I::IntoIter: Send + 'static,
{
    Box::new(parts.into_iter().map(Ok))
}

#[must_use]
pub fn empty_body() -> BodyChunks {
    Box::new(std::iter::empty())
}

/// Answers every request with the same plain-text body. Used as a health
/// check when no framework is wired in.
#[derive(Debug, Clone)]
pub struct PlainTextApplication {
    status: String,
    body: Vec<u8>,
}

impl PlainTextApplication {
    #[must_use]
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: "200 OK".to_string(),
            body: body.into(),
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }
}

impl Application for PlainTextApplication {
    fn call(
        &self,
        _context: &mut GatewayContext,
        response: &mut CapturedResponse,
    ) -> anyhow::Result<BodyChunks> {
        response.start_response(
            self.status.clone(),
            [
                ("Content-Type", "text/plain".to_string()),
                ("Content-Length", self.body.len().to_string()),
            ],
        );
        Ok(chunks([self.body.clone()]))
    }
}
