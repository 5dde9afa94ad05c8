//! Embedding platform boundary: surfaces, the player API, and load parameters.
//!
//! An embedded surface has no fine-grained seek call. Every position or
//! play-state change is applied by reloading it with fresh load parameters.

use url::Url;

use crate::core::time::Time;

/// Error type for embedding platform operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmbedError {
    #[error("Embedding API has not loaded")]
    ApiNotLoaded,
    #[error("Player construction failed: {0}")]
    ConstructFailed(String),
    #[error("Player instance already destroyed")]
    AlreadyDestroyed,
    #[error("Invalid embed host: {0}")]
    InvalidHost(#[from] url::ParseError),
    #[error("Embed host cannot carry a path: {0}")]
    OpaqueHost(String),
}

/// A visible embedded player surface (an iframe, in a browser host)
pub trait EmbedSurface {
    /// Replace the surface's content with `url`.
    fn load(&mut self, url: &Url);
    /// Blank the surface.
    fn unload(&mut self);
}

/// Request for a hidden player instance used to read metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub element_id: String,
    pub video_id: String,
}

/// Asynchronous notification from a probe instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeEvent {
    Ready { duration: Time },
    Error { code: i32 },
}

pub type ProbeCallback = Box<dyn FnMut(ProbeEvent) + Send>;

/// A live player instance created through the platform API
pub trait ProbeInstance {
    fn destroy(&mut self) -> Result<(), EmbedError>;
}

/// The externally loaded player API
pub trait EmbedPlatform {
    /// Start loading the API script. Called at most once per process.
    fn inject_api_script(&self);

    /// Whether the API script has finished loading.
    fn api_ready(&self) -> bool;

    /// Construct a player bound to `request.element_id`. `on_event` may be
    /// invoked at any later time, including after the instance was destroyed.
    fn create_player(
        &self,
        request: ProbeRequest,
        on_event: ProbeCallback,
    ) -> Result<Box<dyn ProbeInstance>, EmbedError>;
}

/// Load parameters for an embedded surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedParams {
    pub host: String,
    pub video_id: String,
    pub autoplay: bool,
    /// Whole seconds; the embed only accepts integer start positions
    pub start: u64,
    pub muted: bool,
    pub controls: bool,
}

impl EmbedParams {
    pub fn load_url(&self) -> Result<Url, EmbedError> {
        let mut url = Url::parse(&self.host)?;
        url.path_segments_mut()
            .map_err(|()| EmbedError::OpaqueHost(self.host.clone()))?
            .pop_if_empty()
            .extend(["embed", self.video_id.as_str()]);
        url.set_query(None);
        url.set_fragment(None);
        url.query_pairs_mut()
            .append_pair("autoplay", flag(self.autoplay))
            .append_pair("controls", flag(self.controls))
            .append_pair("mute", flag(self.muted))
            .append_pair("modestbranding", "1")
            .append_pair("rel", "0")
            .append_pair("showinfo", "0")
            .append_pair("iv_load_policy", "3")
            .append_pair("start", &self.start.to_string());
        Ok(url)
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}
