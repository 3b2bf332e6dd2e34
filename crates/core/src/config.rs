use std::path::Path;

use portal_handoff_protocol::Rect;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;
use crate::lifecycle::WriterProfile;
use crate::model::DocumentRole;

pub const DEFAULT_GUEST_PATH: &str = "/ttt";
pub const DEFAULT_HOST_ORIGIN: &str = "http://localhost:3000";

/// How the two documents are served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "kebab-case")]
pub enum Routing {
    /// One origin; the podcast lives at `guest_path`.
    SamePath,
    /// The podcast is served from its own port. Cross-origin, so the two
    /// pages can be promoted but cannot message each other.
    SeparatePorts { guest_port: u16 },
}

/// Static boxes the simulated pages are laid out with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub viewport_width: f64,
    /// The article's `#embed` container.
    pub embed_container: Rect,
    /// The podcast's hero image.
    pub hero: Rect,
    /// Width of the player's progress timeline.
    pub timeline_width: f64,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            viewport_width: 400.0,
            embed_container: Rect::new(20.0, 420.0, 360.0, 240.0),
            hero: Rect::new(0.0, 170.0, 400.0, 200.0),
            timeline_width: 300.0,
        }
    }
}

/// Demo settings, loadable from TOML. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Origin the article is served from, e.g. `http://localhost:3000`.
    pub host_origin: String,
    pub guest_path: String,
    pub routing: Routing,
    pub writer: WriterProfile,
    pub initial_track: String,
    pub layout: Layout,
    /// Complete activations as soon as they are requested. When off, the
    /// driver resolves or rejects them explicitly.
    pub auto_resolve: bool,
    /// Whether the embedding primitive exists. Without it the article
    /// shows an inline frame and a banner instead.
    pub portals_supported: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            host_origin: DEFAULT_HOST_ORIGIN.to_string(),
            guest_path: DEFAULT_GUEST_PATH.to_string(),
            routing: Routing::SamePath,
            writer: WriterProfile::default(),
            initial_track: "tata".to_string(),
            layout: Layout::default(),
            auto_resolve: true,
            portals_supported: true,
        }
    }
}

impl DemoConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.host_url()?;
        if !self.guest_path.starts_with('/') {
            return Err(ConfigError::InvalidPath(self.guest_path.clone()));
        }
        Ok(())
    }

    /// Apply the article's query contract: `?portalpath=/x` picks the
    /// podcast path on the same origin, `?portalport=N` serves it from
    /// another port. The host origin is taken from `url` itself.
    pub fn with_host_url(mut self, url: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(url)?;
        self.host_origin = url.origin().ascii_serialization();

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "portalpath" => {
                    self.guest_path = value.into_owned();
                }
                "portalport" => {
                    let guest_port = value
                        .parse::<u16>()
                        .map_err(|_| ConfigError::InvalidPort(value.clone().into_owned()))?;
                    self.routing = Routing::SeparatePorts { guest_port };
                }
                _ => {}
            }
        }
        self.validate()?;
        Ok(self)
    }

    /// Where the article itself is served.
    pub fn host_url(&self) -> Result<Url, ConfigError> {
        Ok(Url::parse(&self.host_origin)?.join("/")?)
    }

    /// Where the podcast page is served.
    pub fn guest_url(&self) -> Result<Url, ConfigError> {
        let mut base = self.host_url()?;
        if let Routing::SeparatePorts { guest_port } = self.routing {
            base.set_port(Some(guest_port))
                .map_err(|()| ConfigError::InvalidPort(guest_port.to_string()))?;
        }
        Ok(base.join(&self.guest_path)?)
    }

    /// Origin the article embeds from, as passed to the host's `populate`.
    pub fn embed_origin(&self) -> Result<Url, ConfigError> {
        let mut url = self.guest_url()?;
        url.set_path("/");
        Ok(url)
    }

    /// Static routes: `/` serves the article, the guest path the podcast.
    pub fn route(&self, url: &Url) -> Option<DocumentRole> {
        let guest = self.guest_url().ok()?;
        let host = self.host_url().ok()?;
        if url.origin() == guest.origin() && url.path() == guest.path() {
            return Some(DocumentRole::Podcast);
        }
        if url.origin() == host.origin() && url.path() == "/" {
            return Some(DocumentRole::Article);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_the_demo() {
        let config = DemoConfig::default();
        assert_eq!(
            config.host_url().map(String::from).ok().as_deref(),
            Some("http://localhost:3000/")
        );
        assert_eq!(config.guest_path, "/ttt");
        assert_eq!(config.routing, Routing::SamePath);
        assert_eq!(config.writer.name, "Yusuke Utsunomiya");
        assert_eq!(config.initial_track, "tata");
        assert!(config.auto_resolve);
    }

    #[test]
    fn guest_url_follows_routing() {
        let mut config = DemoConfig::default();
        assert_eq!(
            config.guest_url().map(String::from).ok().as_deref(),
            Some("http://localhost:3000/ttt")
        );
        config.routing = Routing::SeparatePorts { guest_port: 3001 };
        assert_eq!(
            config.guest_url().map(String::from).ok().as_deref(),
            Some("http://localhost:3001/ttt")
        );
    }

    #[test]
    fn query_contract_picks_path_and_port() {
        let config = DemoConfig::default().with_host_url("http://localhost:4000/?portalpath=/pod");
        let Ok(config) = config else {
            panic!("valid host url");
        };
        assert_eq!(config.guest_path, "/pod");
        assert_eq!(config.host_origin, "http://localhost:4000");

        let config = DemoConfig::default().with_host_url("http://localhost:3000/?portalport=3001");
        assert!(config.is_ok_and(|c| c.routing == Routing::SeparatePorts { guest_port: 3001 }));

        let config = DemoConfig::default().with_host_url("http://localhost:3000/?portalport=x");
        assert!(matches!(config, Err(ConfigError::InvalidPort(_))));
    }

    #[test]
    fn routes_resolve_documents() {
        let config = DemoConfig::default();
        let article = Url::parse("http://localhost:3000/").ok();
        let podcast = Url::parse("http://localhost:3000/ttt").ok();
        let other = Url::parse("http://localhost:3000/other").ok();
        assert_eq!(article.and_then(|u| config.route(&u)), Some(DocumentRole::Article));
        assert_eq!(podcast.and_then(|u| config.route(&u)), Some(DocumentRole::Podcast));
        assert_eq!(other.and_then(|u| config.route(&u)), None);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = DemoConfig::from_toml_str(
            r#"
            host_origin = "http://127.0.0.1:8080"
            initial_track = "ssr"
            auto_resolve = false

            [routing]
            variant = "separate-ports"
            guest_port = 8081

            [writer]
            name = "Ada"

            [layout]
            viewport_width = 800.0
            "#,
        );
        let Ok(config) = config else {
            panic!("config should parse");
        };
        assert_eq!(config.initial_track, "ssr");
        assert!(!config.auto_resolve);
        assert_eq!(config.writer.name, "Ada");
        assert_eq!(config.writer.photo_src, "/img/profile.png");
        assert_eq!(config.layout.viewport_width, 800.0);
        assert_eq!(config.layout.timeline_width, 300.0);
        assert_eq!(config.routing, Routing::SeparatePorts { guest_port: 8081 });
    }

    #[test]
    fn guest_path_must_be_absolute() {
        let config = DemoConfig::from_toml_str(r#"guest_path = "ttt""#);
        assert!(matches!(config, Err(ConfigError::InvalidPath(_))));
    }
}
