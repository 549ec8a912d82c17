use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::foundation::error::{PosterError, PosterResult};
use crate::provider::tiles::{TileId, TileSource, UrlTemplate};

/// Raster tiles fetched over HTTP(S) from a `{z}/{x}/{y}` URL template.
#[derive(Debug, Clone)]
pub struct HttpTileSource {
    client: reqwest::Client,
    template: UrlTemplate,
}

impl HttpTileSource {
    pub fn new(template: UrlTemplate) -> PosterResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("posterforge/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| PosterError::configuration(format!("http client: {e}")))?;
        Ok(Self { client, template })
    }
}

#[async_trait]
impl TileSource for HttpTileSource {
    fn check_config(&self) -> PosterResult<()> {
        self.template.check()
    }

    async fn fetch(&self, tile: TileId) -> PosterResult<Option<Vec<u8>>> {
        let url = self.template.expand(tile)?;
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PosterError::provider(format!("GET tile {tile:?}: {e}")))?;

        match resp.status() {
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => Ok(None),
            s if s.is_success() => {
                let bytes = resp
                    .bytes()
                    .await
                    .map_err(|e| PosterError::provider(format!("tile body {tile:?}: {e}")))?;
                Ok(Some(bytes.to_vec()))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(PosterError::configuration(
                format!("tile server rejected credentials ({})", resp.status()),
            )),
            s if s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS => Err(
                PosterError::provider(format!("tile server returned {s} for {tile:?}")),
            ),
            s => Err(PosterError::validation(format!(
                "tile server returned {s} for {tile:?}"
            ))),
        }
    }
}
