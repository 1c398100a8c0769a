//! Track endpoints.

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::Track;

pub struct Tracks<'a> {
    pub(crate) client: &'a ApiClient,
}

impl Tracks<'_> {
    /// List all tracks, optionally filtered by a search term.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Track>> {
        match search {
            Some(term) => self.client.get("/api/tracks", &[("search", term)]).await,
            None => self.client.get("/api/tracks", &[]).await,
        }
    }

    pub async fn get(&self, id: &str) -> Result<Track> {
        self.client.get(&format!("/api/tracks/{id}"), &[]).await
    }

    pub async fn by_album(&self, album_id: &str) -> Result<Vec<Track>> {
        self.client
            .get(&format!("/api/tracks/album/{album_id}"), &[])
            .await
    }

    pub async fn by_artist(&self, artist_id: &str) -> Result<Vec<Track>> {
        self.client
            .get(&format!("/api/tracks/artist/{artist_id}"), &[])
            .await
    }
}
