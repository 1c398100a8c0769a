//! Album endpoints.

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::Album;

pub struct Albums<'a> {
    pub(crate) client: &'a ApiClient,
}

impl Albums<'_> {
    /// List all albums, optionally filtered by a search term.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Album>> {
        match search {
            Some(term) => self.client.get("/api/albums", &[("search", term)]).await,
            None => self.client.get("/api/albums", &[]).await,
        }
    }

    pub async fn get(&self, id: &str) -> Result<Album> {
        self.client.get(&format!("/api/albums/{id}"), &[]).await
    }

    pub async fn by_artist(&self, artist_id: &str) -> Result<Vec<Album>> {
        self.client
            .get(&format!("/api/albums/artist/{artist_id}"), &[])
            .await
    }
}
