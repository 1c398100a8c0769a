//! Artist endpoints.

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::Artist;

pub struct Artists<'a> {
    pub(crate) client: &'a ApiClient,
}

impl Artists<'_> {
    /// List all artists, optionally filtered by a search term.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Artist>> {
        match search {
            Some(term) => self.client.get("/api/artists", &[("search", term)]).await,
            None => self.client.get("/api/artists", &[]).await,
        }
    }

    pub async fn get(&self, id: &str) -> Result<Artist> {
        self.client.get(&format!("/api/artists/{id}"), &[]).await
    }
}
