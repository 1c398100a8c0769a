//! Playlist endpoints.

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{Playlist, PlaylistDraft, PlaylistEntry};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddTrackBody<'a> {
    track_id: &'a str,
}

pub struct Playlists<'a> {
    pub(crate) client: &'a ApiClient,
}

impl Playlists<'_> {
    /// List the authenticated user's playlists.
    pub async fn list(&self) -> Result<Vec<Playlist>> {
        self.client.get("/api/playlists", &[]).await
    }

    pub async fn get(&self, id: &str) -> Result<Playlist> {
        self.client.get(&format!("/api/playlists/{id}"), &[]).await
    }

    pub async fn by_user(&self, user_id: &str) -> Result<Vec<Playlist>> {
        self.client
            .get(&format!("/api/playlists/user/{user_id}"), &[])
            .await
    }

    /// Tracks in playback order, with the time each was added.
    pub async fn tracks(&self, playlist_id: &str) -> Result<Vec<PlaylistEntry>> {
        self.client
            .get(&format!("/api/playlists/{playlist_id}/tracks"), &[])
            .await
    }

    pub async fn create(&self, draft: &PlaylistDraft) -> Result<Playlist> {
        self.client.post("/api/playlists", draft).await
    }

    pub async fn update(&self, id: &str, draft: &PlaylistDraft) -> Result<Playlist> {
        self.client
            .put(&format!("/api/playlists/{id}"), draft)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("/api/playlists/{id}")).await
    }

    pub async fn add_track(&self, playlist_id: &str, track_id: &str) -> Result<()> {
        self.client
            .post_unit(
                &format!("/api/playlists/{playlist_id}/tracks"),
                &AddTrackBody { track_id },
            )
            .await
    }

    pub async fn remove_track(&self, playlist_id: &str, track_id: &str) -> Result<()> {
        self.client
            .delete(&format!("/api/playlists/{playlist_id}/tracks/{track_id}"))
            .await
    }
}
