//! Per-resource endpoint groups, accessed through
//! [`ApiClient`](crate::ApiClient) (e.g. `client.tracks().list(None)`).

mod albums;
mod artists;
mod playlists;
mod tracks;

pub use albums::Albums;
pub use artists::Artists;
pub use playlists::Playlists;
pub use tracks::Tracks;
