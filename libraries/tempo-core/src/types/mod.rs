//! Domain types shared by the queue, the controller and the collaborators

mod ids;
mod track;

pub use ids::{AlbumId, ArtistId, TrackId};
pub use track::TrackRef;
