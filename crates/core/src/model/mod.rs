pub mod catalog;
pub mod display_mode;
pub mod document;
pub mod embed;
pub mod playlist;
pub mod session;
pub mod surface;

pub use catalog::{Catalog, Track, TrackId};
pub use display_mode::DisplayMode;
pub use document::{DocumentContext, DocumentId, DocumentRole};
pub use embed::{EmbedHandle, EmbedSummary, PortalHandle};
pub use playlist::{PlaylistState, Removal};
pub use session::{Session, SessionSnapshot};
pub use surface::{ElementStyle, MountedFollow, Surface, TransitionEnd};
