// Export our modules for use by the terminal and browser front-ends
pub mod api;
pub mod click;
pub mod domain;
pub mod load;
pub mod popup;
pub mod session;
pub mod viewport;

pub use api::{ApiConfig, ApiError, Endpoint, DEFAULT_API_BASE_URL};
pub use click::MapClickEvent;
pub use domain::{LatLng, SafeZone, Warehouse};
pub use load::{LoadState, MapData};
pub use popup::{CellBox, PopupContent};
pub use session::{MapCommand, MapGlyph, MapSession, Selection};
pub use viewport::{GeoBounds, TileCoord, Viewport};
