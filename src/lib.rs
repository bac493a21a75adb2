pub mod anchors;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod events;
pub mod focus;
pub mod geometry;
pub mod host;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod scene;
pub mod view;
pub mod viewport;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, ViewportConfig, load_config};
pub use error::{GraphError, Result};
pub use events::{EventLog, GraphEvent, GraphObserver, Observers};
pub use geometry::{ContentTransform, Rect, Vec2};
pub use host::{DefaultHost, ExternalAnchor, GraphHost};
pub use ir::{GraphSnapshot, LinkRecord, NodeKey, NodeKind, ObjectiveRecord, OutcomeRecord};
pub use layout::compute_layout;
pub use layout_dump::{SceneDump, layout_json};
pub use model::ModelSync;
pub use view::{GraphView, NodeGesture, PortKind};
