//! Live collaboration graph: turns member/relationship snapshots into a
//! positioned, interactive canvas and exports it as an image.

mod camera;
mod component;
mod config;
mod edges;
mod export;
mod filter;
mod interaction;
mod pipeline;
mod render;
mod scene;
mod score;
mod state;
mod types;
mod view;

pub use component::{CollabGraphCanvas, GraphHandle};
pub use config::GraphConfig;
pub use edges::{RenderEdge, resolve};
pub use filter::{FilterQuery, departments, filter};
pub use interaction::PointerOutcome;
pub use score::{SCORE_BANDS, SizingMode, average_incoming_score};
pub use state::{GraphNode, GraphStore, NodeSpec, Placement};
pub use types::{Direction, Member, MemberId, Point, Relationship, TeamData};
pub use view::GraphView;
