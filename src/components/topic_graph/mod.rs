mod component;
mod error;
mod geometry;
mod interaction;
mod label;
mod message;
mod render;
mod simulation;
mod snapshot;
mod state;
mod types;

pub use component::TopicGraphCanvas;
pub use error::GraphError;
pub use message::OriginPolicy;
pub use state::LayoutStrategy;
pub use types::Graph;
