mod component;
mod error;
mod interaction;
mod layout;
mod render;
mod scene;
mod scheduler;
mod state;
mod types;
mod viewport;

pub use component::SocialGraphCanvas;
pub use types::{NodeId, Scene, SceneEdge, SceneNode};
