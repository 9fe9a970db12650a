//! Hierarchical map structures: nodes, layers, construction, and linkage.

mod builder;
mod layer;
mod linker;
mod node;

pub use builder::build_layers;
pub use layer::{abstraction_name, Layer};
pub use linker::link_layers;
pub use node::Node;
