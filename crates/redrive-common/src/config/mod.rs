//! Configuration infrastructure shared across the workspace.

mod component_key;
mod loader;
mod path;
mod vars;

pub use component_key::ComponentKey;
pub use loader::{Mergeable, load_from_paths};
pub use path::{ConfigPath, ConfigSources, is_yaml_file};
pub use vars::{InterpolationResult, interpolate};
