//! Site configuration composition
//!
//! Implements the 3-layer configuration merge:
//! 1. Shared preset defaults
//! 2. Computed URLs for the deployment mode
//! 3. Site override

mod compose;
mod defaults;
mod merge;
mod validate;

pub use compose::{
    load_layer_file, ComposeError, ConfigComposer, ConfigLayer, LayerOrigin, SiteConfiguration,
};
pub use defaults::{SharedDefaults, CLASSIC_PRESET};
pub use merge::{deep_merge, merge_layers, MergeError, MAX_MERGE_DEPTH};
pub use validate::{validate_config, ValidationError};
