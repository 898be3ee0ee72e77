pub mod presets;
pub mod selector;

pub use presets::PresetManager;
pub use selector::{RegionSelector, SelectorStep};
