#![allow(non_snake_case)]

mod engine;
mod error;
mod loader;
mod midi_importer;
mod model;
mod player;
mod render;
mod util;

#[cfg(test)]
mod test_helpers;

pub use engine::*;
pub use error::*;
pub use loader::*;
pub use midi_importer::*;
pub use model::config::*;
pub use model::options::*;
pub use model::score::*;
pub use player::*;
pub use render::*;
pub use util::*;
