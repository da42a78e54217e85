#![warn(clippy::pedantic)]
#![allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::doc_markdown
)]
pub mod arena;
pub mod bodies;
pub mod config;
pub mod coords;
pub mod edit;
pub mod error;
pub mod host;
pub mod kepler;
pub mod lander;
pub mod misc;
pub mod queue;
pub mod si;
pub mod targets;
pub mod time;
pub mod vessel;
pub mod world;
