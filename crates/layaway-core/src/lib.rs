pub mod error;
pub mod format;
pub mod listing;
pub mod point;
pub mod render;
pub mod series;
pub mod state;
