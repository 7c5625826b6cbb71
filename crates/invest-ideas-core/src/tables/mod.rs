pub mod history;
pub mod presets;
pub mod schedule;
