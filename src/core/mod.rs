pub mod config;
pub mod frequency;
pub mod history;
pub mod needs;
pub mod paths;
pub mod places;
pub mod taxonomy;
