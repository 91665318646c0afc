//! CLI command implementations.

mod ask;
mod config;
mod doctor;
mod languages;
mod list;
mod serve;
mod summarize;

pub use ask::run_ask;
pub use config::run_config;
pub use doctor::run_doctor;
pub use languages::run_languages;
pub use list::run_list;
pub use serve::run_serve;
pub use summarize::run_summarize;
