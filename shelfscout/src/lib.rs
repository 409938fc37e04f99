#[path = "commands.rs"]
pub mod commands;
#[path = "handlers.rs"]
pub mod handlers;

pub use commands::command_argument_builder;
pub use handlers::{
    build_config, handle_discover, handle_scrape, init_logging, load_sites, path_arg,
    persistence_callback, scout_and_write,
};

// Re-export scout functionality from shelfscout-core
pub use shelfscout_core::scout::{ScoutOptions, SiteCompleteCallback, execute_scout};
pub use shelfscout_core::{generate_scout_report, write_results};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
