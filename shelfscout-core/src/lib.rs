use colored::Colorize;

pub mod persist;
pub mod report;
pub mod scout;
pub mod sites;

pub use persist::{JsonlLog, write_results};
pub use report::generate_scout_report;
pub use scout::{ScoutOptions, SiteCompleteCallback, execute_scout, scout_site};
pub use sites::{expand_path, load_sites_from_file, parse_list_cell, parse_sites};

const BANNER: &str = r#"
     _          _  __                     _
 ___| |__   ___| |/ _|___  ___ ___  _   _| |_
/ __| '_ \ / _ \ | |_/ __|/ __/ _ \| | | | __|
\__ \ | | |  __/ |  _\__ \ (_| (_) | |_| | |_
|___/_| |_|\___|_|_| |___/\___\___/ \__,_|\__|
"#;

pub fn print_banner() {
    eprintln!("{}", BANNER.cyan().bold());
    eprintln!(
        "  {} v{}\n",
        "storefront sitemap scout".dimmed(),
        env!("CARGO_PKG_VERSION")
    );
}
