use crate::CLAP_STYLING;
use clap::{Arg, arg, command};

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("shelfscout")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("shelfscout")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(arg!(-v --"verbose" "Enable debug logging").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("scrape")
                .about(
                    "Walk each storefront's product sitemaps and fetch the structured data for \
                every product found.",
                )
                .args(io_args())
                .args(fetch_args())
                .arg(
                    arg!(--"product-url-output" <PATH>)
                        .required(false)
                        .help("JSONL file that receives the product URLs found for each site"),
                )
                .arg(
                    arg!(--"max-products" <COUNT>)
                        .required(false)
                        .help("Stop fetching products for a site after this many")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"extension" <SUFFIX>)
                        .required(false)
                        .help("Suffix appended to a product path to reach its JSON endpoint")
                        .default_value(".json"),
                ),
        )
        .subcommand(
            command!("discover")
                .about("Walk each storefront's sitemaps and record product URLs without fetching them.")
                .args(io_args())
                .args(fetch_args()),
        )
}

fn io_args() -> Vec<Arg> {
    vec![
        arg!(<SITES>)
            .required(true)
            .help("JSON file describing the sites to scout"),
        arg!(<OUTPUT>)
            .required(true)
            .help("Path of the JSON results file to write"),
        arg!(--"progress" <PATH>)
            .required(false)
            .help("JSONL file that receives a snapshot of each site as it finishes"),
        arg!(--"no-progress-bar")
            .required(false)
            .help("Disable the terminal progress bar")
            .action(clap::ArgAction::SetTrue),
        arg!(-w --"workers" <NUM_WORKERS>)
            .required(false)
            .help("Number of sites scouted concurrently")
            .value_parser(clap::value_parser!(usize))
            .default_value("4"),
        arg!(--"mode" <MODE>)
            .required(false)
            .help("Sitemap classification rules")
            .value_parser(["strict", "lenient"])
            .default_value("strict"),
    ]
}

fn fetch_args() -> Vec<Arg> {
    vec![
        arg!(--"delay" <SECONDS>)
            .required(false)
            .help("Delay between requests to the same host")
            .value_parser(clap::value_parser!(f64))
            .default_value("1.0"),
        arg!(--"retries" <COUNT>)
            .required(false)
            .help("Maximum attempts per URL")
            .value_parser(clap::value_parser!(u32))
            .default_value("3"),
        arg!(--"timeout" <SECONDS>)
            .required(false)
            .help("HTTP request timeout, at least one second")
            .value_parser(clap::value_parser!(u64).range(1..))
            .default_value("30"),
        arg!(--"retry-backoff" <FACTOR>)
            .required(false)
            .help("Exponential backoff factor between retries")
            .value_parser(clap::value_parser!(f64))
            .default_value("2.0"),
        arg!(--"user-agent" <AGENT>)
            .required(false)
            .help("User-Agent header sent with every request"),
    ]
}
