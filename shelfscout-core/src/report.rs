// Run summary for the terminal

use colored::Colorize;
use shelfscout_scanner::SiteResult;

const DIVIDER: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Errors listed per site before the rest are summarised as a count
pub const MAX_LISTED_ERRORS: usize = 5;

/// Generate a scout report from results
pub fn generate_scout_report(results: &[SiteResult]) -> String {
    let mut report = String::new();
    report.push_str(DIVIDER);
    report.push_str("\n\n# Summary:\n");
    report.push_str(&format!("  Sites scouted: {}\n", results.len()));

    let sitemaps: usize = results.iter().map(|r| r.sitemap_history.len()).sum();
    report.push_str(&format!("  Sitemaps fetched: {}\n", sitemaps));

    let product_sitemaps: usize = results.iter().map(|r| r.product_sitemaps.len()).sum();
    report.push_str(&format!("  Product sitemaps: {}\n", product_sitemaps));

    let product_urls: usize = results.iter().map(|r| r.product_urls.len()).sum();
    report.push_str(&format!("  Product URLs found: {}\n", product_urls));

    let products: usize = results.iter().map(|r| r.successful_products()).sum();
    report.push_str(&format!("  Products fetched: {}\n", products));

    let errors: usize = results.iter().map(|r| r.count_errors()).sum();
    report.push_str(&format!("  Errors: {}\n", errors));

    report.push('\n');
    report.push_str(DIVIDER);
    report.push_str("\n\n");

    for result in results {
        report.push_str(&site_section(result));
        report.push('\n');
    }

    report
}

fn site_section(result: &SiteResult) -> String {
    let mut section = format!("## {} ({})\n", result.brand, result.site_url);

    section.push_str(&format!(
        "  {} sitemaps fetched, {} product sitemaps\n",
        result.sitemap_history.len(),
        result.product_sitemaps.len()
    ));

    let found = result.product_urls.len();
    let fetched = result.successful_products();
    let attempted = result.products.len();
    let urls_line = format!("{} product URLs", found);
    section.push_str(&format!(
        "  {}",
        if found == 0 {
            urls_line.yellow().to_string()
        } else {
            urls_line.green().to_string()
        }
    ));
    if attempted > 0 {
        let fetched_line = format!("{}/{} products fetched", fetched, attempted);
        let colored_line = if fetched == attempted {
            fetched_line.green()
        } else {
            fetched_line.yellow()
        };
        section.push_str(&format!(", {}", colored_line));
    }
    section.push('\n');

    if result.errors.is_empty() {
        section.push_str(&format!("  {} no errors\n", "✓".green().bold()));
        return section;
    }

    section.push_str(&format!(
        "  {} {} errors\n",
        "✗".red().bold(),
        result.errors.len()
    ));
    for error in result.errors.iter().take(MAX_LISTED_ERRORS) {
        section.push_str(&format!("    {}\n", error.dimmed()));
    }
    if result.errors.len() > MAX_LISTED_ERRORS {
        section.push_str(&format!(
            "    ... and {} more\n",
            result.errors.len() - MAX_LISTED_ERRORS
        ));
    }

    section
}
