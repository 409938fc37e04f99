// Tests for report generation functionality

use shelfscout_core::report::{MAX_LISTED_ERRORS, generate_scout_report};
use shelfscout_scanner::{ProductRecord, SiteResult, SiteTarget};
use serde_json::json;

fn plain() {
    colored::control::set_override(false);
}

fn finished_site() -> SiteResult {
    let target = SiteTarget::new("Acme", "https://acme.example", vec![]);
    let mut result = SiteResult::new(&target);
    result.sitemap_history.push("https://acme.example/sitemap_products_1.xml".to_string());
    result.add_product_sitemap("https://acme.example/sitemap_products_1.xml");
    result.add_product_url("https://acme.example/products/a");
    result.add_product_url("https://acme.example/products/b");
    result.add_product(ProductRecord::success(
        "https://acme.example/products/a".to_string(),
        "https://acme.example/products/a.json".to_string(),
        json!({"product": {}}),
    ));
    result.add_product(ProductRecord::failure(
        "https://acme.example/products/b".to_string(),
        Some("https://acme.example/products/b.json".to_string()),
        "Invalid JSON from https://acme.example/products/b.json: expected value".to_string(),
    ));
    result
}

#[test]
fn test_report_summary_totals() {
    plain();
    let empty = SiteResult::new(&SiteTarget::new("Globex", "https://globex.example", vec![]));
    let report = generate_scout_report(&[finished_site(), empty]);

    assert!(report.contains("Sites scouted: 2"));
    assert!(report.contains("Sitemaps fetched: 1"));
    assert!(report.contains("Product URLs found: 2"));
    assert!(report.contains("Products fetched: 1"));
    assert!(report.contains("Errors: 1"));
}

#[test]
fn test_report_site_sections() {
    plain();
    let empty = SiteResult::new(&SiteTarget::new("Globex", "https://globex.example", vec![]));
    let report = generate_scout_report(&[finished_site(), empty]);

    assert!(report.contains("## Acme (https://acme.example)"));
    assert!(report.contains("1/2 products fetched"));
    assert!(report.contains("Invalid JSON from https://acme.example/products/b.json"));
    assert!(report.contains("## Globex (https://globex.example)"));
    assert!(report.contains("0 product URLs"));
    assert!(report.contains("no errors"));

    let acme = report.find("## Acme").unwrap();
    let globex = report.find("## Globex").unwrap();
    assert!(acme < globex);
}

#[test]
fn test_report_truncates_long_error_lists() {
    plain();
    let mut result = SiteResult::new(&SiteTarget::new("Acme", "https://acme.example", vec![]));
    for i in 0..(MAX_LISTED_ERRORS + 3) {
        result.add_error(format!("Failed to fetch https://acme.example/s{}.xml: timeout", i));
    }
    let report = generate_scout_report(&[result]);

    assert!(report.contains("s0.xml"));
    assert!(!report.contains(&format!("s{}.xml", MAX_LISTED_ERRORS)));
    assert!(report.contains("... and 3 more"));
}

#[test]
fn test_report_empty_run() {
    plain();
    let report = generate_scout_report(&[]);
    assert!(report.contains("Sites scouted: 0"));
    assert!(!report.contains("##"));
}
