//! Terminal diagnostics for the rdap-lookup CLI.
//!
//! Everything here writes to stderr so stdout carries nothing but JSON.
//! Uses only the `console` crate.

use console::{pad_str, style, Alignment};
use rdap_lookup_lib::{BatchResult, RdapLookupError};

/// Print a fatal error.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), message);
}

/// Print a one-line note per failed batch entry, then a count.
pub fn print_batch_failures(results: &[BatchResult]) {
    let failures: Vec<(&str, &RdapLookupError)> = results
        .iter()
        .filter_map(|r| r.result.as_ref().err().map(|e| (r.input.as_str(), e)))
        .collect();

    if failures.is_empty() {
        return;
    }

    for (input, error) in &failures {
        eprintln!(
            "  {}  {}  {}",
            style(pad_str(input, 30, Alignment::Left, Some(".."))).white(),
            style(error.kind()).yellow(),
            style(error).dim(),
        );
    }

    eprintln!(
        "{} {} of {} lookups failed",
        style("Warning:").yellow().bold(),
        failures.len(),
        results.len(),
    );
}
