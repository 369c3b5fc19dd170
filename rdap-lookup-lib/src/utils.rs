//! Domain extraction and input helpers.
//!
//! This module turns whatever the user typed (a bare domain, a full URL, a
//! host with a port) into the normalized domain used for RDAP queries.

use crate::error::RdapLookupError;
use crate::types::ParsedDomain;
use reqwest::Url;
use std::fs;
use std::path::Path;

/// Maximum length of a domain name in presentation form.
const MAX_DOMAIN_LEN: usize = 253;

/// Maximum length of a single label.
const MAX_LABEL_LEN: usize = 63;

/// Extract the normalized domain and its TLD from user input.
///
/// Accepts bare domains (`example.com`), URLs (`https://www.example.com/path`)
/// and hosts carrying a port or path (`example.com:8443/x`). Only the host is
/// kept; a literal leading `www.` label is dropped, internationalized names
/// are converted to punycode and the result is lowercased.
///
/// # Errors
///
/// Returns `RdapLookupError::InvalidInput` when no domain with at least one
/// label in front of a TLD can be extracted.
///
/// # Examples
///
/// ```rust
/// use rdap_lookup_lib::extract_domain;
///
/// let parsed = extract_domain("https://www.Example.com/path").unwrap();
/// assert_eq!(parsed.domain, "example.com");
/// assert_eq!(parsed.tld, "com");
/// ```
pub fn extract_domain(input: &str) -> Result<ParsedDomain, RdapLookupError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(RdapLookupError::invalid_input(
            input,
            "Input cannot be empty",
        ));
    }

    let host = ascii_host(trimmed)?;
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let domain = host.strip_prefix("www.").unwrap_or(&host).to_string();

    validate_domain(&domain).map_err(|reason| RdapLookupError::invalid_input(input, reason))?;

    let tld = domain
        .rsplit('.')
        .next()
        .map(str::to_string)
        .ok_or_else(|| RdapLookupError::invalid_input(input, "No TLD found"))?;

    Ok(ParsedDomain { domain, tld })
}

/// Get the host component of the input in ASCII form.
fn ascii_host(input: &str) -> Result<String, RdapLookupError> {
    let candidate = if has_scheme(input) {
        input.to_string()
    } else {
        format!("http://{}", input)
    };

    let url = Url::parse(&candidate)
        .map_err(|e| RdapLookupError::invalid_input(input, format!("Not a valid domain or URL: {}", e)))?;

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| RdapLookupError::invalid_input(input, "URL has no host"))?;

    // Only http(s) hosts go through IDNA mapping in the URL parser
    if matches!(url.scheme(), "http" | "https") {
        return Ok(host.to_string());
    }

    Url::parse(&format!("http://{}", host))
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .ok_or_else(|| RdapLookupError::invalid_input(input, "URL host is not a domain name"))
}

/// True when `://` appears before any path, query or fragment delimiter.
fn has_scheme(input: &str) -> bool {
    let authority_end = input.find(['/', '?', '#']).unwrap_or(input.len());
    input.find("://").map_or(false, |i| i <= authority_end)
}

/// Check label structure of an already-lowercased ASCII domain.
fn validate_domain(domain: &str) -> Result<(), String> {
    if domain.is_empty() {
        return Err("No domain name found".to_string());
    }

    if domain.len() > MAX_DOMAIN_LEN {
        return Err(format!("Domain exceeds {} characters", MAX_DOMAIN_LEN));
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err("Domain must have at least one label before the TLD".to_string());
    }

    for label in &labels {
        if label.is_empty() {
            return Err("Domain contains an empty label".to_string());
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(format!("Label '{}' exceeds {} characters", label, MAX_LABEL_LEN));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(format!("Label '{}' cannot start or end with a hyphen", label));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(format!("Label '{}' contains invalid characters", label));
        }
    }

    // IPv4 literals look like domains; their last label is numeric
    if labels
        .last()
        .map_or(false, |tld| tld.chars().all(|c| c.is_ascii_digit()))
    {
        return Err("IP addresses are not domain names".to_string());
    }

    Ok(())
}

/// Parse a list of domains, one per line.
///
/// Blank lines and lines starting with `#` are skipped; trailing `# comments`
/// are removed.
pub fn parse_domain_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a domain list file (see [`parse_domain_list`]).
///
/// # Errors
///
/// `FileError` if the file cannot be read, `InvalidInput` if it lists no
/// domains at all.
pub fn read_domain_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>, RdapLookupError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| RdapLookupError::file_error(path.display().to_string(), e.to_string()))?;

    let domains = parse_domain_list(&content);
    if domains.is_empty() {
        return Err(RdapLookupError::invalid_input(
            path.display().to_string(),
            "file contains no domains",
        ));
    }

    Ok(domains)
}
