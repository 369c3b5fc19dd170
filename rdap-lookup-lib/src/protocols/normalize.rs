//! RDAP response normalization.
//!
//! Registries fill RDAP domain objects very differently: dates may lack a
//! zone, contacts hide in nested entities, vCard values come as strings or
//! arrays, status codes show up as phrases or EPP camelCase. Everything here
//! is a tolerant extraction over the raw JSON tree that yields `None` instead
//! of failing.

use crate::types::{RawRdapResponse, RegistrantInfo, RegistrarInfo, StandardizedRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde_json::Value;
use std::collections::VecDeque;

lazy_static::lazy_static! {
    /// Lowercase/digit followed by uppercase, as in `clientTransferProhibited`
    static ref CAMEL_BOUNDARY: Regex = Regex::new(r"([a-z0-9])([A-Z])").unwrap();
}

/// Map a raw RDAP domain object onto the standardized record.
///
/// This never fails: missing or malformed fields simply stay absent. The raw
/// document is copied into the record unchanged.
///
/// # Arguments
///
/// * `domain` - The queried domain (used as `domainName`)
/// * `raw` - The RDAP JSON returned by the registry
///
/// # Example
///
/// ```rust
/// use rdap_lookup_lib::normalize;
///
/// let raw = serde_json::json!({
///     "status": ["clientTransferProhibited", "client transfer prohibited"],
///     "nameservers": [{"ldhName": "NS1.EXAMPLE.COM"}]
/// });
/// let record = normalize("example.com", &raw);
/// assert_eq!(record.status, vec!["client transfer prohibited"]);
/// assert_eq!(record.nameservers, vec!["ns1.example.com"]);
/// ```
pub fn normalize(domain: &str, raw: &RawRdapResponse) -> StandardizedRecord {
    let dates = extract_dates(raw);

    StandardizedRecord {
        domain_name: domain.trim().trim_end_matches('.').to_lowercase(),
        created_at: dates.created,
        updated_at: dates.updated,
        expires_at: dates.expires,
        registrar: extract_registrar(raw),
        registrant: extract_registrant(raw),
        nameservers: extract_nameservers(raw),
        status: extract_status(raw),
        raw: raw.clone(),
    }
}

#[derive(Default)]
struct EventDates {
    created: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
    expires: Option<DateTime<Utc>>,
}

/// Scan `events`; the first parseable event for each field wins.
///
/// `last changed` and `last update of RDAP database` both fill `updated`.
fn extract_dates(raw: &Value) -> EventDates {
    let mut dates = EventDates::default();

    let Some(events) = raw.get("events").and_then(Value::as_array) else {
        return dates;
    };

    for event in events {
        let Some(action) = event.get("eventAction").and_then(Value::as_str) else {
            continue;
        };
        let Some(date) = event
            .get("eventDate")
            .and_then(Value::as_str)
            .and_then(parse_rdap_date)
        else {
            continue;
        };

        let slot = match action.trim().to_lowercase().as_str() {
            "registration" => &mut dates.created,
            "last changed" | "last update of rdap database" => &mut dates.updated,
            "expiration" => &mut dates.expires,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(date);
        }
    }

    dates
}

/// Parse an RDAP event date into UTC.
///
/// RFC 3339 is expected; zone-less datetimes and bare dates are read as UTC.
pub fn parse_rdap_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn extract_registrar(raw: &Value) -> Option<RegistrarInfo> {
    let entity = find_entity(raw, "registrar")?;

    let info = RegistrarInfo {
        name: vcard_property(entity, "fn")
            .or_else(|| vcard_property(entity, "org"))
            .or_else(|| string_field(entity, "name")),
        iana_id: iana_registrar_id(entity),
        url: vcard_property(entity, "url")
            .or_else(|| link_href(entity, "about"))
            .or_else(|| string_field(entity, "url")),
    };

    (!info.is_empty()).then_some(info)
}

fn extract_registrant(raw: &Value) -> Option<RegistrantInfo> {
    let entity = find_entity(raw, "registrant")?;

    let info = RegistrantInfo {
        name: vcard_property(entity, "fn"),
        organization: vcard_property(entity, "org"),
        email: vcard_property(entity, "email").map(|email| strip_mailto(&email)),
    };

    (!info.is_empty()).then_some(info)
}

fn strip_mailto(email: &str) -> String {
    match (email.get(..7), email.get(7..)) {
        (Some(scheme), Some(address)) if scheme.eq_ignore_ascii_case("mailto:") => {
            address.to_string()
        }
        _ => email.to_string(),
    }
}

fn extract_nameservers(raw: &Value) -> Vec<String> {
    let mut nameservers = Vec::new();

    if let Some(entries) = raw.get("nameservers").and_then(Value::as_array) {
        for entry in entries {
            if let Some(name) = entry.get("ldhName").and_then(Value::as_str) {
                let name = name.trim().trim_end_matches('.').to_lowercase();
                if !name.is_empty() {
                    push_unique(&mut nameservers, name);
                }
            }
        }
    }

    nameservers
}

fn extract_status(raw: &Value) -> Vec<String> {
    let mut statuses = Vec::new();

    if let Some(entries) = raw.get("status").and_then(Value::as_array) {
        for status in entries.iter().filter_map(Value::as_str) {
            if let Some(phrase) = normalize_status(status) {
                push_unique(&mut statuses, phrase);
            }
        }
    }

    statuses
}

/// Render a status token as a lowercase RDAP phrase.
///
/// `"client  transfer prohibited"` and `"clientTransferProhibited"` both
/// become `"client transfer prohibited"`.
pub fn normalize_status(token: &str) -> Option<String> {
    let collapsed = token.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }

    let phrase = if collapsed.contains(' ') {
        collapsed
    } else {
        CAMEL_BOUNDARY.replace_all(&collapsed, "$1 $2").into_owned()
    };

    Some(phrase.to_lowercase())
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}

/// Find the first entity carrying `role`.
///
/// Top-level entities are searched before nested ones.
fn find_entity<'a>(raw: &'a Value, role: &str) -> Option<&'a Value> {
    let mut queue: VecDeque<&Value> = VecDeque::new();
    queue.push_back(raw);

    while let Some(node) = queue.pop_front() {
        let Some(entities) = node.get("entities").and_then(Value::as_array) else {
            continue;
        };
        if let Some(entity) = entities.iter().find(|e| has_role(e, role)) {
            return Some(entity);
        }
        queue.extend(entities.iter());
    }

    None
}

fn has_role(entity: &Value, role: &str) -> bool {
    entity
        .get("roles")
        .and_then(Value::as_array)
        .map_or(false, |roles| {
            roles
                .iter()
                .filter_map(Value::as_str)
                .any(|r| r.trim().eq_ignore_ascii_case(role))
        })
}

/// Text of the first vCard property called `name`.
///
/// jCard properties look like `["fn", {}, "text", "Example Inc."]`; values
/// after the type may be several strings or a structured array, all joined
/// with single spaces.
fn vcard_property(entity: &Value, name: &str) -> Option<String> {
    let properties = entity
        .get("vcardArray")?
        .as_array()?
        .get(1)?
        .as_array()?;

    properties
        .iter()
        .filter_map(Value::as_array)
        .filter(|property| {
            property
                .first()
                .and_then(Value::as_str)
                .map_or(false, |n| n.eq_ignore_ascii_case(name))
        })
        .find_map(|property| {
            let mut parts = Vec::new();
            for value in property.iter().skip(3) {
                collect_text(value, &mut parts);
            }
            (!parts.is_empty()).then(|| parts.join(" "))
        })
}

fn collect_text(value: &Value, parts: &mut Vec<String>) {
    match value {
        Value::String(s) if !s.trim().is_empty() => parts.push(s.trim().to_string()),
        Value::Array(items) => {
            for item in items {
                collect_text(item, parts);
            }
        }
        _ => {}
    }
}

fn string_field(entity: &Value, field: &str) -> Option<String> {
    entity
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn link_href(entity: &Value, rel: &str) -> Option<String> {
    entity
        .get("links")?
        .as_array()?
        .iter()
        .filter(|link| {
            link.get("rel")
                .and_then(Value::as_str)
                .map_or(false, |r| r.eq_ignore_ascii_case(rel))
        })
        .find_map(|link| string_field(link, "href"))
}

/// IANA registrar ID from `publicIds`, else an all-digit handle.
fn iana_registrar_id(entity: &Value) -> Option<String> {
    let from_public_ids = entity
        .get("publicIds")
        .and_then(Value::as_array)
        .and_then(|ids| {
            ids.iter()
                .filter(|id| {
                    id.get("type")
                        .and_then(Value::as_str)
                        .map_or(false, |t| t.to_lowercase().contains("iana registrar id"))
                })
                .find_map(|id| match id.get("identifier")? {
                    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
        });

    from_public_ids.or_else(|| {
        string_field(entity, "handle").filter(|h| h.chars().all(|c| c.is_ascii_digit()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vcard(properties: Value) -> Value {
        json!(["vcard", properties])
    }

    #[test]
    fn test_sparse_input_yields_empty_record() {
        let raw = json!({});
        let record = normalize("Example.COM", &raw);
        assert_eq!(record.domain_name, "example.com");
        assert!(record.created_at.is_none());
        assert!(record.updated_at.is_none());
        assert!(record.expires_at.is_none());
        assert!(record.registrar.is_none());
        assert!(record.registrant.is_none());
        assert!(record.nameservers.is_empty());
        assert!(record.status.is_empty());
        assert_eq!(record.raw, raw);
    }

    #[test]
    fn test_garbled_fields_degrade_to_absent() {
        let raw = json!({
            "events": "not a list",
            "entities": [{"roles": "registrar"}, 42, {"roles": ["registrar"], "vcardArray": "x"}],
            "nameservers": [{"ldhName": 7}, "ns.example.com", {"ldhName": ""}],
            "status": [1, null, "  "]
        });
        let record = normalize("example.com", &raw);
        assert!(record.created_at.is_none());
        assert!(record.registrar.is_none());
        assert!(record.nameservers.is_empty());
        assert!(record.status.is_empty());
    }

    #[test]
    fn test_events_first_match_wins_and_converted_to_utc() {
        let raw = json!({
            "events": [
                {"eventAction": "registration", "eventDate": "1997-07-01T02:00:00+02:00"},
                {"eventAction": "registration", "eventDate": "2001-01-01T00:00:00Z"},
                {"eventAction": "expiration", "eventDate": "garbage"},
                {"eventAction": "Expiration", "eventDate": "2030-07-01T00:00:00Z"},
                {"eventAction": "last update of RDAP database", "eventDate": "2024-05-01T10:00:00Z"},
                {"eventAction": "last changed", "eventDate": "2024-01-15"}
            ]
        });
        let record = normalize("eib.org", &raw);
        assert_eq!(
            record.created_at,
            Some(Utc.with_ymd_and_hms(1997, 7, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            record.expires_at,
            Some(Utc.with_ymd_and_hms(2030, 7, 1, 0, 0, 0).unwrap())
        );
        // the database refresh comes first, so it wins over "last changed"
        assert_eq!(
            record.updated_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_database_update_used_without_last_changed() {
        let raw = json!({
            "events": [
                {"eventAction": "last update of RDAP database", "eventDate": "2024-05-01T10:00:00.123Z"}
            ]
        });
        let record = normalize("eib.org", &raw);
        assert_eq!(
            record.updated_at.map(|d| d.timestamp()),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap().timestamp())
        );
    }

    #[test]
    fn test_earliest_update_event_is_kept() {
        let raw = json!({
            "events": [
                {"eventAction": "last changed", "eventDate": "not a date"},
                {"eventAction": "last changed", "eventDate": "2020-01-15T00:00:00Z"},
                {"eventAction": "last update of RDAP database", "eventDate": "2024-05-01T00:00:00Z"}
            ]
        });
        let record = normalize("eib.org", &raw);
        assert_eq!(
            record.updated_at,
            Some(Utc.with_ymd_and_hms(2020, 1, 15, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_rdap_date_variants() {
        let expected = Utc.with_ymd_and_hms(2020, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(parse_rdap_date("2020-03-04T05:06:07Z"), Some(expected));
        assert_eq!(parse_rdap_date("2020-03-04T07:06:07+02:00"), Some(expected));
        assert_eq!(parse_rdap_date("2020-03-04T05:06:07"), Some(expected));
        assert_eq!(parse_rdap_date("2020-03-04 05:06:07"), Some(expected));
        assert!(parse_rdap_date("2020-03-04").is_some());
        assert!(parse_rdap_date("yesterday").is_none());
    }

    #[test]
    fn test_registrar_from_vcard_and_public_ids() {
        let raw = json!({
            "entities": [{
                "roles": ["registrar"],
                "handle": "MMR-1",
                "publicIds": [{"type": "IANA Registrar ID", "identifier": "292"}],
                "vcardArray": vcard(json!([
                    ["version", {}, "text", "4.0"],
                    ["fn", {}, "text", "MarkMonitor Inc."]
                ])),
                "links": [{"rel": "about", "href": "http://www.markmonitor.com"}]
            }]
        });
        let registrar = normalize("eib.org", &raw).registrar.unwrap();
        assert_eq!(registrar.name.as_deref(), Some("MarkMonitor Inc."));
        assert_eq!(registrar.iana_id.as_deref(), Some("292"));
        assert_eq!(registrar.url.as_deref(), Some("http://www.markmonitor.com"));
    }

    #[test]
    fn test_registrar_fallbacks() {
        let raw = json!({
            "entities": [{
                "roles": ["Registrar"],
                "handle": "1068",
                "name": "Example Registrar",
                "url": "https://registrar.example"
            }]
        });
        let registrar = normalize("a.org", &raw).registrar.unwrap();
        assert_eq!(registrar.name.as_deref(), Some("Example Registrar"));
        assert_eq!(registrar.iana_id.as_deref(), Some("1068"));
        assert_eq!(registrar.url.as_deref(), Some("https://registrar.example"));

        let raw = json!({
            "entities": [{
                "roles": ["registrar"],
                "publicIds": [{"type": "IANA Registrar ID", "identifier": 146}],
                "vcardArray": vcard(json!([["org", {}, "text", ["GoDaddy.com", "LLC"]]]))
            }]
        });
        let registrar = normalize("a.com", &raw).registrar.unwrap();
        assert_eq!(registrar.name.as_deref(), Some("GoDaddy.com LLC"));
        assert_eq!(registrar.iana_id.as_deref(), Some("146"));
        assert!(registrar.url.is_none());
    }

    #[test]
    fn test_empty_registrar_entity_is_absent() {
        let raw = json!({"entities": [{"roles": ["registrar"], "handle": "ABC-REG"}]});
        assert!(normalize("a.org", &raw).registrar.is_none());
    }

    #[test]
    fn test_registrant_nested_under_registrar() {
        let raw = json!({
            "entities": [{
                "roles": ["registrar"],
                "vcardArray": vcard(json!([["fn", {}, "text", "Registrar"]])),
                "entities": [{
                    "roles": ["registrant", "administrative"],
                    "vcardArray": vcard(json!([
                        ["fn", {}, "text", "Jane Doe"],
                        ["org", {}, "text", "European Investment Bank"],
                        ["email", {}, "text", "mailto:Jane@eib.org"]
                    ]))
                }]
            }]
        });
        let registrant = normalize("eib.org", &raw).registrant.unwrap();
        assert_eq!(registrant.name.as_deref(), Some("Jane Doe"));
        assert_eq!(registrant.organization.as_deref(), Some("European Investment Bank"));
        assert_eq!(registrant.email.as_deref(), Some("Jane@eib.org"));
    }

    #[test]
    fn test_top_level_entity_preferred_over_nested() {
        let raw = json!({
            "entities": [
                {
                    "roles": ["technical"],
                    "entities": [{
                        "roles": ["registrar"],
                        "vcardArray": vcard(json!([["fn", {}, "text", "Nested"]]))
                    }]
                },
                {
                    "roles": ["registrar"],
                    "vcardArray": vcard(json!([["fn", {}, "text", "Top"]]))
                }
            ]
        });
        let registrar = normalize("a.org", &raw).registrar.unwrap();
        assert_eq!(registrar.name.as_deref(), Some("Top"));
    }

    #[test]
    fn test_redacted_registrant_is_absent() {
        let raw = json!({
            "entities": [{
                "roles": ["registrant"],
                "vcardArray": vcard(json!([["version", {}, "text", "4.0"], ["fn", {}, "text", ""]]))
            }]
        });
        assert!(normalize("a.org", &raw).registrant.is_none());
    }

    #[test]
    fn test_nameservers_lowercased_and_deduplicated() {
        let raw = json!({
            "nameservers": [
                {"ldhName": "NS2.EIB.ORG."},
                {"ldhName": "ns1.eib.org"},
                {"ldhName": "ns2.eib.org"}
            ]
        });
        assert_eq!(
            normalize("eib.org", &raw).nameservers,
            vec!["ns2.eib.org", "ns1.eib.org"]
        );
    }

    #[test]
    fn test_status_normalized_and_deduplicated() {
        let raw = json!({
            "status": [
                "client  delete\tprohibited",
                "active",
                "clientDeleteProhibited",
                "ACTIVE",
                "serverHold",
                "client delete prohibited"
            ]
        });
        assert_eq!(
            normalize("a.org", &raw).status,
            vec!["client delete prohibited", "active", "server hold"]
        );
    }

    #[test]
    fn test_normalize_status() {
        assert_eq!(normalize_status("pendingDelete").as_deref(), Some("pending delete"));
        assert_eq!(normalize_status("ok").as_deref(), Some("ok"));
        assert_eq!(normalize_status("\t"), None);
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let raw = json!({
            "events": [{"eventAction": "registration", "eventDate": "2000-01-01T00:00:00Z"}],
            "status": ["active"],
            "nameservers": [{"ldhName": "ns.example.com"}]
        });
        let first = serde_json::to_vec(&normalize("example.com", &raw)).unwrap();
        let second = serde_json::to_vec(&normalize("example.com", &raw)).unwrap();
        assert_eq!(first, second);
    }
}
