//! Markdown rendering of built claims.
//!
//! Behaviours render as a one-column table of their rules, each destination
//! tree flattened into indented Allow/Disallow lines. Types render as a
//! field/property table with the markdown of their behaviour appended.

use d3_domain::{Claim, Destination, Rule};
use serde_json::Value;
use tabled::{builder::Builder, settings::Style};

const INDENT: &str = "&emsp;";
const NVD_SEARCH: &str = "https://nvd.nist.gov/vuln/search/results?form_type=Advanced&results_type=overview&isCpeNameSearch=true&seach_type=all&query=";
const TYPE_FIELDS: [&str; 8] = [
    "id",
    "manufacturer",
    "manufacturerUri",
    "tags",
    "name",
    "cpe",
    "parents",
    "children",
];

/// Render the rules of a resolved behaviour claim
pub fn behaviour_markdown(claim: &Claim) -> Result<String, serde_json::Error> {
    let rules: Vec<Rule> = match claim.get("rules") {
        Some(rules) => serde_json::from_value(rules.clone())?,
        None => Vec::new(),
    };

    let mut builder = Builder::default();
    builder.push_record(["rules"]);
    for line in rule_lines(&rules) {
        builder.push_record([line]);
    }
    let mut table = builder.build();
    table.with(Style::markdown());
    Ok(table.to_string())
}

/// Flatten rules into markdown lines
///
/// Rules with neither a domain-name nor an address tree are left out.
pub fn rule_lines(rules: &[Rule]) -> Vec<String> {
    let mut lines = Vec::new();
    for rule in rules {
        let Some(ip4) = rule.matches.as_ref().and_then(|matches| matches.ip4.as_ref()) else {
            continue;
        };
        let dns = ip4.destination_dnsname.as_ref().map(destination_lines).unwrap_or_default();
        let ip = ip4.destination_ip4.as_ref().map(destination_lines).unwrap_or_default();
        if dns.is_empty() && ip.is_empty() {
            continue;
        }

        lines.push(format!("**{}**", rule.name));
        for (heading, destinations) in [("domain name", dns), ("ip address", ip)] {
            if destinations.is_empty() {
                continue;
            }
            lines.push(format!("**{}{}**", INDENT, heading));
            lines.extend(destinations.into_iter().map(|line| format!("{0}{0}{1}", INDENT, line)));
        }
    }
    lines
}

fn destination_lines(destination: &Destination) -> Vec<String> {
    destination
        .walk()
        .into_iter()
        .map(|(depth, node)| {
            let verdict = if node.is_allowed() { "Allow" } else { "Disallow" };
            format!("{}{} {}", INDENT.repeat(depth), verdict, node.addr)
        })
        .collect()
}

/// Render a resolved type claim, followed by its behaviour's markdown
pub fn type_markdown(claim: &Claim, behaviour: Option<&str>) -> String {
    let name = claim.name().unwrap_or(claim.id.as_str());
    let tags = claim.get("tags").map(plain).unwrap_or_default();
    let header = format!("Title: {}\nCategory: Type\nTags: {}\nSlug: {}\n\n", name, tags, claim.id);

    let mut builder = Builder::default();
    builder.push_record(["field", "property"]);
    for field in TYPE_FIELDS {
        let value = match (field, claim.get(field)) {
            (_, None) => String::new(),
            ("id", _) => claim.id.to_string(),
            ("cpe", Some(cpe)) => cpe_links(cpe),
            ("parents" | "children", Some(refs)) => claim_links(refs),
            (_, Some(value)) => plain(value),
        };
        builder.push_record([field.to_string(), value]);
    }
    let mut table = builder.build();
    table.with(Style::markdown());

    match behaviour {
        Some(behaviour) => format!("{}{}\n\n{}", header, table, behaviour),
        None => format!("{}{}", header, table),
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(plain).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

fn cpe_links(value: &Value) -> String {
    let link = |cpe: &str| format!("[{}]({}{})", cpe, NVD_SEARCH, cpe);
    match value {
        Value::String(cpe) => link(cpe),
        Value::Array(items) => items.iter().filter_map(Value::as_str).map(link).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

fn claim_links(value: &Value) -> String {
    let Value::Array(refs) = value else {
        return plain(value);
    };
    refs.iter()
        .filter_map(|reference| match reference {
            Value::String(id) => Some(id.as_str()),
            Value::Object(map) => map.get("id").and_then(Value::as_str),
            _ => None,
        })
        .map(|id| format!("[{0}](/{0}.html)", id))
        .collect::<Vec<_>>()
        .join(", ")
}
