//! Listing normalizer
//!
//! Turns a raw [`ListingRecord`] into the canonical multi-line
//! description the index is built over. The dataset accumulated several
//! historical spellings for the same field ("Bed rooms" vs "Bedrooms"),
//! so every line resolves its value through an ordered alias list and
//! falls back to the `N/A` sentinel. Pure and deterministic: the same
//! record always yields the same description.

use crate::listings::ListingRecord;
use serde_json::Value;

/// Sentinel used when no alias of a field is present
pub const NA: &str = "N/A";

/// A canonical field with its alias priority list (first match wins)
struct FieldSpec {
    label: &'static str,
    aliases: &'static [&'static str],
}

/// One line of the canonical description, in render order
enum DescriptionLine {
    Field(FieldSpec),
    /// `Price: <currency><amount>` — currency prefix is empty when absent
    Price,
    /// `Contact: <phone> | Email: <email>`
    Contact,
}

use DescriptionLine::{Contact, Field, Price};

const DESCRIPTION_LINES: &[DescriptionLine] = &[
    Field(FieldSpec { label: "Real Estate", aliases: &["Real Estate Name"] }),
    Field(FieldSpec { label: "Community", aliases: &["Community"] }),
    Field(FieldSpec { label: "Home Name", aliases: &["Home Name", "Name"] }),
    Field(FieldSpec { label: "Status", aliases: &["Status"] }),
    Price,
    Field(FieldSpec { label: "Bed-category", aliases: &["bed-category"] }),
    Field(FieldSpec { label: "Bedrooms", aliases: &["Bed rooms", "Bedrooms"] }),
    Field(FieldSpec { label: "Bathrooms", aliases: &["Baths", "Bathrooms"] }),
    Field(FieldSpec { label: "Home Type", aliases: &["Home Type"] }),
    Field(FieldSpec { label: "Location", aliases: &["Location"] }),
    Field(FieldSpec { label: "Map", aliases: &["URL location address"] }),
    Field(FieldSpec { label: "Area", aliases: &["Area"] }),
    Field(FieldSpec { label: "Year Built", aliases: &["Year Built"] }),
    Field(FieldSpec { label: "Payment Plan", aliases: &["Payment Plan"] }),
    Field(FieldSpec { label: "Currency", aliases: &["Currency"] }),
    Field(FieldSpec { label: "Features", aliases: &["Features/Amenities", "Amenities"] }),
    Field(FieldSpec { label: "Infrastructure", aliases: &["Infrastructure"] }),
    Field(FieldSpec { label: "Photos", aliases: &["Photos"] }),
    Field(FieldSpec { label: "Video Tour", aliases: &["Videos"] }),
    Field(FieldSpec { label: "Website", aliases: &["Website URL"] }),
    Contact,
];

/// Build the canonical description for one listing record
pub fn normalize(record: &ListingRecord) -> String {
    let mut desc = String::new();

    for line in DESCRIPTION_LINES {
        match line {
            Field(spec) => {
                desc.push_str(&format!(
                    "{}: {}\n",
                    spec.label,
                    field_value(record, spec.aliases)
                ));
            }
            Price => {
                let currency = resolve(record, &["Currency"])
                    .and_then(render)
                    .unwrap_or_default();
                desc.push_str(&format!(
                    "Price: {}{}\n",
                    currency,
                    field_value(record, &["Price"])
                ));
            }
            Contact => {
                desc.push_str(&format!(
                    "Contact: {} | Email: {}\n",
                    field_value(record, &["Phone Number"]),
                    field_value(record, &["Email address"])
                ));
            }
        }
    }

    desc
}

/// Resolve a field through its alias list and render it, with the
/// `N/A` sentinel when no alias matches or the value has no textual form
pub fn field_value(record: &ListingRecord, aliases: &[&str]) -> String {
    resolve(record, aliases)
        .and_then(render)
        .unwrap_or_else(|| NA.to_string())
}

fn resolve<'a>(record: &'a ListingRecord, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|alias| record.get(*alias))
}

/// Textual form of a JSON value. Arrays join with `", "`; null, objects
/// and empty arrays have no textual form.
fn render(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(render).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Value::Null | Value::Object(_) => None,
    }
}
