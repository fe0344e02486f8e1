//! Marker building and the filtering the map page applies in the browser.
//!
//! `filter_markers` is the reference for the page script's `filterSuppliers`:
//! both skip rows whose coordinates do not parse, match the search text as a
//! case-insensitive substring of the supplier name and, when a service is
//! selected, keep only the offerings with exactly that name.

use crate::domain::model::{MapMarker, ServiceOffering, SupplierRecord, WireNumber};
use std::collections::BTreeSet;

/// The marker for `record` with all of its offerings, or `None` when either
/// coordinate is missing or not a finite number.
pub fn build_marker(record: &SupplierRecord) -> Option<MapMarker> {
    let point = record.geo_point()?;
    Some(MapMarker {
        point,
        supplier_id: record.id.clone(),
        name: record.name.clone(),
        offerings: record.services.clone(),
    })
}

pub fn build_markers(records: &[SupplierRecord]) -> Vec<MapMarker> {
    let markers: Vec<MapMarker> = records.iter().filter_map(build_marker).collect();
    let skipped = records.len() - markers.len();
    if skipped > 0 {
        tracing::debug!("{} supplier(s) without usable coordinates", skipped);
    }
    markers
}

pub fn filter_markers(
    records: &[SupplierRecord],
    search_text: &str,
    selected_service: Option<&str>,
) -> Vec<MapMarker> {
    let needle = search_text.to_lowercase();
    let selected_service = selected_service.filter(|s| !s.is_empty());

    records
        .iter()
        .filter(|record| record.name.to_lowercase().contains(&needle))
        .filter_map(|record| {
            let mut marker = build_marker(record)?;
            if let Some(service) = selected_service {
                marker.offerings.retain(|offering| offering.service.as_deref() == Some(service));
                if marker.offerings.is_empty() {
                    return None;
                }
            }
            Some(marker)
        })
        .collect()
}

/// Sorted, duplicate-free names of every named offering across `records`.
pub fn distinct_service_names(records: &[SupplierRecord]) -> Vec<String> {
    records
        .iter()
        .flat_map(|record| record.services.iter())
        .filter_map(|offering| offering.service.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Brazilian real formatting with two decimals, `-` when the amount is absent.
pub fn format_amount(amount: Option<&WireNumber>) -> String {
    match amount {
        None => "-".to_string(),
        Some(value) => match value.as_finite_f64() {
            Some(n) => format!("{:.2}", n).replace('.', ","),
            None => match value {
                WireNumber::Text(text) => text.clone(),
                WireNumber::Number(n) => n.to_string(),
            },
        },
    }
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn offering_html(offering: &ServiceOffering) -> String {
    format!(
        "<div style=\"margin-bottom:4px;\"><b>{}</b><br>Pagar: R$ {} | Cobrar: R$ {}</div>",
        escape_html(offering.service.as_deref().unwrap_or_default()),
        escape_html(&format_amount(offering.amount_payable.as_ref())),
        escape_html(&format_amount(offering.amount_chargeable.as_ref())),
    )
}

impl MapMarker {
    /// Popup body; the page script builds the same markup.
    pub fn popup_html(&self) -> String {
        let offerings: String = self.offerings.iter().map(offering_html).collect();
        format!(
            "<div style='max-height:200px; overflow-y:auto; font-size:13px;'>\
             <b style='font-size:14px;'>{}</b><br><br>{}</div>",
            escape_html(&self.name),
            offerings
        )
    }
}
