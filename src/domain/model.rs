use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Primary key of a supplier row. The view exposes it as an integer, but text
/// keys are accepted so a schema change does not break decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SupplierId {
    Int(i64),
    Text(String),
}

impl fmt::Display for SupplierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupplierId::Int(id) => write!(f, "{}", id),
            SupplierId::Text(id) => f.write_str(id),
        }
    }
}

/// A numeric field kept in its wire representation, so that re-serializing a
/// record reproduces what the database sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireNumber {
    Number(serde_json::Number),
    Text(String),
}

impl WireNumber {
    /// The finite value this field denotes, if any. Text is read like a
    /// browser's `parseFloat`: leading whitespace is skipped and the longest
    /// decimal prefix is used, so `"-23,5505"` reads as `-23`.
    pub fn as_finite_f64(&self) -> Option<f64> {
        let value = match self {
            WireNumber::Number(n) => n.as_f64()?,
            WireNumber::Text(s) => parse_float_prefix(s)?,
        };
        value.is_finite().then_some(value)
    }
}

/// Longest `[+-]digits[.digits][(e|E)[+-]digits]` prefix of `text` after
/// leading whitespace. At least one mantissa digit is required; an exponent
/// without digits is not consumed.
fn parse_float_prefix(text: &str) -> Option<f64> {
    let bytes = text.trim_start().as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    std::str::from_utf8(&bytes[..end]).ok()?.parse().ok()
}

impl From<&str> for WireNumber {
    fn from(value: &str) -> Self {
        WireNumber::Text(value.to_string())
    }
}

impl From<f64> for WireNumber {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(WireNumber::Number)
            .unwrap_or_else(|| WireNumber::Text(value.to_string()))
    }
}

impl From<i64> for WireNumber {
    fn from(value: i64) -> Self {
        WireNumber::Number(value.into())
    }
}

/// One entry of a supplier's `servicos` list. The name is optional because
/// aggregated views emit `{"servico": null}` for suppliers without services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOffering {
    #[serde(rename = "servico", default)]
    pub service: Option<String>,
    #[serde(rename = "valor_a_pagar", default)]
    pub amount_payable: Option<WireNumber>,
    #[serde(rename = "valor_a_cobrar", default)]
    pub amount_chargeable: Option<WireNumber>,
}

/// One row of the active-suppliers view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierRecord {
    #[serde(rename = "id_fornecedor")]
    pub id: SupplierId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "cidade", default)]
    pub city: Option<String>,
    #[serde(rename = "estado", default)]
    pub state: Option<String>,
    #[serde(rename = "endereco_latitude", default)]
    pub latitude: Option<WireNumber>,
    #[serde(rename = "endereco_longitude", default)]
    pub longitude: Option<WireNumber>,
    #[serde(rename = "servicos", default, deserialize_with = "null_as_empty")]
    pub services: Vec<ServiceOffering>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ServiceOffering>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ServiceOffering>>::deserialize(deserializer)?.unwrap_or_default())
}

impl SupplierRecord {
    /// Both coordinates as finite numbers, or `None` when either is missing
    /// or unparseable.
    pub fn geo_point(&self) -> Option<GeoPoint> {
        let lat = self.latitude.as_ref()?.as_finite_f64()?;
        let lng = self.longitude.as_ref()?.as_finite_f64()?;
        Some(GeoPoint { lat, lng })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A supplier placed on the map together with the offerings its popup lists.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub point: GeoPoint,
    pub supplier_id: SupplierId,
    pub name: String,
    pub offerings: Vec<ServiceOffering>,
}

/// Output of the transform stage.
#[derive(Debug, Clone)]
pub struct RenderedMap {
    pub html: String,
    pub record_count: usize,
    pub marker_count: usize,
    pub service_names: Vec<String>,
}

/// How a run ended without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Written { path: String, markers: usize },
    NoData,
}
