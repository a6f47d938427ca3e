use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;

use crate::query::value::DATETIME_FORMAT;
use crate::query::{Record, Value};

/// Listing attribute name and the dotted path it is read from in the API payload
pub const LISTING_FIELDS: &[(&str, &str)] = &[
    ("id", "booliId"),
    ("created", "created"),
    ("type", "objectType"),
    ("agency", "agent.name"),
    ("address", "location.address.streetAddress"),
    ("neighborhood", "location.namedAreas.namedArea"),
    ("city", "location.address.city"),
    ("municipality", "location.region.municipalityName"),
    ("county", "location.region.countyName"),
    ("rooms", "nRooms"),
    ("size", "areaLiving"),
    ("lot_size", "areaLot"),
    ("price", "priceForSale"),
    ("fee", "fees.fee.amount"),
    ("lat", "location.address.position.latitude"),
    ("lon", "location.address.position.longitude"),
    ("url", "listingUrl"),
    ("image_url", "images.image.url"),
];

/// A property listing from the Booli search API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub id: i64,
    pub created: NaiveDateTime,
    #[serde(rename = "type")]
    pub object_type: String,
    pub agency: String,
    pub address: String,
    pub neighborhood: Vec<String>,
    pub city: String,
    pub municipality: String,
    pub county: String,
    pub rooms: f64,
    pub size: f64,
    pub lot_size: f64,
    pub price: i64,
    pub fee: i64,
    pub lat: f64,
    pub lon: f64,
    pub url: String,
    pub image_url: Vec<String>,
    #[serde(skip_serializing)]
    pub raw_json: JsonValue,
}

impl Listing {
    /// Create a Listing from one element of the API's `listings` array.
    ///
    /// Numeric fields default to zero and text fields to the empty string
    /// when absent; `created` is required.
    pub fn from_booli_json(value: JsonValue) -> Result<Self> {
        let source = |attr: &str| {
            LISTING_FIELDS
                .iter()
                .find(|(name, _)| *name == attr)
                .map(|(_, path)| resolve_path(&value, path))
                .unwrap_or_default()
        };

        let created_text = text(&source("created"));
        let created = NaiveDateTime::parse_from_str(&created_text, DATETIME_FORMAT)
            .with_context(|| format!("Missing or invalid 'created' field: {:?}", created_text))?;

        let listing = Listing {
            id: integer(&source("id")).context("Invalid 'booliId' field")?,
            created,
            object_type: text(&source("type")),
            agency: text(&source("agency")),
            address: text(&source("address")),
            neighborhood: text_list(&source("neighborhood")),
            city: text(&source("city")),
            municipality: text(&source("municipality")),
            county: text(&source("county")),
            rooms: float(&source("rooms")).context("Invalid 'nRooms' field")?,
            size: float(&source("size")).context("Invalid 'areaLiving' field")?,
            lot_size: float(&source("lot_size")).context("Invalid 'areaLot' field")?,
            price: integer(&source("price")).context("Invalid 'priceForSale' field")?,
            fee: integer(&source("fee")).context("Invalid fee amount")?,
            lat: float(&source("lat")).context("Invalid latitude")?,
            lon: float(&source("lon")).context("Invalid longitude")?,
            url: text(&source("url")),
            image_url: text_list(&source("image_url")),
            raw_json: JsonValue::Null,
        };

        Ok(Listing {
            raw_json: value,
            ..listing
        })
    }

    /// Room count for display: `3` for whole numbers, `2.5` otherwise
    pub fn rooms_as_text(&self) -> String {
        if self.rooms.fract() == 0.0 {
            format!("{}", self.rooms as i64)
        } else {
            format!("{:.1}", self.rooms)
        }
    }
}

impl Record for Listing {
    fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "id" => Value::Int(self.id),
            "created" => Value::DateTime(self.created),
            "type" => Value::from(self.object_type.as_str()),
            "agency" => Value::from(self.agency.as_str()),
            "address" => Value::from(self.address.as_str()),
            "neighborhood" => Value::from(self.neighborhood.clone()),
            "city" => Value::from(self.city.as_str()),
            "municipality" => Value::from(self.municipality.as_str()),
            "county" => Value::from(self.county.as_str()),
            "rooms" => Value::Float(self.rooms),
            "rooms_as_text" => Value::Str(self.rooms_as_text()),
            "size" => Value::Float(self.size),
            "lot_size" => Value::Float(self.lot_size),
            "price" => Value::Int(self.price),
            "fee" => Value::Int(self.fee),
            "lat" => Value::Float(self.lat),
            "lon" => Value::Float(self.lon),
            "url" => Value::from(self.url.as_str()),
            "image_url" => Value::from(self.image_url.clone()),
            _ => return None,
        };
        Some(value)
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listing #{}", self.id)
    }
}

/// Follow a dotted path through nested objects. Arrays met along the way,
/// or at the end, are traversed element-wise.
fn resolve_path<'a>(value: &'a JsonValue, path: &str) -> Vec<&'a JsonValue> {
    let mut current = vec![value];
    for segment in path.split('.') {
        current = current
            .into_iter()
            .flat_map(|node| match node {
                JsonValue::Array(items) => items.iter().filter_map(|item| item.get(segment)).collect(),
                other => other.get(segment).into_iter().collect::<Vec<_>>(),
            })
            .collect();
    }

    current
        .into_iter()
        .flat_map(|node| match node {
            JsonValue::Array(items) => items.iter().collect(),
            other => vec![other],
        })
        .collect()
}

fn html_decode(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(html_decode(s)),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text(nodes: &[&JsonValue]) -> String {
    nodes
        .first()
        .and_then(|node| scalar_text(node))
        .unwrap_or_default()
}

fn text_list(nodes: &[&JsonValue]) -> Vec<String> {
    nodes.iter().filter_map(|node| scalar_text(node)).collect()
}

fn integer(nodes: &[&JsonValue]) -> Result<i64> {
    match nodes.first() {
        None | Some(JsonValue::Null) => Ok(0),
        Some(JsonValue::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| anyhow!("number {} out of range", n)),
        Some(JsonValue::String(s)) if s.trim().is_empty() => Ok(0),
        Some(JsonValue::String(s)) => s
            .trim()
            .parse()
            .with_context(|| format!("'{}' is not an integer", s)),
        Some(other) => Err(anyhow!("expected an integer, got {}", other)),
    }
}

fn float(nodes: &[&JsonValue]) -> Result<f64> {
    match nodes.first() {
        None | Some(JsonValue::Null) => Ok(0.0),
        Some(JsonValue::Number(n)) => n
            .as_f64()
            .ok_or_else(|| anyhow!("number {} out of range", n)),
        Some(JsonValue::String(s)) if s.trim().is_empty() => Ok(0.0),
        Some(JsonValue::String(s)) => s
            .trim()
            .parse()
            .with_context(|| format!("'{}' is not a number", s)),
        Some(other) => Err(anyhow!("expected a number, got {}", other)),
    }
}
