//! The domain model of the event feed, and its validation boundary.
//!
//! The codec layer hands over bare JSON values; everything the rest of the
//! application touches has passed [`Event::from_value`]. Validation fails
//! closed: a record with missing or mistyped required fields is rejected as
//! a whole rather than passed along with holes in it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A parsed wire record failed validation against the event schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("unrecognized date format {0:?}")]
    Date(String),
}

/// How urgently an event should surface on the dashboard.
///
/// The live feed does not carry a severity, everything it sends is treated
/// as high until triaged.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    #[default]
    High,
}

/// Operational status of a facility.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FacilityStatus {
    Active,
    Inactive,
    #[default]
    Unknown,
}

/// The broad categories the dashboard groups facilities under.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FacilityKind {
    Facility,
    Economic,
    Infrastructure,
}

impl FacilityKind {
    /// Maps the feed's site types onto dashboard categories. Unrecognized
    /// types fall back to `Facility`.
    fn from_site_type(site_type: &str) -> Self {
        match site_type {
            "corporate_office" | "data_center" | "sustainability_site" => {
                FacilityKind::Infrastructure
            }
            "fulfillment_center" | "delivery_hub" | "retail_store" => FacilityKind::Economic,
            _ => FacilityKind::Facility,
        }
    }
}

/// A company site located near an event.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Facility {
    pub id: String,
    pub name: String,
    pub kind: FacilityKind,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub countries: Vec<String>,
    pub status: FacilityStatus,
}

/// A related prediction-market question attached to an event by the
/// enrichment endpoint.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Question {
    pub title: String,

    /// Market-implied probability, when the source carries one.
    #[serde(default)]
    pub p: Option<f64>,
}

/// One geolocated event, as consumed by the dashboard.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub date: DateTime<Utc>,
    pub severity: Severity,

    /// Whether this is a potential (forecast) event rather than an observed
    /// one. Potential events are candidates for question enrichment.
    pub possibility: bool,

    pub reasoning: Option<String>,
    pub location: Option<String>,
    pub kind: Option<String>,
    pub facilities: Vec<Facility>,

    /// Filled in by enrichment, never present on the wire.
    pub questions: Vec<Question>,
}

/// The record as the analysis service serializes it.
#[derive(Debug, Deserialize)]
struct WireEvent {
    id: String,
    event_name: String,
    blurb: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    severity: Severity,
    #[serde(default)]
    possibility: bool,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    infra: Vec<WireFacility>,
}

#[derive(Debug, Deserialize)]
struct WireFacility {
    id: String,
    name: String,
    #[serde(rename = "type")]
    site_type: String,
    #[serde(default)]
    description: Option<String>,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    countries: Countries,
    #[serde(default)]
    status: FacilityStatus,
}

/// The service sends either a single country code or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Countries {
    One(String),
    Many(Vec<String>),
}

impl Default for Countries {
    fn default() -> Self {
        Countries::Many(Vec::new())
    }
}

impl From<Countries> for Vec<String> {
    fn from(countries: Countries) -> Self {
        match countries {
            Countries::One(code) => vec![code],
            Countries::Many(codes) => codes,
        }
    }
}

impl From<WireFacility> for Facility {
    fn from(wire: WireFacility) -> Self {
        Facility {
            kind: FacilityKind::from_site_type(&wire.site_type),
            id: wire.id,
            name: wire.name,
            description: wire.description,
            latitude: wire.latitude,
            longitude: wire.longitude,
            countries: wire.countries.into(),
            status: wire.status,
        }
    }
}

impl Event {
    /// Validates one parsed wire record against the event schema.
    pub fn from_value(value: Value) -> Result<Event, SchemaError> {
        let wire = serde_json::from_value::<WireEvent>(value)?;

        // Events without a date sort as "just arrived".
        let date = match &wire.date {
            Some(text) => parse_date(text).ok_or_else(|| SchemaError::Date(text.clone()))?,
            None => Utc::now(),
        };

        Ok(Event {
            id: wire.id,
            title: wire.event_name,
            description: wire.blurb,
            latitude: wire.lat,
            longitude: wire.lon,
            date,
            severity: wire.severity,
            possibility: wire.possibility,
            reasoning: wire.reasoning,
            location: wire.location,
            kind: wire.kind,
            facilities: wire.infra.into_iter().map(Facility::from).collect(),
            questions: Vec::new(),
        })
    }
}

/// The service is not consistent about timestamps: most records carry a bare
/// date, older ones a space-separated datetime, and some sources RFC 3339.
fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(date.and_utc());
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn full_record() {
        let value = json!({
            "id": "ev-1",
            "event_name": "Port closure",
            "blurb": "Main container port closed for inspections",
            "lat": 1.26,
            "lon": 103.82,
            "date": "2024-03-05",
            "possibility": true,
            "reasoning": "recent filings",
            "location": "Singapore",
            "type": "regulatory",
            "region_codes": ["SG"],
            "infra": [{
                "id": "fac-7",
                "name": "Fulfillment center SIN-2",
                "type": "fulfillment_center",
                "description": "Regional fulfillment",
                "latitude": 1.29,
                "longitude": 103.85,
                "countries": "SG",
                "status": "active",
            }],
        });

        let event = Event::from_value(value).unwrap();
        assert_eq!(event.id, "ev-1");
        assert_eq!(event.title, "Port closure");
        assert_eq!(event.severity, Severity::High);
        assert_eq!(event.date, Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap());
        assert!(event.possibility);

        let facility = &event.facilities[0];
        assert_eq!(facility.kind, FacilityKind::Economic);
        assert_eq!(facility.countries, vec!["SG".to_string()]);
        assert_eq!(facility.status, FacilityStatus::Active);
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let value = json!({"id": "ev-2", "blurb": "no name"});
        assert!(matches!(
            Event::from_value(value),
            Err(SchemaError::Json(_))
        ));
    }

    #[test]
    fn mistyped_field_is_rejected() {
        let value = json!({
            "id": "ev-3",
            "event_name": "Strike",
            "blurb": "walkout",
            "lat": "not-a-number",
        });
        assert!(Event::from_value(value).is_err());
    }

    #[test]
    fn unrecognized_date_is_rejected() {
        let value = json!({
            "id": "ev-4",
            "event_name": "Strike",
            "blurb": "walkout",
            "date": "next tuesday",
        });
        assert!(matches!(
            Event::from_value(value),
            Err(SchemaError::Date(_))
        ));
    }

    #[test]
    fn date_formats() {
        for (text, want) in [
            ("2024-03-05", (2024, 3, 5, 0, 0, 0)),
            ("2024-03-05 13:30:00.0", (2024, 3, 5, 13, 30, 0)),
            ("2024-03-05T13:30:00Z", (2024, 3, 5, 13, 30, 0)),
        ] {
            let (y, mo, d, h, mi, s) = want;
            assert_eq!(
                parse_date(text).unwrap(),
                Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap(),
                "{text}"
            );
        }
    }

    #[test]
    fn missing_date_defaults_to_now() {
        let before = Utc::now();
        let event = Event::from_value(json!({
            "id": "ev-5",
            "event_name": "Strike",
            "blurb": "walkout",
        }))
        .unwrap();

        assert!(event.date >= before && event.date <= Utc::now());
    }

    #[test]
    fn facility_kind_mapping() {
        for (site_type, want) in [
            ("research_lab", FacilityKind::Facility),
            ("engineering_office", FacilityKind::Facility),
            ("corporate_office", FacilityKind::Infrastructure),
            ("data_center", FacilityKind::Infrastructure),
            ("sustainability_site", FacilityKind::Infrastructure),
            ("fulfillment_center", FacilityKind::Economic),
            ("delivery_hub", FacilityKind::Economic),
            ("retail_store", FacilityKind::Economic),
            ("lunar_base", FacilityKind::Facility),
        ] {
            assert_eq!(FacilityKind::from_site_type(site_type), want, "{site_type}");
        }
    }

    #[test]
    fn country_list_passes_through() {
        let value = json!({
            "id": "ev-6",
            "event_name": "Tariff change",
            "blurb": "new schedule",
            "infra": [{
                "id": "fac-1",
                "name": "ECS office",
                "type": "corporate_office",
                "latitude": 48.1,
                "longitude": 11.5,
                "countries": ["DE", "AT"],
            }],
        });

        let event = Event::from_value(value).unwrap();
        assert_eq!(
            event.facilities[0].countries,
            vec!["DE".to_string(), "AT".to_string()]
        );
        assert_eq!(event.facilities[0].status, FacilityStatus::Unknown);
    }
}
