//! Geocoding and places-search client for school-local support lookups.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::ProviderError;
use crate::metrics;

/// Search radius around the campus, roughly 20 miles.
const SEARCH_RADIUS_M: f64 = 32187.0;

/// Venue types requested from the nearby search.
const NEARBY_VENUE_TYPES: &[&str] = &[
    "doctor",
    "psychologist",
    "psychiatrist",
    "hospital",
    "clinic",
    "university",
    "school",
];

/// Query used by the text-search fallback when the nearby search is empty.
const TEXT_SEARCH_QUERY: &str = "mental health OR counseling OR wellness center OR therapy";

/// Field mask sent to the places API.
const PLACES_FIELD_MASK: &str =
    "places.displayName,places.formattedAddress,places.googleMapsUri";

const MAX_RESULTS: u32 = 20;

/// One support resource shown to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportResource {
    /// Display name.
    pub name: String,
    /// Short description or street address.
    pub description: String,
    /// Link for more information, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl SupportResource {
    /// A resource without a link, used for placeholder entries.
    pub fn unlinked(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            url: None,
        }
    }
}

/// Outcome of a school-local lookup.
#[derive(Debug)]
pub enum LocalLookup {
    /// No API key was configured; lookups are disabled.
    Unconfigured,
    /// The school name could not be geocoded.
    SchoolNotFound,
    /// Venues near the campus, possibly empty after both searches.
    Venues(Vec<SupportResource>),
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    places: Vec<Place>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Place {
    display_name: Option<DisplayName>,
    formatted_address: Option<String>,
    google_maps_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DisplayName {
    text: Option<String>,
}

/// Client for the geocoding and places endpoints.
#[derive(Debug, Clone)]
pub struct PlacesProvider {
    http: reqwest::Client,
    geocode_url: String,
    nearby_url: String,
    text_url: String,
    api_key: Option<String>,
}

impl PlacesProvider {
    /// Build from configuration.
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.places_timeout_secs))
            .build()
            .expect("failed to create HTTP client");

        Self {
            http,
            geocode_url: config.geocode_url.clone(),
            nearby_url: config.places_nearby_url.clone(),
            text_url: config.places_text_url.clone(),
            api_key: config.google_places_api_key.clone(),
        }
    }

    /// Whether a real provider is behind this client.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Geocode the school, then search for health and counseling venues
    /// around it. Falls back to a text search when the typed nearby search
    /// comes back empty.
    #[instrument(skip(self))]
    pub async fn find_nearby_support(&self, school: &str) -> Result<LocalLookup, ProviderError> {
        let Some(api_key) = self.api_key.clone() else {
            debug!("places provider not configured, skipping local lookup");
            return Ok(LocalLookup::Unconfigured);
        };

        let start = Instant::now();

        let Some(location) = self.geocode(&api_key, school).await? else {
            return Ok(LocalLookup::SchoolNotFound);
        };

        let mut venues = self.search_nearby(&api_key, location).await?;
        if venues.is_empty() {
            debug!(school, "nearby search empty, trying text search");
            venues = self.search_text(&api_key, location).await?;
        }

        metrics::record_provider_latency("places", start);
        Ok(LocalLookup::Venues(venues))
    }

    async fn geocode(
        &self,
        api_key: &str,
        school: &str,
    ) -> Result<Option<LatLng>, ProviderError> {
        let address = format!("{school} university campus");
        let response = self
            .http
            .get(&self.geocode_url)
            .query(&[("address", address.as_str()), ("key", api_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let geocode: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(geocode
            .results
            .into_iter()
            .next()
            .map(|result| result.geometry.location))
    }

    async fn search_nearby(
        &self,
        api_key: &str,
        location: LatLng,
    ) -> Result<Vec<SupportResource>, ProviderError> {
        let payload = json!({
            "includedTypes": NEARBY_VENUE_TYPES,
            "maxResultCount": MAX_RESULTS,
            "rankPreference": "DISTANCE",
            "locationRestriction": {
                "circle": {
                    "center": { "latitude": location.lat, "longitude": location.lng },
                    "radius": SEARCH_RADIUS_M,
                }
            }
        });

        self.search_places(&self.nearby_url, api_key, payload).await
    }

    async fn search_text(
        &self,
        api_key: &str,
        location: LatLng,
    ) -> Result<Vec<SupportResource>, ProviderError> {
        let payload = json!({
            "textQuery": TEXT_SEARCH_QUERY,
            "maxResultCount": MAX_RESULTS,
            "locationBias": {
                "circle": {
                    "center": { "latitude": location.lat, "longitude": location.lng },
                    "radius": SEARCH_RADIUS_M,
                }
            }
        });

        self.search_places(&self.text_url, api_key, payload).await
    }

    async fn search_places(
        &self,
        url: &str,
        api_key: &str,
        payload: serde_json::Value,
    ) -> Result<Vec<SupportResource>, ProviderError> {
        let response = self
            .http
            .post(url)
            .header("X-Goog-Api-Key", api_key)
            .header("X-Goog-FieldMask", PLACES_FIELD_MASK)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let places: PlacesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(normalize_places(places.places))
    }
}

/// Flatten provider results to the client-facing resource shape.
///
/// Entries without a display name are dropped.
fn normalize_places(places: Vec<Place>) -> Vec<SupportResource> {
    places
        .into_iter()
        .filter_map(|place| {
            let name = place.display_name.and_then(|d| d.text)?;
            Some(SupportResource {
                name,
                description: place
                    .formatted_address
                    .unwrap_or_else(|| "Address not available".to_string()),
                url: Some(place.google_maps_uri.unwrap_or_else(|| "#".to_string())),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn unconfigured_provider_never_calls_out() {
        let config: Config = envy::from_iter::<_, Config>(std::iter::empty::<(String, String)>())
            .expect("empty env yields default config");
        let provider = PlacesProvider::new(&config);
        assert!(!provider.is_configured());

        let lookup = provider.find_nearby_support("Stanford").await.unwrap();
        assert!(matches!(lookup, LocalLookup::Unconfigured));
    }

    #[test]
    fn normalize_keeps_named_places_only() {
        let raw = r#"{
            "places": [
                {
                    "displayName": {"text": "Campus Counseling Center"},
                    "formattedAddress": "1 College Ave",
                    "googleMapsUri": "https://maps.example/ccc"
                },
                {"formattedAddress": "nameless venue"},
                {"displayName": {"text": "Walk-in Clinic"}}
            ]
        }"#;

        let response: PlacesResponse = serde_json::from_str(raw).unwrap();
        let resources = normalize_places(response.places);

        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].name, "Campus Counseling Center");
        assert_eq!(resources[0].description, "1 College Ave");
        assert_eq!(resources[0].url.as_deref(), Some("https://maps.example/ccc"));
        assert_eq!(resources[1].description, "Address not available");
        assert_eq!(resources[1].url.as_deref(), Some("#"));
    }

    #[test]
    fn geocode_response_parses_first_location() {
        let raw = r#"{"results":[{"geometry":{"location":{"lat":37.4,"lng":-122.1}}}]}"#;
        let response: GeocodeResponse = serde_json::from_str(raw).unwrap();
        let location = response.results[0].geometry.location;
        assert_eq!(location.lat, 37.4);
        assert_eq!(location.lng, -122.1);
    }
}
