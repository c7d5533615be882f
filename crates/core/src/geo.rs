//! District / upazila reference data and coordinate resolution.
//!
//! The reference table is compiled into the binary and parsed once at
//! startup into a [`GeoReference`], which is then shared read-only.

use serde::{Deserialize, Serialize, Serializer};

use crate::error::CoreError;

/// Reference table bundled with the crate.
const EMBEDDED_REFERENCE: &str = include_str!("../data/geo_reference.json");

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A WGS84 point. Serialized as `[lng, lat]`, the GeoJSON order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Coordinates {
    pub lng: f64,
    pub lat: f64,
}

impl From<(f64, f64)> for Coordinates {
    fn from((lng, lat): (f64, f64)) -> Self {
        Self { lng, lat }
    }
}

impl From<Coordinates> for (f64, f64) {
    fn from(c: Coordinates) -> Self {
        (c.lng, c.lat)
    }
}

impl Coordinates {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(CoreError::Validation(format!(
                "location.coordinates: longitude {} is out of range",
                self.lng
            )));
        }
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(CoreError::Validation(format!(
                "location.coordinates: latitude {} is out of range",
                self.lat
            )));
        }
        Ok(())
    }

    /// Great-circle distance in kilometres (haversine).
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = (other.lat - self.lat).to_radians();
        let dlng = (other.lng - self.lng).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }

    /// Axis-aligned box that contains every point within `radius_km`.
    /// Used to prefilter with the spatial index before the exact distance cut.
    pub fn bounding_box(&self, radius_km: f64) -> BoundingBox {
        let dlat = (radius_km / EARTH_RADIUS_KM).to_degrees();
        let cos_lat = self.lat.to_radians().cos().abs().max(1e-6);
        let dlng = (dlat / cos_lat).min(180.0);
        BoundingBox {
            min: Coordinates::new((self.lng - dlng).max(-180.0), (self.lat - dlat).max(-90.0)),
            max: Coordinates::new((self.lng + dlng).min(180.0), (self.lat + dlat).min(90.0)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Coordinates,
    pub max: Coordinates,
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawReference {
    districts: Vec<RawDistrict>,
    upazilas: Vec<RawUpazila>,
}

#[derive(Debug, Deserialize)]
struct RawDistrict {
    id: u32,
    name: String,
    lat: String,
    lng: String,
}

#[derive(Debug, Deserialize)]
struct RawUpazila {
    district_id: u32,
    name: String,
    lat: Option<String>,
    lng: Option<String>,
}

#[derive(Debug, Clone)]
pub struct District {
    pub id: u32,
    pub name: String,
    pub center: Coordinates,
}

#[derive(Debug, Clone)]
pub struct Upazila {
    pub district_id: u32,
    pub name: String,
    /// Not every upazila has its own point; callers fall back to the district.
    pub center: Option<Coordinates>,
}

/// Result of [`GeoReference::resolve`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoResolution {
    /// Upazilas of the district, alphabetically.
    pub upazilas: Vec<String>,
    /// `[lng, lat]`, or `[]` when nothing could be resolved.
    #[serde(serialize_with = "serialize_optional_point")]
    pub coordinates: Option<Coordinates>,
}

impl GeoResolution {
    fn empty() -> Self {
        Self {
            upazilas: Vec::new(),
            coordinates: None,
        }
    }
}

fn serialize_optional_point<S: Serializer>(
    point: &Option<Coordinates>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match point {
        Some(c) => [c.lng, c.lat].serialize(serializer),
        None => <[f64; 0]>::default().serialize(serializer),
    }
}

#[derive(Debug, Clone)]
pub struct GeoReference {
    districts: Vec<District>,
    upazilas: Vec<Upazila>,
}

impl GeoReference {
    /// Parse the reference table compiled into the crate.
    pub fn embedded() -> Result<Self, CoreError> {
        Self::from_json(EMBEDDED_REFERENCE)
    }

    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let raw: RawReference = serde_json::from_str(json)
            .map_err(|e| CoreError::Internal(format!("invalid geo reference data: {e}")))?;

        let districts = raw
            .districts
            .into_iter()
            .map(|d| {
                let center = parse_point(&d.lng, &d.lat).ok_or_else(|| {
                    CoreError::Internal(format!("district '{}' has invalid coordinates", d.name))
                })?;
                Ok(District {
                    id: d.id,
                    name: d.name,
                    center,
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        let upazilas = raw
            .upazilas
            .into_iter()
            .map(|u| Upazila {
                district_id: u.district_id,
                center: match (u.lng.as_deref(), u.lat.as_deref()) {
                    (Some(lng), Some(lat)) => parse_point(lng, lat),
                    _ => None,
                },
                name: u.name,
            })
            .collect();

        Ok(Self {
            districts,
            upazilas,
        })
    }

    /// All district names, alphabetically.
    pub fn district_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.districts.iter().map(|d| d.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn find_district(&self, name: &str) -> Option<&District> {
        let name = name.trim();
        self.districts
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// Resolve a district (and optionally one of its upazilas) to the list of
    /// the district's upazilas and a representative point.
    ///
    /// The upazila's own point wins when it has one; otherwise the district
    /// center is used. Unknown or missing district gives an empty result.
    pub fn resolve(&self, district: Option<&str>, upazila: Option<&str>) -> GeoResolution {
        let Some(district) = district
            .filter(|d| !d.trim().is_empty())
            .and_then(|d| self.find_district(d))
        else {
            return GeoResolution::empty();
        };

        let in_district: Vec<&Upazila> = self
            .upazilas
            .iter()
            .filter(|u| u.district_id == district.id)
            .collect();

        let mut names: Vec<String> = in_district.iter().map(|u| u.name.clone()).collect();
        names.sort_by_key(|n| n.to_lowercase());

        let upazila_point = upazila
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .and_then(|wanted| {
                in_district
                    .iter()
                    .find(|u| u.name.eq_ignore_ascii_case(wanted))
            })
            .and_then(|u| u.center);

        GeoResolution {
            upazilas: names,
            coordinates: Some(upazila_point.unwrap_or(district.center)),
        }
    }
}

fn parse_point(lng: &str, lat: &str) -> Option<Coordinates> {
    let point = Coordinates::new(lng.trim().parse().ok()?, lat.trim().parse().ok()?);
    point.validate().ok().map(|()| point)
}
