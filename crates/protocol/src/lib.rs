use serde::{Deserialize, Serialize};

pub mod distance;
pub use distance::{Distance, DistanceVector, UNREACHED_MARKER};

/// Index of a city in `[0, V)`.
pub type CityId = usize;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("invalid distance '{0}': expected an integer or INF")]
    InvalidDistance(String),
}

/// A road between two resolved cities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Edge {
    pub src: CityId,
    pub dst: CityId,
    pub weight: i32,
}

impl Edge {
    pub fn new(src: CityId, dst: CityId, weight: i32) -> Self {
        Self { src, dst, weight }
    }
}

/// A road as the user describes it, by city name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoadIR {
    pub src: String,
    pub dst: String,
    pub weight: i32,
}

impl RoadIR {
    pub fn new(src: impl Into<String>, dst: impl Into<String>, weight: i32) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            weight,
        }
    }
}

/// Everything needed to build a road graph: city names in index order, the
/// roads in input order and, optionally, the city to query from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphSpec {
    pub cities: Vec<String>,
    pub roads: Vec<RoadIR>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl GraphSpec {
    pub fn city_count(&self) -> usize {
        self.cities.len()
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }
}

/// Row of the `City,Distance` results table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultRow {
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Distance")]
    pub distance: Distance,
}

/// Row of the `Source,Destination,Weight` edge table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EdgeRow {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Destination")]
    pub destination: String,
    #[serde(rename = "Weight")]
    pub weight: i32,
}
