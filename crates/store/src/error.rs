use protocol::CityId;

/// A negative-weight cycle reachable from city `from`.
///
/// `cycle` lists the cities of one such cycle in travel order when a witness
/// could be traced, and is empty otherwise.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("negative weight cycle reachable from city #{from}{}", witness(.cycle))]
pub struct NegativeCycle {
    pub from: CityId,
    pub cycle: Vec<CityId>,
}

fn witness(cycle: &[CityId]) -> String {
    if cycle.is_empty() {
        return String::new();
    }
    let ids: Vec<String> = cycle.iter().map(|c| format!("#{}", c)).collect();
    format!(" ({})", ids.join(" -> "))
}

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("invalid graph size: {cities} cities and {roads} roads (both must be positive)")]
    InvalidGraphSize { cities: usize, roads: usize },

    #[error("too many cities: {cities} exceeds the maximum of {max}")]
    TooManyCities { cities: usize, max: usize },

    #[error("city #{position} has an empty name")]
    EmptyCityName { position: usize },

    #[error("duplicate city name '{0}'")]
    DuplicateCity(String),

    #[error("road #{road} ({src} -> {dst}) references a city outside 0..{cities}")]
    EdgeOutOfRange {
        road: usize,
        src: CityId,
        dst: CityId,
        cities: usize,
    },

    #[error("unknown city '{0}'")]
    UnknownCity(String),

    #[error("source city #{city} is outside 0..{cities}")]
    SourceOutOfRange { city: CityId, cities: usize },

    #[error(transparent)]
    NegativeCycle(#[from] NegativeCycle),

    #[error("invalid metadata line {line}: '{content}'")]
    InvalidMeta { line: usize, content: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl RouteError {
    /// Negative cycles are an expected query outcome rather than a fault.
    pub fn is_negative_cycle(&self) -> bool {
        matches!(self, RouteError::NegativeCycle(_))
    }

    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            RouteError::InvalidGraphSize { .. }
                | RouteError::TooManyCities { .. }
                | RouteError::EmptyCityName { .. }
                | RouteError::DuplicateCity(_)
                | RouteError::EdgeOutOfRange { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RouteError>;
