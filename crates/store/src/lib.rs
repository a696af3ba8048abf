//! Road network storage and shortest-path solving.
//!
//! [`RoadGraph`] holds an immutable set of cities and roads,
//! [`ShortestPathEngine`] answers single-source queries with Bellman-Ford and
//! memoizes each solved source in a [`ResultCache`], and [`RouteExporter`]
//! writes the results as flat files for other tools.

pub mod cache;
pub mod engine;
pub mod error;
pub mod export;
pub mod graph;

pub use cache::ResultCache;
pub use engine::{bellman_ford, EngineStats, ShortestPathEngine, ShortestPaths};
pub use error::{NegativeCycle, Result, RouteError};
pub use export::{RouteExporter, RouteMeta};
pub use graph::{GraphLimits, GraphStats, RoadGraph, DEFAULT_MAX_CITIES, MAX_CITIES_CEILING};
