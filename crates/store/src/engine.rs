use protocol::{CityId, Distance, DistanceVector, Edge};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::ResultCache;
use crate::error::{NegativeCycle, Result, RouteError};
use crate::graph::RoadGraph;

/// Outcome of a cycle-free Bellman-Ford run from one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPaths {
    pub source: CityId,
    pub distances: DistanceVector,
    /// Previous city on a shortest path, `None` for the source and for
    /// unreached cities.
    pub predecessors: Vec<Option<CityId>>,
    /// Relaxation passes performed before convergence.
    pub passes: usize,
}

impl ShortestPaths {
    pub fn distance(&self, city: CityId) -> Option<Distance> {
        self.distances.get(city)
    }

    /// Cities on a shortest path from the source to `target`, both included.
    /// `None` if `target` is unreached or unknown.
    pub fn path_to(&self, target: CityId) -> Option<Vec<CityId>> {
        if !self.distance(target)?.is_reached() {
            return None;
        }

        let mut path = vec![target];
        let mut current = target;
        while current != self.source {
            current = self.predecessors.get(current).copied().flatten()?;
            if path.len() > self.predecessors.len() {
                return None;
            }
            path.push(current);
        }
        path.reverse();
        Some(path)
    }

    /// Edges of the shortest-path tree as `(predecessor, city)` pairs.
    pub fn tree_edges(&self) -> Vec<(CityId, CityId)> {
        self.predecessors
            .iter()
            .enumerate()
            .filter_map(|(city, pred)| pred.map(|p| (p, city)))
            .collect()
    }
}

/// Single-source Bellman-Ford over the graph's roads in input order.
///
/// Runs at most `V - 1` relaxation passes, stopping early after a pass that
/// changes nothing, then scans every road once more. Any road that still
/// improves a distance means a negative cycle is reachable from `source`.
///
/// `source` must be a city of `graph`.
pub fn bellman_ford(graph: &RoadGraph, source: CityId) -> std::result::Result<ShortestPaths, NegativeCycle> {
    let edges: Vec<Edge> = graph.edges().collect();
    let distances = DistanceVector::from_source(graph.city_count(), source);
    relax_from(source, &edges, distances)
}

fn relax_from(
    source: CityId,
    edges: &[Edge],
    mut distances: DistanceVector,
) -> std::result::Result<ShortestPaths, NegativeCycle> {
    let city_count = distances.len();
    let mut predecessors = vec![None; city_count];
    let mut passes = 0;

    // Relax every road until a pass changes nothing
    for pass in 1..city_count {
        passes = pass;
        let mut updated = false;
        for edge in edges {
            match relax(&mut distances, &mut predecessors, edge) {
                Relaxation::Improved => updated = true,
                Relaxation::Unchanged => {}
                Relaxation::Overflow => return Err(overflow_cycle(source, &predecessors, edge)),
            }
        }
        debug!("Pass {} from city #{}: updated={}", pass, source, updated);
        if !updated {
            break;
        }
    }

    // Extra scan: whatever still improves lies behind a negative cycle
    let mut last_improved = None;
    for edge in edges {
        match relax(&mut distances, &mut predecessors, edge) {
            Relaxation::Improved => last_improved = Some(edge.dst),
            Relaxation::Unchanged => {}
            Relaxation::Overflow => return Err(overflow_cycle(source, &predecessors, edge)),
        }
    }

    if let Some(city) = last_improved {
        let cycle = trace_cycle(&predecessors, city);
        return Err(NegativeCycle { from: source, cycle });
    }

    Ok(ShortestPaths {
        source,
        distances,
        predecessors,
        passes,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relaxation {
    Unchanged,
    Improved,
    /// `dist[src] + weight` left the `i64` range.
    Overflow,
}

fn relax(distances: &mut DistanceVector, predecessors: &mut [Option<CityId>], edge: &Edge) -> Relaxation {
    let from = match distances.get(edge.src) {
        Some(distance) if distance.is_reached() => distance,
        _ => return Relaxation::Unchanged,
    };

    let candidate = match from.extended_by(edge.weight) {
        Some(candidate) => candidate,
        None => return Relaxation::Overflow,
    };
    if distances.relax(edge.dst, candidate) {
        predecessors[edge.dst] = Some(edge.src);
        Relaxation::Improved
    } else {
        Relaxation::Unchanged
    }
}

/// Without a negative cycle every distance stays within `V * 2^31` of zero.
/// Leaving the `i64` range therefore means a negative cycle keeps lowering
/// `edge.src`, and it is reported as one.
fn overflow_cycle(source: CityId, predecessors: &[Option<CityId>], edge: &Edge) -> NegativeCycle {
    warn!(
        "Distance overflow on road #{} -> #{} from city #{}",
        edge.src, edge.dst, source
    );
    NegativeCycle {
        from: source,
        cycle: trace_cycle(predecessors, edge.src),
    }
}

/// Walks back `V` predecessors from a city improved during the extra scan,
/// which lands on a negative cycle, and returns that cycle in travel order.
fn trace_cycle(predecessors: &[Option<CityId>], start: CityId) -> Vec<CityId> {
    let city_count = predecessors.len();

    let mut anchor = start;
    for _ in 0..city_count {
        match predecessors[anchor] {
            Some(prev) => anchor = prev,
            None => return Vec::new(),
        }
    }

    let mut cycle = vec![anchor];
    let mut current = match predecessors[anchor] {
        Some(prev) => prev,
        None => return Vec::new(),
    };
    while current != anchor {
        if cycle.len() > city_count {
            return Vec::new();
        }
        cycle.push(current);
        current = match predecessors[current] {
            Some(prev) => prev,
            None => return Vec::new(),
        };
    }

    cycle.reverse();
    cycle.rotate_right(1);
    cycle
}

/// Counters describing the work an engine has done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub queries: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub relaxation_passes: usize,
    pub negative_cycles: usize,
}

/// Answers shortest-path queries against one graph, memoizing each
/// successfully solved source for the engine's lifetime.
#[derive(Debug)]
pub struct ShortestPathEngine {
    graph: RoadGraph,
    cache: ResultCache,
    queries: AtomicUsize,
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
    relaxation_passes: AtomicUsize,
    negative_cycles: AtomicUsize,
}

impl ShortestPathEngine {
    pub fn new(graph: RoadGraph) -> Self {
        Self {
            graph,
            cache: ResultCache::new(),
            queries: AtomicUsize::new(0),
            cache_hits: AtomicUsize::new(0),
            cache_misses: AtomicUsize::new(0),
            relaxation_passes: AtomicUsize::new(0),
            negative_cycles: AtomicUsize::new(0),
        }
    }

    pub fn graph(&self) -> &RoadGraph {
        &self.graph
    }

    pub fn shortest_paths_from(&self, source: CityId) -> Result<Arc<ShortestPaths>> {
        if !self.graph.contains_city(source) {
            return Err(RouteError::SourceOutOfRange {
                city: source,
                cities: self.graph.city_count(),
            });
        }
        self.queries.fetch_add(1, Ordering::Relaxed);
        let name = self.graph.city_name(source).unwrap_or_default();

        if let Some(paths) = self.cache.get(source) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            info!("Using cached results for {}", name);
            return Ok(paths);
        }
        self.cache_misses.fetch_add(1, Ordering::Relaxed);

        match bellman_ford(&self.graph, source) {
            Ok(paths) => {
                self.relaxation_passes.fetch_add(paths.passes, Ordering::Relaxed);
                info!(
                    "Solved shortest paths from {} in {} passes ({} of {} cities reached)",
                    name,
                    paths.passes,
                    paths.distances.reached_count(),
                    self.graph.city_count()
                );
                let paths = Arc::new(paths);
                self.cache.put(source, Arc::clone(&paths));
                Ok(paths)
            }
            Err(cycle) => {
                self.negative_cycles.fetch_add(1, Ordering::Relaxed);
                warn!("Negative weight cycle detected from {}", name);
                Err(cycle.into())
            }
        }
    }

    /// Resolves `name` first; an unknown name never reaches the algorithm.
    pub fn shortest_paths_from_city(&self, name: &str) -> Result<Arc<ShortestPaths>> {
        let source = self.graph.resolve(name)?;
        self.shortest_paths_from(source)
    }

    pub fn is_cached(&self, source: CityId) -> bool {
        self.cache.contains(source)
    }

    pub fn cached_sources(&self) -> usize {
        self.cache.len()
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            queries: self.queries.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            relaxation_passes: self.relaxation_passes.load(Ordering::Relaxed),
            negative_cycles: self.negative_cycles.load(Ordering::Relaxed),
        }
    }
}
