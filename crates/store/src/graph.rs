use indexmap::IndexMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use protocol::{CityId, Edge, GraphSpec};
use tracing::{debug, info};

use crate::error::{Result, RouteError};

/// Default bound on the number of cities in one run.
pub const DEFAULT_MAX_CITIES: usize = 50;

/// No configuration may raise the city bound above this.
pub const MAX_CITIES_CEILING: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphLimits {
    pub max_cities: usize,
}

impl GraphLimits {
    pub fn new(max_cities: usize) -> Self {
        Self {
            max_cities: max_cities.min(MAX_CITIES_CEILING),
        }
    }
}

impl Default for GraphLimits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CITIES)
    }
}

/// Immutable road network: named cities and an ordered list of weighted
/// directed roads.
///
/// City ids are dense (`0..city_count()`) and match the petgraph node
/// indices. Roads keep their input order, which is the order relaxation
/// scans them in.
#[derive(Debug, Clone)]
pub struct RoadGraph {
    graph: DiGraph<String, i32>,
    city_to_node: IndexMap<String, NodeIndex>,
}

impl RoadGraph {
    /// Build a graph from city names (index order) and already-resolved roads.
    pub fn new(cities: Vec<String>, edges: Vec<Edge>, limits: &GraphLimits) -> Result<Self> {
        check_size(cities.len(), edges.len(), limits)?;
        let names = index_names(cities)?;

        // Validate road endpoints
        for (position, edge) in edges.iter().enumerate() {
            if edge.src >= names.len() || edge.dst >= names.len() {
                return Err(RouteError::EdgeOutOfRange {
                    road: position,
                    src: edge.src,
                    dst: edge.dst,
                    cities: names.len(),
                });
            }
        }

        Ok(Self::assemble(names, &edges))
    }

    /// Build a graph from a name-keyed description, resolving every road
    /// endpoint to a city id.
    pub fn from_spec(spec: &GraphSpec, limits: &GraphLimits) -> Result<Self> {
        check_size(spec.city_count(), spec.road_count(), limits)?;
        let names = index_names(spec.cities.clone())?;

        let resolve = |name: &str| {
            names
                .get_index_of(name)
                .ok_or_else(|| RouteError::UnknownCity(name.to_string()))
        };

        let edges = spec
            .roads
            .iter()
            .map(|road| Ok(Edge::new(resolve(&road.src)?, resolve(&road.dst)?, road.weight)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::assemble(names, &edges))
    }

    fn assemble(names: IndexMap<String, ()>, edges: &[Edge]) -> Self {
        let mut graph = DiGraph::with_capacity(names.len(), edges.len());
        let mut city_to_node = IndexMap::with_capacity(names.len());

        // Add all cities as nodes; node index == city id
        for (name, ()) in names {
            let node = graph.add_node(name.clone());
            city_to_node.insert(name, node);
        }

        // Add roads in input order, which is the relaxation order
        for edge in edges {
            graph.add_edge(NodeIndex::new(edge.src), NodeIndex::new(edge.dst), edge.weight);
        }

        info!(
            "Built road graph with {} cities and {} roads",
            graph.node_count(),
            graph.edge_count()
        );

        Self { graph, city_to_node }
    }

    pub fn city_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn road_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Roads in input order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.graph
            .edge_references()
            .map(|e| Edge::new(e.source().index(), e.target().index(), *e.weight()))
    }

    pub fn city_id(&self, name: &str) -> Option<CityId> {
        self.city_to_node.get(name).map(|node| node.index())
    }

    /// Like [`RoadGraph::city_id`] but reports a missing name as an error.
    pub fn resolve(&self, name: &str) -> Result<CityId> {
        let id = self
            .city_id(name)
            .ok_or_else(|| RouteError::UnknownCity(name.to_string()))?;
        debug!("Resolved city '{}' to #{}", name, id);
        Ok(id)
    }

    pub fn city_name(&self, city: CityId) -> Option<&str> {
        self.graph.node_weight(NodeIndex::new(city)).map(String::as_str)
    }

    pub fn city_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.city_to_node.keys().map(String::as_str)
    }

    pub fn contains_city(&self, city: CityId) -> bool {
        city < self.city_count()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            city_count: self.city_count(),
            road_count: self.road_count(),
            is_cyclic: petgraph::algo::is_cyclic_directed(&self.graph),
            negative_roads: self.graph.edge_weights().filter(|w| **w < 0).count(),
        }
    }
}

fn check_size(cities: usize, roads: usize, limits: &GraphLimits) -> Result<()> {
    if cities == 0 || roads == 0 {
        return Err(RouteError::InvalidGraphSize { cities, roads });
    }
    if cities > limits.max_cities {
        return Err(RouteError::TooManyCities {
            cities,
            max: limits.max_cities,
        });
    }
    Ok(())
}

fn index_names(cities: Vec<String>) -> Result<IndexMap<String, ()>> {
    let mut names = IndexMap::with_capacity(cities.len());
    for (position, name) in cities.into_iter().enumerate() {
        if name.trim().is_empty() {
            return Err(RouteError::EmptyCityName { position });
        }
        if names.contains_key(&name) {
            return Err(RouteError::DuplicateCity(name));
        }
        names.insert(name, ());
    }
    Ok(names)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStats {
    pub city_count: usize,
    pub road_count: usize,
    pub is_cyclic: bool,
    pub negative_roads: usize,
}
