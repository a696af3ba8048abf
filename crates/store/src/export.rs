use protocol::{CityId, DistanceVector, EdgeRow, ResultRow};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, RouteError};
use crate::graph::RoadGraph;

pub const RESULTS_FILE: &str = "route_results.csv";
pub const EDGES_FILE: &str = "route_edges.csv";
pub const META_FILE: &str = "route_meta.txt";

/// Writes solved routes and the road list as flat files for downstream
/// tools (reporting, plotting).
pub struct RouteExporter {
    dir: PathBuf,
}

impl RouteExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        debug!("Exporting routes to {:?}", dir);
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `City,Distance` table, one row per city in id order.
    pub fn export_results(&self, graph: &RoadGraph, distances: &DistanceVector) -> Result<PathBuf> {
        let path = self.dir.join(RESULTS_FILE);
        write_results(File::create(&path)?, &result_rows(graph, distances))?;
        info!("Results saved to {:?}", path);
        Ok(path)
    }

    /// `Source,Destination,Weight` table in road input order.
    pub fn export_edges(&self, graph: &RoadGraph) -> Result<PathBuf> {
        let path = self.dir.join(EDGES_FILE);
        write_edges(File::create(&path)?, &edge_rows(graph))?;
        info!("Graph data saved to {:?}", path);
        Ok(path)
    }

    pub fn export_meta(&self, graph: &RoadGraph, source: CityId) -> Result<PathBuf> {
        let path = self.dir.join(META_FILE);
        let source_name = graph.city_name(source).unwrap_or_default();
        write_meta(BufWriter::new(File::create(&path)?), graph, source_name)?;
        Ok(path)
    }
}

pub fn result_rows(graph: &RoadGraph, distances: &DistanceVector) -> Vec<ResultRow> {
    graph
        .city_names()
        .zip(distances.as_slice())
        .map(|(city, distance)| ResultRow {
            city: city.to_string(),
            distance: *distance,
        })
        .collect()
}

pub fn edge_rows(graph: &RoadGraph) -> Vec<EdgeRow> {
    let names: Vec<&str> = graph.city_names().collect();
    graph
        .edges()
        .map(|edge| EdgeRow {
            source: names[edge.src].to_string(),
            destination: names[edge.dst].to_string(),
            weight: edge.weight,
        })
        .collect()
}

pub fn write_results<W: Write>(writer: W, rows: &[ResultRow]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_edges<W: Write>(writer: W, rows: &[EdgeRow]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Three lines: the city count, the source city, and every city name
/// separated by single spaces.
pub fn write_meta<W: Write>(mut writer: W, graph: &RoadGraph, source_name: &str) -> Result<()> {
    writeln!(writer, "{}", graph.city_count())?;
    writeln!(writer, "{}", source_name)?;
    write!(writer, "{}", graph.city_names().collect::<Vec<_>>().join(" "))?;
    writer.flush()?;
    Ok(())
}

pub fn load_results(path: &Path) -> Result<Vec<ResultRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<std::result::Result<Vec<ResultRow>, _>>()?;
    Ok(rows)
}

pub fn load_edges(path: &Path) -> Result<Vec<EdgeRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<std::result::Result<Vec<EdgeRow>, _>>()?;
    Ok(rows)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMeta {
    pub city_count: usize,
    pub source: String,
    pub cities: Vec<String>,
}

/// Reads a metadata file written by [`write_meta`].
pub fn load_meta(path: &Path) -> Result<RouteMeta> {
    let mut lines = BufReader::new(File::open(path)?).lines();
    let mut next_line = |line: usize| -> Result<String> {
        match lines.next().transpose()? {
            Some(content) => Ok(content),
            None => Err(RouteError::InvalidMeta {
                line,
                content: String::new(),
            }),
        }
    };

    let count_line = next_line(1)?;
    let city_count = count_line.trim().parse::<usize>().map_err(|_| RouteError::InvalidMeta {
        line: 1,
        content: count_line.clone(),
    })?;

    let source = next_line(2)?.trim().to_string();
    if source.is_empty() {
        return Err(RouteError::InvalidMeta { line: 2, content: source });
    }

    let cities = next_line(3)?.split_whitespace().map(str::to_string).collect();

    Ok(RouteMeta {
        city_count,
        source,
        cities,
    })
}
