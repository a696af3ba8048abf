use anyhow::{bail, Context, Result};
use protocol::{GraphSpec, RoadIR};
use std::path::Path;
use store::MAX_CITIES_CEILING;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormat {
    /// `V E` header, V city lines, E `Src Dst Weight` lines, optional source line
    Text,
    /// A serialized `GraphSpec`
    Json,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => InputFormat::Json,
            _ => InputFormat::Text,
        }
    }
}

pub fn load_graph_spec(path: &Path, format: Option<InputFormat>) -> Result<GraphSpec> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read graph file {:?}", path))?;
    let format = format.unwrap_or_else(|| InputFormat::from_path(path));

    let spec = match format {
        InputFormat::Text => parse_text(&content),
        InputFormat::Json => parse_json(&content),
    }
    .with_context(|| format!("failed to parse graph file {:?}", path))?;

    info!(
        "Loaded {} cities and {} roads from {:?}",
        spec.city_count(),
        spec.road_count(),
        path
    );
    Ok(spec)
}

pub fn parse_json(content: &str) -> Result<GraphSpec> {
    Ok(serde_json::from_str(content)?)
}

/// Parses the line-oriented format:
///
/// ```text
/// 3 2
/// Lyon
/// Paris
/// Nice
/// Lyon Paris 4
/// Paris Nice 9
/// Lyon
/// ```
///
/// Blank lines and lines starting with `#` are skipped. The last line, the
/// source city, may be left out.
pub fn parse_text(content: &str) -> Result<GraphSpec> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

    let (line_no, header) = lines
        .next()
        .context("missing header line '<cities> <roads>'")?;
    let (city_count, road_count) = parse_header(line_no, header)?;
    debug!("Header declares {} cities and {} roads", city_count, road_count);

    let mut cities = Vec::with_capacity(city_count.min(MAX_CITIES_CEILING));
    while cities.len() < city_count {
        let (_, name) = lines.next().with_context(|| {
            format!("expected {} city names, found {}", city_count, cities.len())
        })?;
        cities.push(name.to_string());
    }

    let mut roads = Vec::with_capacity(road_count.min(MAX_CITIES_CEILING));
    while roads.len() < road_count {
        let (line_no, line) = lines
            .next()
            .with_context(|| format!("expected {} roads, found {}", road_count, roads.len()))?;
        roads.push(parse_road(line_no, line)?);
    }

    let source = lines.next().map(|(_, line)| line.to_string());

    if let Some((line_no, extra)) = lines.next() {
        bail!("line {}: unexpected trailing input '{}'", line_no, extra);
    }

    Ok(GraphSpec {
        cities,
        roads,
        source,
    })
}

fn parse_header(line_no: usize, line: &str) -> Result<(usize, usize)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [cities, roads] = fields.as_slice() else {
        bail!("line {}: expected '<cities> <roads>', got '{}'", line_no, line);
    };

    let cities = cities
        .parse()
        .with_context(|| format!("line {}: invalid city count '{}'", line_no, cities))?;
    let roads = roads
        .parse()
        .with_context(|| format!("line {}: invalid road count '{}'", line_no, roads))?;
    Ok((cities, roads))
}

fn parse_road(line_no: usize, line: &str) -> Result<RoadIR> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [src, dst, weight] = fields.as_slice() else {
        bail!("line {}: expected 'SourceCity DestCity Distance', got '{}'", line_no, line);
    };

    let weight = weight
        .parse()
        .with_context(|| format!("line {}: invalid distance '{}'", line_no, weight))?;
    Ok(RoadIR::new(*src, *dst, weight))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text() {
        let spec = parse_text(
            "3 2\n\
             A\n\
             B\n\
             C\n\
             A B 1\n\
             B C -2\n\
             A\n",
        )
        .unwrap();

        assert_eq!(spec.cities, vec!["A", "B", "C"]);
        assert_eq!(spec.roads, vec![RoadIR::new("A", "B", 1), RoadIR::new("B", "C", -2)]);
        assert_eq!(spec.source.as_deref(), Some("A"));
    }

    #[test]
    fn test_parse_text_without_source() {
        let spec = parse_text("2 1\nX\nY\nX Y 3\n").unwrap();
        assert_eq!(spec.source, None);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let spec = parse_text(
            "# road network\n\n2 1\n  Lyon  \n\nParis\n# roads\nLyon   Paris   4\n",
        )
        .unwrap();

        assert_eq!(spec.cities, vec!["Lyon", "Paris"]);
        assert_eq!(spec.roads, vec![RoadIR::new("Lyon", "Paris", 4)]);
    }

    #[test]
    fn test_city_names_may_contain_spaces() {
        let spec = parse_text("2 1\nNew York\nBoston\nBoston Boston 1\nNew York\n").unwrap();
        assert_eq!(spec.cities[0], "New York");
        assert_eq!(spec.source.as_deref(), Some("New York"));
    }

    #[test]
    fn test_malformed_header() {
        let err = parse_text("3\nA\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));

        let err = parse_text("three 2\n").unwrap_err();
        assert!(err.to_string().contains("invalid city count"));

        let err = parse_text("-1 2\n").unwrap_err();
        assert!(err.to_string().contains("invalid city count"));

        assert!(parse_text("").is_err());
    }

    #[test]
    fn test_malformed_road() {
        let err = parse_text("2 1\nA\nB\nA B\n").unwrap_err();
        assert!(err.to_string().contains("line 4"));

        let err = parse_text("2 1\nA\nB\nA B far\n").unwrap_err();
        assert!(err.to_string().contains("invalid distance 'far'"));
    }

    #[test]
    fn test_missing_lines() {
        let err = parse_text("3 1\nA\nB\n").unwrap_err();
        assert!(err.to_string().contains("expected 3 city names, found 2"));

        let err = parse_text("2 2\nA\nB\nA B 1\n").unwrap_err();
        assert!(err.to_string().contains("expected 2 roads, found 1"));
    }

    #[test]
    fn test_trailing_input_rejected() {
        let err = parse_text("2 1\nA\nB\nA B 1\nA\nB\n").unwrap_err();
        assert!(err.to_string().contains("unexpected trailing input 'B'"));
    }

    #[test]
    fn test_zero_counts_parse_and_leave_validation_to_graph() {
        let spec = parse_text("0 0\n").unwrap();
        assert_eq!(spec.city_count(), 0);
        assert_eq!(spec.road_count(), 0);
    }

    #[test]
    fn test_parse_json() {
        let spec = parse_json(
            r#"{"cities": ["A", "B"], "roads": [{"src": "A", "dst": "B", "weight": 2}], "source": "A"}"#,
        )
        .unwrap();
        assert_eq!(spec.road_count(), 1);
        assert_eq!(spec.source.as_deref(), Some("A"));

        assert!(parse_json("{\"cities\": 3}").is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(InputFormat::from_path(Path::new("net.json")), InputFormat::Json);
        assert_eq!(InputFormat::from_path(Path::new("net.JSON")), InputFormat::Json);
        assert_eq!(InputFormat::from_path(Path::new("net.txt")), InputFormat::Text);
        assert_eq!(InputFormat::from_path(Path::new("net")), InputFormat::Text);
    }

    #[test]
    fn test_load_graph_spec_from_file() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("roads.txt");
        std::fs::write(&path, "2 1\nA\nB\nA B 7\n")?;

        let spec = load_graph_spec(&path, None)?;
        assert_eq!(spec.roads[0].weight, 7);

        let missing = load_graph_spec(&temp_dir.path().join("absent.txt"), None);
        assert!(missing.is_err());
        Ok(())
    }
}
