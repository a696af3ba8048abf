use protocol::CityId;
use store::{GraphStats, NegativeCycle, RoadGraph, ShortestPaths};

const RULE_WIDTH: usize = 50;

fn city<'a>(graph: &'a RoadGraph, id: CityId) -> &'a str {
    graph.city_name(id).unwrap_or("?")
}

fn block(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Distance table for one source. `cached` marks results served from the
/// memo without recomputation.
pub fn render_distances(graph: &RoadGraph, paths: &ShortestPaths, cached: bool) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let source = city(graph, paths.source);
    let mut lines = Vec::new();

    if cached {
        lines.push(format!("\nUsing cached results for {}", source));
    }
    lines.push(format!("\n{}", heavy));
    lines.push(format!("Shortest Distances from {}", source));
    lines.push(heavy.clone());
    lines.push(format!("{:<20} {:<10}", "Destination", "Distance"));
    lines.push("-".repeat(RULE_WIDTH));
    for (id, distance) in paths.distances.iter() {
        lines.push(format!("{:<20} {:<10}", city(graph, id), distance.to_string()));
    }
    lines.push(heavy);
    block(lines)
}

pub fn render_route(graph: &RoadGraph, paths: &ShortestPaths, target: CityId) -> String {
    match (paths.path_to(target), paths.distance(target)) {
        (Some(path), Some(distance)) => {
            let stops: Vec<&str> = path.iter().map(|&id| city(graph, id)).collect();
            format!(
                "Route to {}: {} (distance {})",
                city(graph, target),
                stops.join(" -> "),
                distance
            )
        }
        _ => format!(
            "No route from {} to {}",
            city(graph, paths.source),
            city(graph, target)
        ),
    }
}

pub fn render_negative_cycle(graph: &RoadGraph, cycle: &NegativeCycle) -> String {
    let mut lines = vec![format!(
        "\nWARNING: Negative weight cycle detected from {}!",
        city(graph, cycle.from)
    )];
    if let Some(&first) = cycle.cycle.first() {
        let mut stops: Vec<&str> = cycle.cycle.iter().map(|&id| city(graph, id)).collect();
        stops.push(city(graph, first));
        lines.push(format!("Cycle: {}", stops.join(" -> ")));
    }
    lines.push("Cannot compute shortest paths reliably.".to_string());
    block(lines)
}

pub fn render_stats(stats: &GraphStats) -> String {
    block(vec![
        "Graph Statistics:".to_string(),
        format!("  Cities: {}", stats.city_count),
        format!("  Roads: {}", stats.road_count),
        format!("  Negative roads: {}", stats.negative_roads),
        format!("  Has cycles: {}", if stats.is_cyclic { "Yes" } else { "No" }),
    ])
}
