use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn routefinder(args: &[&str]) -> Result<Output> {
    let output = Command::new(env!("CARGO_BIN_EXE_routefinder"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()?;
    Ok(output)
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[test]
fn test_solve_writes_exports() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let out_dir = path_arg(temp_dir.path());
    let graph = path_arg(&fixture("chain.txt"));

    let output = routefinder(&["solve", "--graph", &graph, "--out-dir", &out_dir])?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    assert!(stdout.contains("Shortest Distances from A"));
    assert!(stdout.contains(&format!("{:<20} {:<10}", "C", "3")));

    let results = std::fs::read_to_string(temp_dir.path().join("route_results.csv"))?;
    assert_eq!(results, "City,Distance\nA,0\nB,1\nC,3\n");

    let edges = std::fs::read_to_string(temp_dir.path().join("route_edges.csv"))?;
    assert_eq!(edges, "Source,Destination,Weight\nA,B,1\nB,C,2\n");

    let meta = std::fs::read_to_string(temp_dir.path().join("route_meta.txt"))?;
    assert_eq!(meta, "3\nA\nA B C");
    Ok(())
}

#[test]
fn test_repeated_source_uses_cache() -> Result<()> {
    let graph = path_arg(&fixture("chain.txt"));

    let output = routefinder(&[
        "solve", "--graph", &graph, "--source", "A", "--source", "A", "--no-write", "--metrics",
    ])?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());

    assert_eq!(stdout.matches("Shortest Distances from A").count(), 2);
    assert_eq!(stdout.matches("Using cached results for A").count(), 1);
    assert!(stdout.contains("\"cache_hits\": 1"));
    assert!(stdout.contains("\"cache_misses\": 1"));
    Ok(())
}

#[test]
fn test_negative_cycle_is_not_a_failure() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let out_dir = path_arg(temp_dir.path());
    let graph = path_arg(&fixture("negative_cycle.txt"));

    let output = routefinder(&["solve", "--graph", &graph, "--out-dir", &out_dir])?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());

    assert!(stdout.contains("Negative weight cycle detected from A"));
    assert!(stdout.contains("Cannot compute shortest paths reliably."));
    assert!(!temp_dir.path().join("route_results.csv").exists());
    assert!(temp_dir.path().join("route_edges.csv").exists());
    Ok(())
}

#[test]
fn test_unknown_source_fails() -> Result<()> {
    let graph = path_arg(&fixture("chain.txt"));

    let output = routefinder(&["solve", "--graph", &graph, "--source", "Atlantis", "--no-write"])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("'Atlantis' not found in city list"));
    Ok(())
}

#[test]
fn test_route_to_target() -> Result<()> {
    let graph = path_arg(&fixture("cities.json"));

    let output = routefinder(&["solve", "--graph", &graph, "--to", "Nice", "--no-write"])?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());

    assert!(stdout.contains("Shortest Distances from Paris"));
    assert!(stdout.contains("Route to Nice: Paris -> Lyon -> Nice (distance 935)"));
    Ok(())
}

#[test]
fn test_city_limit_flag() -> Result<()> {
    let graph = path_arg(&fixture("cities.json"));

    let output = routefinder(&["stats", "--graph", &graph, "--max-cities", "3"])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("too many cities"));
    Ok(())
}

#[test]
fn test_stats() -> Result<()> {
    let graph = path_arg(&fixture("negative_cycle.txt"));

    let output = routefinder(&["stats", "--graph", &graph])?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());

    assert!(stdout.contains("Cities: 3"));
    assert!(stdout.contains("Negative roads: 2"));
    assert!(stdout.contains("Has cycles: Yes"));
    Ok(())
}
