use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use store::EngineStats;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize)]
pub struct RunMetrics {
    pub total_duration: Duration,
    pub phase_durations: HashMap<String, Duration>,
    pub city_count: usize,
    pub road_count: usize,
    pub exported_files: usize,
    pub engine: EngineStats,
}

#[derive(Debug)]
pub struct MetricsCollector {
    start_time: Instant,
    phase_timers: HashMap<String, Instant>,
    phase_durations: HashMap<String, Duration>,
    city_count: usize,
    road_count: usize,
    exported_files: usize,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            phase_timers: HashMap::new(),
            phase_durations: HashMap::new(),
            city_count: 0,
            road_count: 0,
            exported_files: 0,
        }
    }

    pub fn start_phase(&mut self, phase: &str) {
        debug!("Starting phase: {}", phase);
        self.phase_timers.insert(phase.to_string(), Instant::now());
    }

    pub fn end_phase(&mut self, phase: &str) {
        if let Some(start_time) = self.phase_timers.remove(phase) {
            let duration = start_time.elapsed();
            *self.phase_durations.entry(phase.to_string()).or_default() += duration;
            debug!("Phase {} completed in {:?}", phase, duration);
        }
    }

    pub fn record_graph(&mut self, city_count: usize, road_count: usize) {
        self.city_count = city_count;
        self.road_count = road_count;
    }

    pub fn record_export(&mut self) {
        self.exported_files += 1;
    }

    pub fn finalize(self, engine: EngineStats) -> RunMetrics {
        let metrics = RunMetrics {
            total_duration: self.start_time.elapsed(),
            phase_durations: self.phase_durations,
            city_count: self.city_count,
            road_count: self.road_count,
            exported_files: self.exported_files,
            engine,
        };

        Self::log_metrics(&metrics);
        metrics
    }

    fn log_metrics(metrics: &RunMetrics) {
        info!("Run summary:");
        info!("  Total duration: {:?}", metrics.total_duration);
        for (phase, duration) in &metrics.phase_durations {
            info!("    {}: {:?}", phase, duration);
        }
        info!("  Graph: {} cities, {} roads", metrics.city_count, metrics.road_count);
        info!("  {}", query_summary(&metrics.engine));
        info!("  Relaxation passes: {}", metrics.engine.relaxation_passes);
        info!("  Files exported: {}", metrics.exported_files);
    }
}

/// Cache misses count every computed query, including those that ended in a
/// negative cycle.
fn query_summary(engine: &EngineStats) -> String {
    format!(
        "Queries: {} ({} cached, {} computed, {} negative cycles)",
        engine.queries, engine.cache_hits, engine.cache_misses, engine.negative_cycles
    )
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
