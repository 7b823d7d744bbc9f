// demos/compare_methods.rs

use poisson_lab::{BenchmarkHarness, SolverConfig};

/// Benchmarks every solver on the default model problem and prints the
/// comparison table. Pass a JSON config as the first argument to override it,
/// e.g. `'{"n": 15, "w": 1.6}'`.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(json) => match SolverConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => SolverConfig::default(),
    };

    let mut harness = BenchmarkHarness::new();
    match harness.run_all(&config) {
        Ok(report) => {
            println!("{}", report);
            if let Some(solution) = &report.last_solution {
                println!("Last solution grid:\n{:.4}", solution);
            }
        }
        Err(e) => {
            eprintln!("Benchmark failed: {}", e);
            std::process::exit(1);
        }
    }
}
