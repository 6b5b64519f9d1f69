//! 性能基准演示：cargo run --release --example performance_benchmark

use json_tree_viewer::model::performance::run_performance_suite;
use tracing_subscriber::fmt::SubscriberBuilder;

fn main() {
    let _ = SubscriberBuilder::default()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    let results = run_performance_suite();
    let failed = results.iter().filter(|r| !r.success).count();

    for r in &results {
        println!(
            "[{}] {:<12} {:>6}ms  {}",
            if r.success { "通过" } else { "失败" },
            r.operation,
            r.duration_ms,
            r.details
        );
    }
    println!("共 {} 项，失败 {} 项", results.len(), failed);
}
