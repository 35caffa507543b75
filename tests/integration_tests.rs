use cucumber::World;

pub mod common;
pub mod steps;

pub use common::world::FormWorld;

/// # Formline Integration Tests
///
/// Cucumber scenarios driving a rendered form through its container, with
/// scripted challenge widget and transport collaborators.
///
/// ```bash
/// cargo test --test integration_tests
///
/// # With runtime logs
/// FORMLINE_LOG_LEVEL=debug cargo test --test integration_tests
/// ```
#[tokio::main]
async fn main() {
    #[allow(clippy::disallowed_methods)]
    let log_level = std::env::var("FORMLINE_LOG_LEVEL")
        .unwrap_or_else(|_| "error".to_string())
        .to_lowercase();

    let level = match log_level.as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        _ => tracing::Level::ERROR,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Running feature files under features/");
    FormWorld::cucumber()
        .fail_on_skipped()
        .run_and_exit("features")
        .await;
}
