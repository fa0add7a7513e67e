//! Logger initialization from a loaded configuration.
//!
//! Installing a global subscriber can only happen once per process, so this
//! binary holds a single test.

use std::fs;
use std::io::Write;

use quorumbd_middleware::config::ConfigContext;
use quorumbd_middleware::lifecycle::startup::{startup, StartupError, EXIT_LOGGING};
use quorumbd_middleware::observability::init_logging;

#[test]
fn test_file_sink_receives_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("middleware.log");
    let config_path = dir.path().join("middleware.toml");

    let mut file = fs::File::create(&config_path).unwrap();
    write!(
        file,
        r#"
[core]
server = "core-1:7000"
control = "core-1:7001"

[logging]
type = "file"
filename = "{}"
level = "warn"
format = "json"
"#,
        log_path.display()
    )
    .unwrap();
    drop(file);

    // Environment directives must not let records below the configured level through.
    std::env::set_var("RUST_LOG", "info");

    let ctx = ConfigContext::from_path(&config_path);
    let started = match startup(&ctx) {
        Ok(started) => started,
        Err(err) => panic!("startup failed: {}", err),
    };

    tracing::info!("filtered out below warn");
    tracing::warn!(disk = "sda", "degraded");
    drop(started.logging);

    let contents = fs::read_to_string(&log_path).unwrap();
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(lines.len(), 1, "{}", contents);
    assert!(lines[0].starts_with('{'));
    assert!(lines[0].contains("\"level\":\"WARN\""));
    assert!(lines[0].contains("degraded"));
    assert!(lines[0].contains("\"disk\":\"sda\""));

    // A second subscriber cannot be installed.
    match init_logging(&ctx.get().logging) {
        Ok(guard) => panic!("second logger installed: {:?}", guard),
        Err(err) => assert_eq!(StartupError::from(err).exit_code(), EXIT_LOGGING),
    }
}
