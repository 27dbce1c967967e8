//! Integration tests for switchyard-config.
//!
//! These tests verify end-to-end functionality across modules: files on disk,
//! validation, graph building and path search over the result.

use std::sync::Arc;

use switchyard_config::{
    AvailabilityConfig, ConfigError, ConnectionConfig, DeviceControlConfig, RoutingConfig,
    ValidationError,
};
use switchyard_core::{
    ConnectionType, ConnectionUsages, EndpointInfo, PathBuilder, PathFinder, RoomId,
};
use tempfile::TempDir;

fn site() -> RoutingConfig {
    RoutingConfig::new("Integration Site")
        .with_description("Matrix feeding two rooms")
        .with_midpoint(DeviceControlConfig::new(20).with_name("Matrix"))
        .with_connection(
            ConnectionConfig::new(1, "10.0.1", "20.0.1")
                .with_type("audio")
                .with_type("video"),
        )
        .with_connection(
            ConnectionConfig::new(2, "20.0.1", "30.0.1")
                .with_type("video")
                .with_rooms(AvailabilityConfig::only([1])),
        )
        .with_connection(
            ConnectionConfig::new(3, "20.0.2", "31.0.1")
                .with_type("video")
                .with_source_devices(AvailabilityConfig::except([10])),
        )
}

/// Save to disk, load back, and search the built graph.
#[test]
fn test_file_round_trip_to_path_search() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("site.toml");

    let config = site();
    config.save(&path).unwrap();
    let loaded = RoutingConfig::load(&path).unwrap();
    assert_eq!(loaded, config);

    let finder = PathFinder::new(
        Arc::new(loaded.build_graph().unwrap()),
        Arc::new(ConnectionUsages::new()),
    );
    let query = |destination, room| {
        PathBuilder::new()
            .source(EndpointInfo::new(10, 0, 1))
            .destination(destination)
            .of_type(ConnectionType::VIDEO)
            .in_room(room)
            .build()
    };

    let projector = EndpointInfo::new(30, 0, 1);
    assert!(finder.has_paths([&query(projector, RoomId(1))]));
    assert!(!finder.has_paths([&query(projector, RoomId(2))]));

    let display = EndpointInfo::new(31, 0, 1);
    assert!(
        !finder.has_paths([&query(display, RoomId(1))]),
        "source device 10 is excluded from connection 3"
    );
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    let err = RoutingConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { ref path, .. } if path.ends_with("absent.toml")));
}

#[test]
fn test_load_rejects_malformed_availability() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("site.toml");
    std::fs::write(
        &path,
        r#"
name = "Bad"

[[connections]]
id = 1
source = "1.0.1"
destination = "2.0.1"
types = ["video"]
rooms = { mode = "sometimes", ids = [1] }
"#,
    )
    .unwrap();
    assert!(matches!(
        RoutingConfig::load(&path).unwrap_err(),
        ConfigError::TomlParse(_)
    ));
}

#[test]
fn test_validation_error_surfaces_through_build() {
    let config = site().with_connection(ConnectionConfig::new(4, "10.0.1", "40.0.1").with_type("video"));
    let err = config.build_graph().unwrap_err();
    let ConfigError::Validation(ValidationError::Graph(inner)) = err else {
        panic!("expected a graph rule violation, got {err}");
    };
    assert!(inner.to_string().contains("two outgoing Video connections"));
}

#[test]
fn test_export_of_built_graph_loads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("export.toml");

    let graph = site().build_graph().unwrap();
    RoutingConfig::from_graph("Export", &graph).save(&path).unwrap();
    let reloaded = RoutingConfig::load(&path).unwrap().build_graph().unwrap();

    assert_eq!(reloaded.len(), graph.len());
    for connection in graph.iter() {
        assert_eq!(reloaded.get(connection.id), Some(connection));
    }
}
