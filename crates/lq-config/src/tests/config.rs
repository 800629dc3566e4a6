use crate::Config;
use crate::tests::{EnvGuard, temp_config_dir};

use googletest::assert_that;
use googletest::prelude::{anything, eq, ok};
use serial_test::serial;

#[test]
#[serial]
fn given_missing_config_file_when_load_then_defaults_apply() {
    // Given
    let _temp = temp_config_dir();

    // When
    let result = Config::load();

    // Then
    assert_that!(result, ok(anything()));
    let config = result.unwrap();
    assert_that!(config.server.port, eq(crate::DEFAULT_PORT));
    assert_that!(
        config.limits.max_connections,
        eq(crate::limits_config::DEFAULT_MAX_CONNECTIONS)
    );
    assert_that!(config.logging.colored, eq(true));
}

#[test]
#[serial]
fn given_default_config_when_validate_then_ok() {
    // Given
    let _temp = temp_config_dir();

    // When
    let config = Config::load().unwrap();
    let result = config.validate();

    // Then
    assert_that!(result, ok(anything()));
}

#[test]
#[serial]
fn given_toml_file_when_load_then_its_values_take_effect() {
    // Given
    let (temp, _guard) = temp_config_dir();
    std::fs::write(
        temp.path().join("config.toml"),
        r#"
              [server]
              port = 9300

              [limits]
              max_connections = 4500

              [websocket]
              send_buffer_size = 250
          "#,
    )
    .unwrap();

    // When
    let result = Config::load();

    // Then
    assert_that!(result, ok(anything()));
    let config = result.unwrap();
    assert_that!(config.server.port, eq(9300));
    assert_that!(config.limits.max_connections, eq(4500));
    assert_that!(config.websocket.send_buffer_size, eq(250));
}

#[test]
#[serial]
fn given_env_override_when_load_then_it_wins_over_toml() {
    // Given
    let (temp, _guard) = temp_config_dir();
    std::fs::write(temp.path().join("config.toml"), "[server]\nport = 9300").unwrap();
    let _port_guard = EnvGuard::set("LQ_SERVER_PORT", "8600");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.server.port, eq(8600));
}

#[test]
#[serial]
fn given_several_env_overrides_when_load_then_each_applies() {
    // Given
    let _temp = temp_config_dir();
    let _port = EnvGuard::set("LQ_SERVER_PORT", "7400");
    let _host = EnvGuard::set("LQ_SERVER_HOST", "0.0.0.0");
    let _max = EnvGuard::set("LQ_LIMITS_MAX_CONNECTIONS", "1500");
    let _colored = EnvGuard::set("LQ_LOG_COLORED", "false");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.server.port, eq(7400));
    assert_that!(config.server.host.as_str(), eq("0.0.0.0"));
    assert_that!(config.limits.max_connections, eq(1500));
    assert_that!(config.logging.colored, eq(false));
}

#[test]
#[serial]
fn given_unparseable_env_override_when_load_then_ignored() {
    // Given
    let _temp = temp_config_dir();
    let _port = EnvGuard::set("LQ_SERVER_PORT", "not-a-port");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.server.port, eq(crate::DEFAULT_PORT));
}

#[test]
#[serial]
fn given_malformed_toml_when_load_then_error() {
    // Given
    let (temp, _guard) = temp_config_dir();
    std::fs::write(temp.path().join("config.toml"), "[server\nport = ").unwrap();

    // When
    let result = Config::load();

    // Then
    assert!(result.is_err());
}

#[test]
#[serial]
fn given_config_when_bind_addr_then_host_and_port_joined() {
    // Given
    let _temp = temp_config_dir();
    let _port = EnvGuard::set("LQ_SERVER_PORT", "9100");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.bind_addr().as_str(), eq("127.0.0.1:9100"));
}

#[test]
#[serial]
fn given_log_level_env_override_when_load_then_level_parsed() {
    // Given
    let _temp = temp_config_dir();
    let _level = EnvGuard::set("LQ_LOG_LEVEL", "debug");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(*config.logging.level, eq(log::LevelFilter::Debug));
}

#[test]
#[serial]
fn given_unknown_log_level_when_load_then_falls_back_to_default() {
    // Given - a typo in the level must not stop the server from starting
    let (temp, _guard) = temp_config_dir();
    std::fs::write(temp.path().join("config.toml"), "[logging]\nlevel = \"loud\"").unwrap();

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(*config.logging.level, eq(crate::DEFAULT_LOG_LEVEL));
}
