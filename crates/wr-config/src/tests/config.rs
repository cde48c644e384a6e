use crate::Config;
use crate::tests::{EnvGuard, setup_config_dir};

use std::path::PathBuf;

use googletest::assert_that;
use googletest::prelude::{anything, eq, err, none, ok, some};
use log::LevelFilter;
use serial_test::serial;

// =========================================================================
// Happy Path Tests
// =========================================================================

#[test]
#[serial]
fn given_no_config_file_when_load_then_ok_with_defaults() {
    // Given
    let _temp = setup_config_dir();

    // When
    let result = Config::load();

    // Then
    assert_that!(result, ok(anything()));
    let config = result.unwrap();
    assert_that!(config.server.port, eq(crate::DEFAULT_PORT));
    assert_that!(config.server.host.as_str(), eq(crate::DEFAULT_HOST));
    assert_that!(config.server.stop_in_background, eq(true));
    assert_that!(config.assets.bundle.as_str(), eq("webroot"));
    assert_that!(config.assets.version_file.as_str(), eq("version"));
    assert_that!(config.assets.require_extraction, eq(true));
    assert_that!(config.aliases.len(), eq(0));
    assert_that!(config.error_log.any_enabled(), eq(false));
}

#[test]
#[serial]
fn given_no_config_file_when_load_and_validate_then_ok() {
    // Given
    let _temp = setup_config_dir();

    // When
    let config = Config::load().unwrap();
    let result = config.validate();

    // Then
    assert_that!(result, ok(anything()));
}

#[test]
#[serial]
fn given_missing_config_dir_when_load_then_dir_is_created() {
    // Given
    let (temp, _guard) = setup_config_dir();
    let nested = temp.path().join("nested").join("conf");
    let _dir = EnvGuard::set("WR_CONFIG_DIR", nested.to_str().unwrap());

    // When
    let result = Config::load();

    // Then
    assert_that!(result, ok(anything()));
    assert!(nested.is_dir());
}

#[test]
#[serial]
fn given_valid_toml_file_when_load_then_uses_toml_values() {
    // Given
    let (temp, _guard) = setup_config_dir();
    std::fs::write(
        temp.path().join("config.toml"),
        r#"
            [server]
            host = "localhost"
            port = 0
            stop_in_background = false
            extra_config = 'server.modules += ("mod_alias")'

            [assets]
            bundle = "site"
            package_dir = "/opt/app/package"
            writable_dir = "/var/lib/app"
            require_extraction = false

            [error_log]
            request_handling = true
            timeouts = true

            [[aliases]]
            url = "/some/path"
            path = "."

            [logging]
            level = "debug"
            colored = false
        "#,
    )
    .unwrap();

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.server.host.as_str(), eq("localhost"));
    assert_that!(config.server.port, eq(0));
    assert_that!(config.server.stop_in_background, eq(false));
    assert_that!(
        config.server.extra_config.as_deref(),
        some(eq("server.modules += (\"mod_alias\")"))
    );
    assert_that!(config.assets.bundle.as_str(), eq("site"));
    assert_that!(
        config.assets.package_dir,
        eq(&PathBuf::from("/opt/app/package"))
    );
    assert_that!(
        config.assets.writable_dir,
        some(eq(&PathBuf::from("/var/lib/app")))
    );
    assert_that!(config.assets.require_extraction, eq(false));
    assert_that!(config.error_log.request_handling, eq(true));
    assert_that!(config.error_log.timeouts, eq(true));
    assert_that!(config.error_log.file_not_found, eq(false));
    assert_that!(config.aliases.len(), eq(1));
    assert_that!(config.aliases[0].url.as_str(), eq("/some/path"));
    assert_that!(*config.logging.level, eq(LevelFilter::Debug));
    assert_that!(config.logging.colored, eq(false));
}

#[test]
#[serial]
fn given_env_var_and_toml_when_load_then_env_var_overrides_toml() {
    // Given
    let (temp, _guard) = setup_config_dir();
    std::fs::write(
        temp.path().join("config.toml"),
        r#"
            [server]
            port = 4000

            [assets]
            bundle = "site"
        "#,
    )
    .unwrap();
    let _port = EnvGuard::set("WR_SERVER_PORT", "4100");
    let _bundle = EnvGuard::set("WR_ASSETS_BUNDLE", "other");
    let _extract = EnvGuard::set("WR_ASSETS_REQUIRE_EXTRACTION", "0");
    let _writable = EnvGuard::set("WR_ASSETS_WRITABLE_DIR", "/tmp/extracted");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.server.port, eq(4100));
    assert_that!(config.assets.bundle.as_str(), eq("other"));
    assert_that!(config.assets.require_extraction, eq(false));
    assert_that!(
        config.assets.writable_dir,
        some(eq(&PathBuf::from("/tmp/extracted")))
    );
}

#[test]
#[serial]
fn given_unparseable_port_env_var_when_load_then_keeps_default() {
    // Given
    let _temp = setup_config_dir();
    let _port = EnvGuard::set("WR_SERVER_PORT", "not-a-port");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.server.port, eq(crate::DEFAULT_PORT));
}

#[test]
#[serial]
fn given_log_file_env_var_when_log_file_path_then_joined_to_config_dir() {
    // Given
    let (temp, _guard) = setup_config_dir();
    let _file = EnvGuard::set("WR_LOG_FILE", "webroot.log");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(
        config.log_file_path(temp.path()),
        some(eq(&temp.path().join("webroot.log")))
    );
}

#[test]
#[serial]
fn given_no_log_file_when_log_file_path_then_none() {
    // Given
    let (temp, _guard) = setup_config_dir();

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.log_file_path(temp.path()), none());
}

// =========================================================================
// Error Tests
// =========================================================================

#[test]
#[serial]
fn given_malformed_toml_when_load_then_error() {
    // Given
    let (temp, _guard) = setup_config_dir();
    std::fs::write(temp.path().join("config.toml"), "[server\nport = ").unwrap();

    // When
    let result = Config::load();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_wrong_type_in_toml_when_load_then_error() {
    // Given
    let (temp, _guard) = setup_config_dir();
    std::fs::write(
        temp.path().join("config.toml"),
        "[server]\nport = \"three thousand\"\n",
    )
    .unwrap();

    // When
    let result = Config::load();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_explicit_writable_dir_when_writable_root_then_returned_as_is() {
    // Given
    let _temp = setup_config_dir();
    let _writable = EnvGuard::set("WR_ASSETS_WRITABLE_DIR", "/data/webroot");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(
        config.assets.writable_root(),
        ok(eq(&PathBuf::from("/data/webroot")))
    );
}
