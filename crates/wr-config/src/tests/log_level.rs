use crate::LogLevel;

use std::str::FromStr;

use googletest::assert_that;
use googletest::prelude::eq;
use log::LevelFilter;

#[test]
fn given_known_levels_when_parse_then_maps_to_level_filter() {
    let cases = [
        ("off", LevelFilter::Off),
        ("error", LevelFilter::Error),
        ("WARN", LevelFilter::Warn),
        ("Info", LevelFilter::Info),
        ("debug", LevelFilter::Debug),
        (" trace ", LevelFilter::Trace),
    ];

    for (input, expected) in cases {
        let Ok(level) = LogLevel::from_str(input);
        assert_that!(*level, eq(expected));
    }
}

#[test]
fn given_unknown_level_when_parse_then_defaults_to_info() {
    let Ok(level) = LogLevel::from_str("verbose");
    assert_that!(LevelFilter::from(level), eq(LevelFilter::Info));
}
