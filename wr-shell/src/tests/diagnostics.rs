use crate::diagnostics::Diagnostics;

use googletest::assert_that;
use googletest::prelude::{eq, none, some};
use wr_config::ErrorLogSettings;

fn diagnostics() -> Diagnostics {
    Diagnostics::new(
        ErrorLogSettings::all(),
        ["/some/path".to_string(), "/docs".to_string()],
    )
}

#[test]
fn given_path_under_alias_when_matched_then_alias_prefix() {
    let diagnostics = diagnostics();

    assert_that!(diagnostics.mount_for("/some/path"), some(eq("/some/path")));
    assert_that!(diagnostics.mount_for("/docs/index.html"), some(eq("/docs")));
}

#[test]
fn given_path_sharing_only_a_prefix_when_matched_then_document_root() {
    let diagnostics = diagnostics();

    assert_that!(diagnostics.mount_for("/docsearch"), none());
    assert_that!(diagnostics.mount_for("/index.html"), none());
}
