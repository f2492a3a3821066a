#[derive(thiserror::Error, Debug)]
pub enum RegisterErrorKind {
    #[error("A bind for '{key}' already exists in container")]
    DuplicateBinding { key: String },
    #[error(
        "\
        Mock bind for '{key}' is only allowed in test mode. \
        Enable `Config::test_mode` or set the `BINDERY_TEST` environment variable in tests\
        "
    )]
    MockOutsideTest { key: String },
}
