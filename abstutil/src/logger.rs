/// Intercept messages using the `log` crate and print them to STDERR. The default level is
/// `info`; override with `RUST_LOG`.
pub fn setup() {
    use env_logger::{Builder, Env};
    Builder::from_env(Env::default().default_filter_or("info")).init();
}

/// Like `setup`, but safe to call many times. Tests use this, since every test in a binary shares
/// one global logger.
pub fn setup_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
