use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

/// Initializes the logger. Call once at startup; the environment can
/// override the defaults through RUST_LOG.
pub fn init_logger() {
    let env = Env::default().filter_or("RUST_LOG", "warn,subsync=info");

    Builder::from_env(env)
        .filter_module("hyper", LevelFilter::Error)
        .filter_module("rustls", LevelFilter::Error)
        .filter_module("reqwest", LevelFilter::Warn)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .init();
}
