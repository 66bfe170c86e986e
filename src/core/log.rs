use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

pub fn init_logging(verbose: bool) {
    let (level_filter, level) = if verbose {
        (LevelFilter::DEBUG, "debug")
    } else {
        (LevelFilter::INFO, "info")
    };
    let app_filter = Targets::new()
        .with_target("fxgate", level_filter)
        .with_target("tower_http", level_filter)
        .with_default(LevelFilter::WARN);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(true))
        .with(app_filter)
        .with(env_filter)
        .init();
}
