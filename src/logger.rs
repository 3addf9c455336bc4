use anyhow::Result;
use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;

pub fn verbosity_to_level_filter(severity: u8) -> LevelFilter {
    match severity {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

// logs go to stderr so the rendered report on stdout stays clean
pub fn setup_logger(level: LevelFilter) -> Result<Box<dyn Subscriber + Send + Sync>> {
    let subscriber = tracing_subscriber
        ::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    Ok(Box::new(subscriber))
}
