use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 初始化日志。设置了 `RUST_LOG` 时以其为准，否则按 `verbose` 选择 debug / info
pub fn init_logger(verbose: bool) {
    let default_filter = if verbose { "pdfbench=debug" } else { "pdfbench=info" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
