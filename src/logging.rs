use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// stderr に出力する subscriber を登録する。
/// RUST_LOG があればそれを、無ければ `level` を使う。
/// stdout は JSON 出力専用
pub fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| anyhow!("invalid log level {:?}: {}", level, e))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {}", e))
}
