use anyhow::Result;
use tracing::Level;

/// Installs a `fmt` subscriber writing to stderr at `level` and above.
///
/// Fails if a global subscriber is already set, e.g. when called twice.
pub fn init(level: Level) -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let _ = init(Level::WARN);
        assert!(init(Level::WARN).is_err());
    }
}
