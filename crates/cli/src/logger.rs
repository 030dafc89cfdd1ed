// Minimal stderr backend for the `log` facade used by the library crates.

use log::{Level, Log, Metadata, Record};

struct StderrLogger {
    level: Level,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.target().starts_with("labsheet")
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level().as_str().to_lowercase(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Map `-v` occurrences to a level: warnings by default, then info, then debug.
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::Warn,
        1 => Level::Info,
        _ => Level::Debug,
    }
}

pub fn init(verbosity: u8) {
    let level = level_for(verbosity);
    let logger: &'static StderrLogger = Box::leak(Box::new(StderrLogger { level }));
    // A second init (tests, embedding) keeps the first logger
    if log::set_logger(logger).is_ok() {
        log::set_max_level(level.to_level_filter());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(level_for(0), Level::Warn);
        assert_eq!(level_for(1), Level::Info);
        assert_eq!(level_for(5), Level::Debug);
    }

    #[test]
    fn test_only_own_targets() {
        let logger = StderrLogger { level: Level::Debug };
        let ours = Metadata::builder().level(Level::Info).target("labsheet_io::store").build();
        let theirs = Metadata::builder().level(Level::Info).target("calamine::xlsx").build();
        assert!(logger.enabled(&ours));
        assert!(!logger.enabled(&theirs));

        let quiet = StderrLogger { level: Level::Warn };
        assert!(!quiet.enabled(&ours));
    }

    #[test]
    fn test_init_sets_max_level() {
        init(1);
        // Whichever init won, the filter matches a level `level_for` produces
        assert!(log::max_level() >= log::LevelFilter::Warn);
        init(2);
    }
}
