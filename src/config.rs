use clap::{Parser, ValueEnum};
use lapwatch_core::DEFAULT_TICK_MS;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Display refresh period while running, in milliseconds
    #[arg(
        long,
        env = "LAPWATCH_TICK_MS",
        default_value_t = DEFAULT_TICK_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub tick_ms: u64,

    /// Log verbosity (RUST_LOG still overrides per module)
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Append each frame instead of clearing the terminal
    #[arg(long)]
    pub plain: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, FromArgMatches};

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["lapwatch"]).unwrap();
        if std::env::var_os("LAPWATCH_TICK_MS").is_none() {
            assert_eq!(config.tick_ms, DEFAULT_TICK_MS);
        }
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(!config.plain);
    }

    #[test]
    fn test_overrides() {
        let config = Config::try_parse_from([
            "lapwatch",
            "--tick-ms",
            "250",
            "--log-level",
            "debug",
            "--plain",
        ])
        .unwrap();
        assert_eq!(config.tick_ms, 250);
        assert_eq!(log::LevelFilter::from(config.log_level), log::LevelFilter::Debug);
        assert!(config.plain);
    }

    #[test]
    fn test_zero_tick_rejected() {
        assert!(Config::try_parse_from(["lapwatch", "--tick-ms", "0"]).is_err());
    }

    #[test]
    fn test_tick_ms_reads_environment() {
        let command = Config::command();
        let tick = command
            .get_arguments()
            .find(|arg| arg.get_id() == "tick_ms")
            .unwrap();
        assert_eq!(tick.get_env(), Some(std::ffi::OsStr::new("LAPWATCH_TICK_MS")));

        // same argument bound to a variable no other test reads
        std::env::set_var("LAPWATCH_TEST_TICK_MS", "40");
        let matches = Config::command()
            .mut_arg("tick_ms", |arg| arg.env("LAPWATCH_TEST_TICK_MS"))
            .try_get_matches_from(["lapwatch"])
            .unwrap();
        let config = Config::from_arg_matches(&matches).unwrap();
        assert_eq!(config.tick_ms, 40);

        // the flag still wins over the environment
        let matches = Config::command()
            .mut_arg("tick_ms", |arg| arg.env("LAPWATCH_TEST_TICK_MS"))
            .try_get_matches_from(["lapwatch", "--tick-ms", "75"])
            .unwrap();
        assert_eq!(Config::from_arg_matches(&matches).unwrap().tick_ms, 75);
        std::env::remove_var("LAPWATCH_TEST_TICK_MS");
    }
}
