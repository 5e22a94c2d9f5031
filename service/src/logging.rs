use crate::config::Config;
use log::LevelFilter;
use simplelog::{self, ConfigBuilder};

/// Modules to filter out from logging when not in Trace mode.
/// These are typically verbose dependencies that clutter normal log output.
const FILTERED_MODULES: &[&str] = &["reqwest", "hyper", "rustls", "tracing", "want", "mio"];

pub struct Logger {}

impl Logger {
    /// Initializes the global logger from the validated configuration.
    ///
    /// When the log level is set to Trace, all logs including dependency logs
    /// are shown. For all other log levels, verbose dependency logs are
    /// filtered out.
    pub fn init_logger(config: &Config) {
        let apply_filters = Self::should_filter_dependencies(config.log_level_filter());
        let log_config = Self::build_log_config(apply_filters);

        simplelog::TermLogger::init(
            Self::convert_level_filter(config.log_level_filter()),
            log_config,
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        )
        .expect("Failed to start simplelog");
    }

    /// Converts log::LevelFilter to simplelog::LevelFilter.
    fn convert_level_filter(level: LevelFilter) -> simplelog::LevelFilter {
        match level {
            LevelFilter::Off => simplelog::LevelFilter::Off,
            LevelFilter::Error => simplelog::LevelFilter::Error,
            LevelFilter::Warn => simplelog::LevelFilter::Warn,
            LevelFilter::Info => simplelog::LevelFilter::Info,
            LevelFilter::Debug => simplelog::LevelFilter::Debug,
            LevelFilter::Trace => simplelog::LevelFilter::Trace,
        }
    }

    /// Dependency logs are filtered at every level except Trace.
    fn should_filter_dependencies(level: LevelFilter) -> bool {
        level != LevelFilter::Trace
    }

    /// Builds a simplelog Config with optional module filtering.
    fn build_log_config(apply_filters: bool) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        if apply_filters {
            for module in FILTERED_MODULES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_stack_is_in_the_filter_list() {
        assert!(FILTERED_MODULES.contains(&"reqwest"));
        assert!(FILTERED_MODULES.contains(&"hyper"));
        assert!(FILTERED_MODULES.contains(&"rustls"));
    }

    #[test]
    fn test_trace_level_disables_dependency_filtering() {
        assert!(!Logger::should_filter_dependencies(LevelFilter::Trace));
    }

    #[test]
    fn test_other_levels_enable_dependency_filtering() {
        for level in [
            LevelFilter::Off,
            LevelFilter::Error,
            LevelFilter::Warn,
            LevelFilter::Info,
            LevelFilter::Debug,
        ] {
            assert!(
                Logger::should_filter_dependencies(level),
                "{level} should enable filtering"
            );
        }
    }

    #[test]
    fn test_build_log_config_does_not_panic() {
        let _with_filters = Logger::build_log_config(true);
        let _without_filters = Logger::build_log_config(false);
    }
}
