use crate::cli::Cli;

pub(crate) fn no_color_env_requested() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty())
}

pub(crate) fn is_dumb_terminal() -> bool {
    std::env::var("TERM")
        .map(|value| value.eq_ignore_ascii_case("dumb"))
        .unwrap_or(false)
}

pub(crate) fn should_disable_color(no_color_env: bool, dumb_terminal: bool) -> bool {
    no_color_env || dumb_terminal
}

/// Level used when `RUST_LOG` does not decide.
pub(crate) fn default_log_level(cli: &Cli) -> &'static str {
    if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// An explicit `-v` or `-q` beats `RUST_LOG`.
pub(crate) fn should_force_cli_log_level(cli: &Cli) -> bool {
    cli.quiet || cli.verbose > 0
}

pub(crate) fn init_tracing(default_level: &str, force_cli_level: bool, no_color: bool) {
    let filter = if force_cli_level {
        tracing_subscriber::EnvFilter::new(default_level)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level))
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_env_filter(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_default_log_level_from_flags() {
        let cli = Cli::try_parse_from(["yt-obsidian", "process", "x"]).unwrap();
        assert_eq!(default_log_level(&cli), "info");
        assert!(!should_force_cli_log_level(&cli));

        let cli = Cli::try_parse_from(["yt-obsidian", "-v", "process", "x"]).unwrap();
        assert_eq!(default_log_level(&cli), "debug");
        assert!(should_force_cli_log_level(&cli));

        let cli = Cli::try_parse_from(["yt-obsidian", "-vvv", "process", "x"]).unwrap();
        assert_eq!(default_log_level(&cli), "trace");

        let cli = Cli::try_parse_from(["yt-obsidian", "-q", "process", "x"]).unwrap();
        assert_eq!(default_log_level(&cli), "error");
        assert!(should_force_cli_log_level(&cli));
    }

    #[test]
    fn test_should_disable_color() {
        assert!(!should_disable_color(false, false));
        assert!(should_disable_color(true, false));
        assert!(should_disable_color(false, true));
    }
}
