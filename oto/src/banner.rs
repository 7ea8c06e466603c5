use crate::handlers::EndpointArgs;
use colored::Colorize;

const BANNER: &str = r#"
   ____  _______ ____
  / __ \/_  __/ / __ \
 / /_/ / / /   / /_/ /
 \____/ /_/    \____/
"#;

pub fn print_banner() {
    eprintln!("{}", BANNER.bright_cyan().bold());
    eprintln!(
        "  {} {}\n",
        "endpoint & secret harvester".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}

fn print_divider() {
    eprintln!("{}", "═".repeat(60).bright_blue().bold());
}

fn on_off(flag: bool) -> colored::ColoredString {
    if flag { "on".green() } else { "off".dimmed() }
}

/// Settings the run is about to use
pub fn print_run_summary(seeds: &[String], args: &EndpointArgs) {
    print_divider();
    eprintln!("{} Targets: {}", "→".blue(), seeds.len().to_string().bright_white());
    eprintln!("{} Result types: {}", "→".blue(), args.categories);
    eprintln!(
        "{} Output: {}",
        "→".blue(),
        args.output
            .as_ref()
            .map_or_else(|| "stdout".to_string(), |p| p.display().to_string())
            .bright_white()
    );
    if let Some(js_log) = &args.js_log {
        eprintln!("{} Script log: {}", "→".blue(), js_log.display());
    }
    eprintln!("{} Concurrency: {}", "→".blue(), args.concurrency);
    eprintln!("{} Timeout: {}s", "→".blue(), args.timeout.as_secs());
    if let Some(proxy) = &args.proxy {
        eprintln!("{} Proxy: {}", "→".blue(), proxy);
    }
    eprintln!(
        "{} Verbose: {}  Debug: {}",
        "→".blue(),
        on_off(args.verbose),
        on_off(args.debug)
    );
    print_divider();
}
