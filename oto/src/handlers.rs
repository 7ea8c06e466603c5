use crate::banner::print_run_summary;
use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use oto_core::report::{generate_summary, render_records, render_script_log, write_file};
use oto_core::{EventCallback, PipelineEvent, Report, RunOptions, execute_run};
use oto_scanner::target::with_default_scheme;
use oto_scanner::{CategorySelection, Classifier, CookieSource, FetchConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Where the seed targets come from. `--domain` wins when both are given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSource {
    Domain(String),
    List(PathBuf),
}

impl TargetSource {
    pub fn select(domain: Option<&String>, list: Option<&PathBuf>) -> Option<Self> {
        if let Some(domain) = domain {
            Some(TargetSource::Domain(domain.clone()))
        } else {
            list.map(|path| TargetSource::List(expand_path(path)))
        }
    }

    pub fn load(&self) -> Result<Vec<String>> {
        match self {
            TargetSource::Domain(domain) => Ok(parse_target_line(domain).into_iter().collect()),
            TargetSource::List(path) => load_targets_from_file(path),
        }
    }
}

/// Load seed targets from a newline-delimited file
pub fn load_targets_from_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Error opening domain file {}", path.display()))?;

    Ok(content.lines().filter_map(parse_target_line).collect())
}

/// Trim a line and default a missing scheme to https. Blank lines yield None.
pub fn parse_target_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(with_default_scheme(line))
}

/// Expand `~` in user-supplied paths
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
}

/// Everything the `endpoint` subcommand was asked to do
#[derive(Debug, Clone)]
pub struct EndpointArgs {
    pub source: Option<TargetSource>,
    pub categories: CategorySelection,
    pub concurrency: usize,
    pub timeout: Duration,
    pub proxy: Option<String>,
    pub cookie: CookieSource,
    pub output: Option<PathBuf>,
    pub js_log: Option<PathBuf>,
    pub pace: Duration,
    pub verbose: bool,
    pub debug: bool,
}

impl EndpointArgs {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let categories = matches
            .get_many::<String>("result-types")
            .map(|names| CategorySelection::from_names(names.map(|n| n.trim())))
            .unwrap_or_default();

        Self {
            source: TargetSource::select(
                matches.get_one::<String>("domain"),
                matches.get_one::<PathBuf>("list"),
            ),
            categories,
            concurrency: matches
                .get_one::<u64>("concurrency")
                .map_or(oto_core::DEFAULT_CONCURRENCY, |c| *c as usize),
            timeout: Duration::from_secs(
                matches
                    .get_one::<u64>("timeout")
                    .copied()
                    .unwrap_or(oto_scanner::fetcher::DEFAULT_TIMEOUT_SECS),
            ),
            proxy: matches.get_one::<String>("proxy").cloned(),
            cookie: CookieSource::from_options(
                matches.get_one::<String>("cookie").cloned(),
                matches.get_one::<PathBuf>("cookie-file").map(|p| expand_path(p)),
            ),
            output: matches.get_one::<PathBuf>("output").map(|p| expand_path(p)),
            js_log: matches.get_one::<PathBuf>("js-log").map(|p| expand_path(p)),
            pace: Duration::from_millis(matches.get_one::<u64>("pace-ms").copied().unwrap_or(500)),
            verbose: matches.get_flag("verbose"),
            debug: matches.get_flag("debug"),
        }
    }

    pub fn log_level(&self) -> Level {
        log_level(self.verbose, self.debug)
    }

    pub fn fetch_config(&self, cookie: Option<String>) -> FetchConfig {
        let mut config = FetchConfig::default().with_timeout(self.timeout);
        if let Some(proxy) = &self.proxy {
            config = config.with_proxy(proxy.clone());
        }
        if let Some(cookie) = cookie {
            config = config.with_cookie(cookie);
        }
        config
    }

    pub fn run_options(&self, seeds: Vec<String>, cookie: Option<String>) -> RunOptions {
        RunOptions {
            seeds,
            categories: self.categories.clone(),
            concurrency: self.concurrency,
            pace: self.pace,
            record_script_log: self.js_log.is_some(),
            fetch: self.fetch_config(cookie),
        }
    }
}

pub fn log_level(verbose: bool, debug: bool) -> Level {
    if debug {
        Level::DEBUG
    } else if verbose {
        Level::INFO
    } else {
        Level::WARN
    }
}

/// `level` applies to this tool's crates only; HTTP stack crates stay at warn.
pub fn log_directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    format!("warn,oto={level},oto_core={level},oto_scanner={level}")
}

fn init_tracing(level: Level) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_directives(level)));

    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

/// Build the progress bar for a run. Hidden when line output or logs would
/// interleave with it.
fn run_progress_bar(args: &EndpointArgs, quiet: bool) -> ProgressBar {
    if quiet || args.verbose || args.debug {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Render pipeline events as terminal output
pub fn progress_callback(pb: ProgressBar, verbose: bool) -> EventCallback {
    Arc::new(move |event: PipelineEvent| match event {
        PipelineEvent::DiscoveryStarted { seeds } => {
            pb.set_message(format!("Discovering scripts on {} seed(s)", seeds));
        }
        PipelineEvent::ScriptDiscovered { seed, script } if verbose => {
            pb.suspend(|| {
                eprintln!(
                    "{} Extracted JS URL: {} [{}]",
                    "+".green().bold(),
                    script.bright_white(),
                    seed.to_string().dimmed()
                )
            });
        }
        PipelineEvent::DiscoveryFinished { targets } => {
            pb.set_message(format!("{} target(s) queued", targets));
        }
        PipelineEvent::HarvestStarted { targets } => {
            pb.set_length(targets as u64);
            pb.set_position(0);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            );
            pb.set_message("harvesting");
        }
        PipelineEvent::TargetFetched {
            target,
            status_code,
            findings,
            response_time,
        } => {
            if verbose {
                pb.suspend(|| {
                    eprintln!(
                        "{} Fetched source for URL: {} [{}] {} finding(s) in {}ms",
                        "+".green().bold(),
                        target.to_string().bright_white(),
                        status_code,
                        findings,
                        response_time.as_millis()
                    )
                });
            }
            pb.inc(1);
        }
        PipelineEvent::TargetDropped { .. } => pb.inc(1),
        PipelineEvent::HarvestFinished { .. } => pb.finish_and_clear(),
        _ => {}
    })
}

/// Serialize the records and send them to the file or stdout.
/// Failures here are reported only in debug mode; the run still ends normally.
pub fn emit_report(report: &Report, output: Option<&Path>, verbose: bool, debug: bool) -> Option<usize> {
    let json = match render_records(&report.records) {
        Ok(json) => json,
        Err(e) => {
            if debug {
                eprintln!("{} {}", "✗".red().bold(), e);
            }
            return None;
        }
    };

    match output {
        Some(path) => {
            if let Err(e) = write_file(path, &json) {
                if debug {
                    eprintln!("{} {}", "✗".red().bold(), e);
                }
                return None;
            }
            eprintln!(
                "{} Results written to: {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
            if verbose {
                println!("{}", json);
            }
        }
        None => println!("{}", json),
    }

    eprintln!("{} Results size: {} bytes", "→".blue(), json.len());
    Some(json.len())
}

fn write_script_log(path: &Path, output: &oto_core::RunOutput, debug: bool) {
    let Some(log) = &output.script_log else {
        return;
    };
    let result = render_script_log(log).and_then(|json| write_file(path, &json));
    match result {
        Ok(()) => eprintln!(
            "{} Script log written to: {}",
            "✓".green().bold(),
            path.display().to_string().bright_white()
        ),
        Err(e) if debug => eprintln!("{} {}", "✗".red().bold(), e),
        Err(_) => {}
    }
}

/// Resolve the seeds or explain why there are none
pub fn resolve_targets(args: &EndpointArgs) -> Result<Vec<String>> {
    let Some(source) = &args.source else {
        bail!("Please provide either --domain (-d) or --list (-l)");
    };
    source.load()
}

pub async fn handle_endpoint(sub_matches: &ArgMatches, quiet: bool) {
    init_tracing(log_level(
        sub_matches.get_flag("verbose"),
        sub_matches.get_flag("debug"),
    ));
    let args = EndpointArgs::from_matches(sub_matches);

    if args.source.is_none() {
        eprintln!(
            "{} Please provide either --domain (-d) or --list (-l)",
            "✗".red().bold()
        );
        std::process::exit(1);
    }

    let seeds = match resolve_targets(&args) {
        Ok(seeds) => seeds,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            return;
        }
    };

    if !quiet {
        print_run_summary(&seeds, &args);
    }

    if seeds.is_empty() {
        eprintln!("{} No targets to process", "⚠".yellow().bold());
        return;
    }

    let cookie = match args.cookie.resolve() {
        Ok(cookie) => cookie,
        Err(e) => {
            eprintln!(
                "{} {}; continuing without a cookie",
                "⚠".yellow().bold(),
                e
            );
            None
        }
    };

    let pb = run_progress_bar(&args, quiet);
    let callback = progress_callback(pb.clone(), args.verbose);

    let output = match execute_run(
        args.run_options(seeds, cookie),
        Arc::new(Classifier::default()),
        Some(callback),
    )
    .await
    {
        Ok(output) => output,
        Err(e) => {
            pb.finish_and_clear();
            eprintln!("{} Run failed: {}", "✗".red().bold(), e);
            return;
        }
    };
    pb.finish_and_clear();

    if let Some(path) = &args.js_log {
        write_script_log(path, &output, args.debug);
    }

    emit_report(&output.report, args.output.as_deref(), args.verbose, args.debug);

    if args.verbose || args.debug {
        eprintln!();
        eprint!("{}", generate_summary(&output.report, output.targets));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_follows_flags() {
        let mut args = EndpointArgs {
            source: None,
            categories: CategorySelection::all(),
            concurrency: 5,
            timeout: Duration::from_secs(5),
            proxy: None,
            cookie: CookieSource::None,
            output: None,
            js_log: None,
            pace: Duration::from_millis(500),
            verbose: false,
            debug: false,
        };
        assert_eq!(args.log_level(), Level::WARN);
        args.verbose = true;
        assert_eq!(args.log_level(), Level::INFO);
        args.debug = true;
        assert_eq!(args.log_level(), Level::DEBUG);
    }

    #[test]
    fn test_log_directives_scoped_to_own_crates() {
        let directives = log_directives(Level::DEBUG);
        assert_eq!(directives, "warn,oto=debug,oto_core=debug,oto_scanner=debug");
        assert!(EnvFilter::try_new(&directives).is_ok());
        assert!(!directives.contains("reqwest") && !directives.contains("hyper"));
    }

    #[test]
    fn test_log_directives_quiet_by_default() {
        assert_eq!(
            log_directives(log_level(false, false)),
            "warn,oto=warn,oto_core=warn,oto_scanner=warn"
        );
    }

    #[test]
    fn test_expand_path_leaves_plain_paths() {
        assert_eq!(expand_path(Path::new("out/report.json")), PathBuf::from("out/report.json"));
    }
}
