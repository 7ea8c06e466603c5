use oto::commands::command_argument_builder;
use oto::handlers::*;
use oto_scanner::{Category, CookieSource};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::{NamedTempFile, TempDir};

fn endpoint_args(argv: &[&str]) -> EndpointArgs {
    let mut full = vec!["oto", "endpoint"];
    full.extend_from_slice(argv);
    let matches = command_argument_builder().try_get_matches_from(full).unwrap();
    let (name, sub) = matches.subcommand().unwrap();
    assert_eq!(name, "endpoint");
    EndpointArgs::from_matches(sub)
}

#[test]
fn test_parse_target_line_with_scheme() {
    assert_eq!(
        parse_target_line("http://example.com"),
        Some("http://example.com".to_string())
    );
}

#[test]
fn test_parse_target_line_defaults_to_https() {
    assert_eq!(
        parse_target_line("  example.com/login "),
        Some("https://example.com/login".to_string())
    );
}

#[test]
fn test_parse_target_line_blank() {
    assert_eq!(parse_target_line("   "), None);
}

#[test]
fn test_load_targets_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(temp_file, "https://example.com")?;
    writeln!(temp_file, "httpbin.org")?;
    writeln!(temp_file)?;
    writeln!(temp_file, "   ")?;
    writeln!(temp_file, "  http://api.example.com  ")?;

    let targets = load_targets_from_file(temp_file.path())?;

    assert_eq!(
        targets,
        vec![
            "https://example.com",
            "https://httpbin.org",
            "http://api.example.com",
        ]
    );
    Ok(())
}

#[test]
fn test_load_targets_from_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing.txt");

    let err = load_targets_from_file(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("Error opening domain file"));
}

#[test]
fn test_target_source_domain_wins_over_list() {
    let domain = "example.com".to_string();
    let list = PathBuf::from("targets.txt");

    let source = TargetSource::select(Some(&domain), Some(&list)).unwrap();
    assert_eq!(source, TargetSource::Domain("example.com".to_string()));
    assert_eq!(source.load().unwrap(), vec!["https://example.com"]);
}

#[test]
fn test_target_source_none_without_input() {
    assert!(TargetSource::select(None, None).is_none());
}

#[test]
fn test_resolve_targets_requires_input() {
    let args = endpoint_args(&[]);
    let err = resolve_targets(&args).unwrap_err();
    assert!(err.to_string().contains("--domain"));
}

#[test]
fn test_endpoint_defaults() {
    let args = endpoint_args(&["-d", "example.com"]);

    assert_eq!(args.concurrency, 5);
    assert_eq!(args.timeout, Duration::from_secs(5));
    assert_eq!(args.pace, Duration::from_millis(500));
    assert_eq!(args.categories.len(), 5);
    assert_eq!(args.cookie, CookieSource::None);
    assert!(args.output.is_none());
    assert!(!args.verbose && !args.debug);
}

#[test]
fn test_endpoint_options() {
    let args = endpoint_args(&[
        "-d",
        "example.com",
        "-t",
        "info,Critical,bogus",
        "-c",
        "20",
        "-T",
        "10",
        "-p",
        "http://127.0.0.1:8080",
        "--cookie",
        "session=abc",
        "--cookie-file",
        "cookies.txt",
        "-o",
        "out.json",
        "-j",
        "scripts.json",
        "--pace-ms",
        "0",
        "-v",
        "-D",
    ]);

    let selected: Vec<Category> = args.categories.iter().collect();
    assert_eq!(selected, vec![Category::Info, Category::Critical]);
    assert_eq!(args.concurrency, 20);
    assert_eq!(args.timeout, Duration::from_secs(10));
    assert_eq!(args.proxy.as_deref(), Some("http://127.0.0.1:8080"));
    assert_eq!(args.cookie, CookieSource::Inline("session=abc".to_string()));
    assert_eq!(args.output, Some(PathBuf::from("out.json")));
    assert_eq!(args.js_log, Some(PathBuf::from("scripts.json")));
    assert_eq!(args.pace, Duration::ZERO);
    assert!(args.verbose && args.debug);

    let options = args.run_options(vec!["https://example.com".into()], Some("session=abc".into()));
    assert!(options.record_script_log);
    assert_eq!(options.fetch.cookie.as_deref(), Some("session=abc"));
    assert_eq!(options.fetch.timeout, Duration::from_secs(10));
}

#[test]
fn test_cookie_file_used_without_inline_cookie() {
    let args = endpoint_args(&["-d", "example.com", "--cookie-file", "cookies.txt"]);
    assert_eq!(args.cookie, CookieSource::File(PathBuf::from("cookies.txt")));
}

#[test]
fn test_zero_concurrency_rejected() {
    let result = command_argument_builder().try_get_matches_from(["oto", "endpoint", "-d", "x.com", "-c", "0"]);
    assert!(result.is_err());
}

#[test]
fn test_emit_report_to_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("report.json");

    let mut record = oto_core::ExtractionRecord::new("https://example.com");
    record.set(Category::Critical, vec!["/admin".to_string()]);
    let report = oto_core::Report {
        records: vec![record],
        failures: Vec::new(),
    };

    let written = emit_report(&report, Some(path.as_path()), false, false).unwrap();
    let content = std::fs::read_to_string(&path)?;

    assert_eq!(written, content.len());
    assert!(content.contains("\"critical_paths\""));
    assert!(!content.contains("\"endpoints\""));
    Ok(())
}

#[test]
fn test_emit_report_unwritable_destination() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nope").join("report.json");
    let report = oto_core::Report::default();

    assert!(emit_report(&report, Some(path.as_path()), false, false).is_none());
}
