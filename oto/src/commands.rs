use clap::{arg, command};
use std::path::PathBuf;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub const DEFAULT_RESULT_TYPES: &str = "endpoint,path,info,critical,sensitive";

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("oto")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("oto")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("endpoint")
                .about("Extract endpoints, paths and secrets from HTML/JS source of one or many targets")
                .arg(
                    arg!(-d --"domain" <DOMAIN>)
                        .required(false)
                        .help("Target domain or URL (required if --list is not set)"),
                )
                .arg(
                    arg!(-l --"list" <PATH>)
                        .required(false)
                        .help("Newline-delimited file of targets (required if --domain is not set)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-t --"result-types" <TYPES>)
                        .required(false)
                        .help("Comma-separated result types: endpoint, path, info, critical, sensitive")
                        .value_delimiter(',')
                        .default_value(DEFAULT_RESULT_TYPES),
                )
                .arg(
                    arg!(-c --"concurrency" <NUM>)
                        .required(false)
                        .help("Maximum number of fetches in flight during harvest")
                        .value_parser(clap::value_parser!(u64).range(1..))
                        .default_value("5"),
                )
                .arg(
                    arg!(-T --"timeout" <SECONDS>)
                        .required(false)
                        .help("Per-request timeout in seconds")
                        .value_parser(clap::value_parser!(u64).range(1..))
                        .default_value("5"),
                )
                .arg(
                    arg!(-p --"proxy" <URL>)
                        .required(false)
                        .help("Route all requests through this proxy (http, https or socks URL)"),
                )
                .arg(
                    arg!(--"cookie" <COOKIE>)
                        .required(false)
                        .help("Cookie header value sent with every request"),
                )
                .arg(
                    arg!(--"cookie-file" <PATH>)
                        .required(false)
                        .help("File holding the Cookie header value (ignored when --cookie is set)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Write the JSON report to this file (default: stdout)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-j --"js-log" <PATH>)
                        .required(false)
                        .help("Write the seed -> discovered scripts map to this file")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--"pace-ms" <MILLIS>)
                        .required(false)
                        .help("Minimum delay between seed requests during discovery (0 disables)")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("500"),
                )
                .arg(arg!(-v --"verbose" "Print each discovered script and fetched target").required(false))
                .arg(arg!(-D --"debug" "Print diagnostics for every failed target").required(false)),
        )
}
