use oto::banner::print_banner;
use oto::commands::command_argument_builder;
use oto::handlers::handle_endpoint;

#[tokio::main]
async fn main() {
    let matches = command_argument_builder().get_matches();
    let quiet = matches.get_flag("quiet");

    if !quiet {
        print_banner();
    }

    match matches.subcommand() {
        Some(("endpoint", sub_matches)) => handle_endpoint(sub_matches, quiet).await,
        _ => {
            let _ = command_argument_builder().print_help();
        }
    }
}
