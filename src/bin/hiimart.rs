use clap::Parser;
use hiimart_store::cli::Cli;

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    hiimart_store::telemetry::init();

    let cli = Cli::parse();

    if let Err(e) = hiimart_store::cli::run(cli) {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }

    Ok(())
}
