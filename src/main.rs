use bitebill_lib::cli::{self, Cli};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    bitebill_lib::init_logger();

    match cli::run(&cli).await {
        Ok(json) => println!("{json}"),
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
