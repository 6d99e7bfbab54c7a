use crate::demo::{run_demo, run_geocode, DemoArgs, GeocodeArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use renthub::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "RentHub",
    about = "Run the RentHub rental listing service or exercise its workflows from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Seed an in-memory store and walk a property from listing to accepted offer
    Demo(DemoArgs),
    /// Look up address suggestions through the configured geocoder
    Geocode(GeocodeArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args),
        Command::Geocode(args) => run_geocode(args).await,
    }
}
