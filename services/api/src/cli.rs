use crate::demo::{run_demo, run_rank, run_simulate, DemoArgs, RankArgs, SimulateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use fleet_induction::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Fleet Induction Planner",
    about = "Rank, simulate, and serve metro trainset induction decisions",
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
    /// Rank the fleet or run a what-if simulation from the command line
    Induction {
        #[command(subcommand)]
        command: InductionCommand,
    },
    /// Walk through listing, ranking, simulation, and suggestions on a fleet
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum InductionCommand {
    /// Print the ranked induction list with optional filters and paging
    Rank(RankArgs),
    /// Re-run the decision rules under override toggles and print the impact
    Simulate(SimulateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Roster CSV used to seed the fleet (overrides FLEET_SEED_CSV)
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Induction {
            command: InductionCommand::Rank(args),
        } => run_rank(args),
        Command::Induction {
            command: InductionCommand::Simulate(args),
        } => run_simulate(args),
        Command::Demo(args) => run_demo(args),
    }
}
