mod commands;
mod terminal;

use commands::{CommandLine, Commands, bootstrap, discover};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    let out = commands.output();

    logging::init_logging(commands.verbose, commands.quiet);
    print::banner(out.no_banner, out.quiet);

    match &commands.command {
        Commands::Discover { targets, tuning } => {
            print::header("discovering devices", out.quiet);
            discover::discover(targets, tuning, out).await
        }
        Commands::Bootstrap {
            targets,
            tuning,
            require,
            drop_failed,
        } => {
            print::header("bootstrapping devices", out.quiet);
            bootstrap::bootstrap(targets, tuning, *require, *drop_failed, out).await
        }
    }
}
