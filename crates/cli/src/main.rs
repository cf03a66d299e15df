use anyhow::Context;
use catalog_app::{policy::catalog_policy, Catalog};
use catalog_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Book catalog service", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Migrate, seed and serve HTTP until interrupted (default)
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Apply migrations, seed roles and the administrator, then exit
    Seed,
    /// Print the route policy table
    Policy,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Serve);

    if command == Command::Policy {
        print_policy();
        return Ok(());
    }

    let settings = Settings::load().context("failed to load catalog settings")?;
    catalog_telemetry::init(&settings.telemetry)?;

    let catalog = Catalog::connect(settings).await?;

    match command {
        Command::Serve => catalog.serve().await,
        Command::Migrate => {
            let applied = catalog.migrate().await?;
            tracing::info!(applied, "migrate finished");
            Ok(())
        }
        Command::Seed => {
            catalog.migrate().await?;
            catalog.init().await?;
            tracing::info!("seed finished");
            Ok(())
        }
        Command::Policy => Ok(()),
    }
}

fn print_policy() {
    let policy = catalog_policy();
    println!("scope {} (unlisted routes require a token)", policy.scope());
    for rule in policy.rules() {
        println!("{:<7} {:<28} {}", rule.method, rule.pattern, rule.requirement);
    }
}
