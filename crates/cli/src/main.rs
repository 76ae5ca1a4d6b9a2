use anyhow::Context;
use bookshelf_app::App;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bookshelf", version, about = "Bookshelf book catalogue API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Migrate, initialize modules and serve the HTTP API
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Create an API user
    CreateUser {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Fill the catalogue with randomly generated books
    SeedBooks {
        #[arg(long, default_value_t = 100)]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().context("failed to load Bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Serve => App::bootstrap(settings).await?.serve().await,
        Command::Migrate => {
            let applied = bookshelf_app::migrate_only(&settings).await?;
            tracing::info!(applied, "migrations complete");
            Ok(())
        }
        Command::CreateUser {
            name,
            email,
            password,
        } => {
            let app = App::bootstrap(settings).await?;
            let user = app.create_user(&name, &email, &password).await?;
            tracing::info!(user_id = user.id, email = %user.email, "user created");
            app.db.close().await;
            Ok(())
        }
        Command::SeedBooks { count } => {
            let app = App::bootstrap(settings).await?;
            let seeded = app.seed_books(count).await?;
            tracing::info!(seeded, "books seeded");
            app.db.close().await;
            Ok(())
        }
    }
}
