/// Create or list accounts directly in the database.
/// Needed once to bootstrap the first administrator.
///
/// Usage:
///   manage-users create --name "Admin User" --email admin@example.com --password ... --admin
///   manage-users list

use clap::{Parser, Subcommand};

use mealplan_api::{db, models::user::UserRole, services::users::UserService};

#[derive(Parser)]
#[command(name = "manage-users", about = "Manage meal planner accounts")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Give the account the admin role
        #[arg(long)]
        admin: bool,
    },
    /// List all accounts
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable not set"))?;
    let pool = db::create_pool(&database_url).await?;
    db::run_migrations(&pool).await?;

    match args.command {
        Command::Create { name, email, password, admin } => {
            let role = if admin { UserRole::Admin } else { UserRole::User };
            let user = UserService::create(&pool, &name, &email, &password, role).await?;
            println!("Created {} {} <{}> ({})", role, user.name, user.email, user.id);
        }
        Command::List => {
            let users = UserService::list(&pool).await?;
            tracing::info!("{} account(s)", users.len());
            for u in users {
                println!("{}\t{}\t{}\t{}", u.id, u.role, u.email, u.name);
            }
        }
    }

    Ok(())
}
