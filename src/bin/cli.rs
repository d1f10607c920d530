use clap::{Args, Parser, Subcommand};
use jornalista360::{
    cli::{
        auth,
        db::{db_list, db_migrate, db_revert},
    },
    core::db::{close_pool, init_pool},
    settings::get_config,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database related command
    Db(DbArgs),
    /// Authentication related command
    Auth(AuthArgs),
}

#[derive(Debug, Args)]
struct AuthArgs {
    #[command(subcommand)]
    command: AuthCommands,
}

#[derive(Debug, Subcommand)]
enum AuthCommands {
    /// Open a session for an identity and print its token pair
    IssueToken {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        image: Option<String>,
    },
}

#[derive(Debug, Args)]
struct DbArgs {
    #[command(subcommand)]
    command: DbCommands,
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// List all migration
    List,
    /// Run all pending migration
    Migrate,
    /// Revert latest migration
    Revert,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();
    let config = get_config();
    let pool = init_pool(&config).await?;
    match &cli.command {
        Commands::Db(db_args) => match &db_args.command {
            DbCommands::List => {
                println!("list migration");
                for item in db_list(&pool).await? {
                    let status = if item.applied { "applied" } else { "pending" };
                    println!("{} {} ({})", item.version, item.description, status);
                }
            }
            DbCommands::Migrate => {
                println!("run all pending migration");
                db_migrate(&pool).await?;
            }
            DbCommands::Revert => {
                println!("revert latest migration");
                match db_revert(&pool).await? {
                    Some(version) => println!("reverted {version}"),
                    None => println!("nothing to revert"),
                }
            }
        },
        Commands::Auth(auth_args) => match &auth_args.command {
            AuthCommands::IssueToken { email, name, image } => {
                println!("issue token: {email:?}");
                let client = redis::Client::open(config.redis_url.clone())?;
                let mut redis_conn = client.get_connection()?;
                let tokens = auth::issue_token(
                    &pool,
                    &mut redis_conn,
                    &config,
                    email,
                    name.clone(),
                    image.clone(),
                )
                .await?;
                println!("token: {}", tokens.token);
                println!("refresh_token: {}", tokens.refresh_token);
            }
        },
    }
    close_pool(&pool).await;
    Ok(())
}
