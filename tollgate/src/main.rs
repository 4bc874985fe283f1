use std::process::ExitCode;

use clap::Parser;
use tollgate::{
    CancellationToken, EmailSender, Error, MailerConfig, SqliteStorageConfig, SqliteUserTable,
    TollgateError, User, UserId, UserRepository, UserStore, dispose_after, email_sender,
    sqlite_user_store,
};

/// Command line interface for Tollgate
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database connection string, overrides TOLLGATE_DATABASE_URL
    #[arg(long)]
    db_url: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(clap::Subcommand)]
enum Commands {
    /// Create the users table if it does not exist
    Migrate,
    /// Create a user
    CreateUser {
        /// User id, a random one is generated when omitted
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        user_name: String,
    },
    /// Look up a user by id or by name
    FindUser {
        #[arg(long, conflicts_with = "name", required_unless_present = "name")]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Change a user's name
    RenameUser {
        #[arg(long)]
        id: String,
        #[arg(long)]
        user_name: String,
    },
    /// Delete a user
    DeleteUser {
        #[arg(long)]
        id: String,
    },
    /// Send an email using the MAILER_* configuration
    SendEmail {
        #[arg(long)]
        to: String,
        #[arg(long)]
        subject: String,
        /// HTML body
        #[arg(long)]
        body: String,
    },
    /// Print version information
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    match run(cli, &cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, cancel: &CancellationToken) -> Result<(), TollgateError> {
    match cli.command {
        Commands::Version => {
            println!("Tollgate v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::SendEmail { to, subject, body } => {
            let sender = email_sender(&MailerConfig::from_env()?)?;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(Error::Cancelled.into()),
                result = sender.send(&to, &subject, &body) => {
                    result?;
                    println!("Sent '{subject}' to {to}");
                    Ok(())
                }
            }
        }
        command => {
            let mut config = SqliteStorageConfig::from_env()?;
            if let Some(db_url) = cli.db_url {
                config.database_url = db_url;
            }
            if config.is_in_memory() {
                tracing::warn!("Using an in-memory database, nothing will be persisted");
            }

            let store = sqlite_user_store(&config).await?;
            dispose_after(&store, run_store_command(&store, command, cancel))
                .await
                .map_err(Into::into)
        }
    }
}

async fn run_store_command(
    store: &UserStore<SqliteUserTable>,
    command: Commands,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    match command {
        Commands::Migrate => {
            store.repository().health_check().await?;
            println!(
                "Users table '{}' is ready",
                store.repository().table_name()
            );
        }
        Commands::CreateUser { id, user_name } => {
            let id = id.map(UserId::from).unwrap_or_else(UserId::new_random);
            let mut user = User::new(id, user_name.as_str());
            store.create(&mut user, cancel).await?;
            print_user(&user);
        }
        Commands::FindUser { id, name } => {
            let found = match (id, name) {
                (Some(id), _) => store.find_by_id(&id, cancel).await?,
                (None, Some(name)) => {
                    store
                        .find_by_name(&store.normalize_name(&name), cancel)
                        .await?
                }
                (None, None) => None,
            };
            match found {
                Some(user) => print_user(&user),
                None => println!("No matching user"),
            }
        }
        Commands::RenameUser { id, user_name } => {
            let mut user = store
                .find_by_id(&id, cancel)
                .await?
                .ok_or(tollgate::StorageError::NotFound)?;
            store.set_user_name(&mut user, &user_name)?;
            store.update(&mut user, cancel).await?;
            print_user(&user);
        }
        Commands::DeleteUser { id } => {
            let user = match store.find_by_id(&id, cancel).await? {
                Some(user) => user,
                // Let the table's delete policy decide what a missing user means.
                None => User::new(UserId::new(&id), id.as_str()),
            };
            store.delete(&user, cancel).await?;
            println!("Deleted user {id}");
        }
        Commands::Version | Commands::SendEmail { .. } => {}
    }
    Ok(())
}

fn print_user(user: &User) {
    println!("id:                   {}", user.id());
    println!("user_name:            {}", user.user_name());
    println!(
        "normalized_user_name: {}",
        user.normalized_user_name().unwrap_or("-")
    );
    println!("etag:                 {}", user.etag());
    println!("updated_at:           {}", user.updated_at().to_rfc3339());
}
