use clap::{Args, Subcommand};
use orderly_app::{
    database,
    messaging::{PgTransport, transport::DEFAULT_QUEUE},
};

#[derive(Debug, Args)]
pub(crate) struct FailedCommand {
    #[command(subcommand)]
    command: FailedSubcommand,
}

#[derive(Debug, Subcommand)]
enum FailedSubcommand {
    /// List failed messages
    List(ListFailedArgs),

    /// Put a failed message back on its queue
    Retry(RetryFailedArgs),
}

#[derive(Debug, Args)]
pub(crate) struct ListFailedArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Queue to inspect
    #[arg(long, env = "MESSENGER_QUEUE", default_value = DEFAULT_QUEUE)]
    queue: String,
}

#[derive(Debug, Args)]
pub(crate) struct RetryFailedArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Failed message id
    id: i64,
}

pub(crate) async fn run(command: FailedCommand) -> Result<(), String> {
    match command.command {
        FailedSubcommand::List(args) => list(args).await,
        FailedSubcommand::Retry(args) => retry(args).await,
    }
}

async fn transport(database_url: &str) -> Result<PgTransport, String> {
    database::connect(database_url)
        .await
        .map(PgTransport::new)
        .map_err(|error| format!("failed to connect to database: {error}"))
}

async fn list(args: ListFailedArgs) -> Result<(), String> {
    let messages = transport(&args.database_url)
        .await?
        .list_failed(&args.queue)
        .await
        .map_err(|error| format!("failed to list messages: {error}"))?;

    if messages.is_empty() {
        println!("no failed messages on queue {}", args.queue);
        return Ok(());
    }

    for message in messages {
        println!("id: {}", message.id);
        println!("body: {}", message.body);
        println!("attempts: {}", message.attempts);
        println!("created_at: {}", message.created_at);
        println!(
            "failed_at: {}",
            message
                .failed_at
                .map_or_else(|| "-".to_string(), |value| value.to_string())
        );
        println!("error: {}", message.last_error.as_deref().unwrap_or("-"));
        println!();
    }

    Ok(())
}

async fn retry(args: RetryFailedArgs) -> Result<(), String> {
    transport(&args.database_url)
        .await?
        .requeue_failed(args.id.into())
        .await
        .map_err(|error| format!("failed to requeue message {}: {error}", args.id))?;

    println!("message {} requeued", args.id);

    Ok(())
}
