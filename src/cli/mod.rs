use clap::{Parser, Subcommand};

/// `blindchat` - Anonymous two-party chat where one side might be a bot.
#[derive(Parser, Debug)]
#[command(name = "blindchat")]
#[command(version)]
#[command(about = "Anonymous chat sessions with a human-or-bot guessing game.", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Port to listen on (use 0 for random available port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },

    /// Print the effective configuration (secrets redacted)
    Config,
}
