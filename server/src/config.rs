use clap::Parser;

/// Command-line arguments for the relay server.
#[derive(Debug, Clone, Parser)]
#[command(name = "whiteboard-server")]
#[command(about = "Relay server for the shared whiteboard")]
#[command(version)]
pub struct Config {
    /// Interface to bind
    #[arg(long, env = "WHITEBOARD_HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Outbound messages queued per connection before new ones are dropped
    #[arg(long, env = "WHITEBOARD_CONNECTION_BUFFER", default_value_t = 64)]
    pub connection_buffer: usize,

    /// Commands queued for the server task
    #[arg(long, env = "WHITEBOARD_SERVER_BUFFER", default_value_t = 256)]
    pub server_buffer: usize,
}
