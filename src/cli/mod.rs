use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the relay proxy in front of an Ollama server
    Serve {
        /// Ollama or tunnel base URL; without it /chat answers 503
        #[arg(long, env = "OLLAMA_URL")]
        upstream_url: Option<String>,

        #[arg(short, long, env = "PORT", default_value = "3000")]
        port: u16,

        /// Bind to 0.0.0.0 instead of 127.0.0.1, exposing the proxy on all network interfaces
        #[arg(long)]
        public: bool,

        /// Append every relayed prompt and reply to this file
        #[arg(long, env = "CHAT_TRANSCRIPT")]
        transcript: Option<String>,
    },

    /// Interactive terminal chat
    Chat,

    /// Send a single prompt and print the reply
    Ask {
        #[arg(required = true)]
        prompt: Vec<String>,
    },

    /// Print the stored conversation
    History {
        /// Delete the stored conversation
        #[arg(long)]
        clear: bool,

        /// Skip the confirmation prompt
        #[arg(short, long, requires = "clear")]
        yes: bool,
    },
}
