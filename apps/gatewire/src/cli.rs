use clap::Parser;

/// Process bootstrap flags. Everything else (providers, credentials,
/// clients, aliases, remap rules) is catalog data, managed out of band —
/// this binary has no admin surface of its own.
#[derive(Debug, Clone, Parser)]
#[command(name = "gatewire", version, about = "A multi-provider LLM gateway.")]
pub struct CliArgs {
    /// Database DSN.
    #[arg(long, env = "GATEWIRE_DSN")]
    pub dsn: Option<String>,

    /// Bind host.
    #[arg(long, env = "GATEWIRE_HOST")]
    pub host: Option<String>,

    /// Bind port.
    #[arg(long, env = "GATEWIRE_PORT")]
    pub port: Option<u16>,

    /// Admin key (plaintext). Stored as a hash; never persisted in the
    /// clear.
    #[arg(long, env = "GATEWIRE_ADMIN_KEY")]
    pub admin_key: Option<String>,

    /// Optional outbound proxy used for upstream egress.
    #[arg(long, env = "GATEWIRE_PROXY")]
    pub proxy: Option<String>,
}
