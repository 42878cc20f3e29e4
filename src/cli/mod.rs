pub mod commands;
pub mod output;

use crate::config::load_settings;
use crate::errors::Result;
use clap::{Parser, Subcommand};
use commands::authorize::OAuthProviderArg;
use commands::request_login::RequestLoginArgs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scm-sync")]
#[command(about = "Source code provider OAuth setup helpers")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Settings file, layered over the user and local config files
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a consumer key and RSA key pair for a Bitbucket Server application link
    GenerateKeys {
        /// RSA modulus size (defaults to bitbucket_server.key_bits)
        #[arg(long)]
        bits: Option<usize>,
    },

    /// Print the OAuth authorize URL for a GitHub or Bitbucket Cloud app
    AuthorizeUrl {
        #[arg(long, value_enum)]
        provider: OAuthProviderArg,

        #[arg(long)]
        client_id: String,

        /// GitHub Enterprise host (defaults to github.com)
        #[arg(long)]
        hostname: Option<String>,

        /// Use http instead of https
        #[arg(long)]
        no_tls: bool,

        /// Open the URL in a browser
        #[arg(long)]
        open: bool,
    },

    /// Fetch a Bitbucket Server request token and print the login URL
    RequestLogin {
        #[arg(long)]
        hostname: String,

        #[arg(long)]
        consumer_key: String,

        /// PKCS#1 PEM private key registered with the application link
        #[arg(long)]
        private_key_file: PathBuf,

        #[arg(long)]
        redirect_url: String,

        /// Use http instead of https
        #[arg(long)]
        no_tls: bool,
    },

    /// Show version information
    Version,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        self.setup_logging();

        let settings = load_settings(self.config.as_deref())?;

        match self.command {
            Commands::GenerateKeys { bits } => commands::keys::run(&settings, bits).await,
            Commands::AuthorizeUrl {
                provider,
                client_id,
                hostname,
                no_tls,
                open,
            } => {
                commands::authorize::run(
                    &settings,
                    provider,
                    &client_id,
                    hostname.as_deref(),
                    !no_tls,
                    open,
                )
                .await
            }
            Commands::RequestLogin {
                hostname,
                consumer_key,
                private_key_file,
                redirect_url,
                no_tls,
            } => {
                commands::request_login::run(
                    &settings,
                    RequestLoginArgs {
                        hostname: &hostname,
                        tls: !no_tls,
                        consumer_key: &consumer_key,
                        private_key_file: &private_key_file,
                        redirect_url: &redirect_url,
                    },
                )
                .await
            }
            Commands::Version => commands::version::run().await,
        }
    }

    fn setup_logging(&self) {
        let level = if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };

        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr);

        if self.no_color {
            subscriber.with_ansi(false).init();
        } else {
            subscriber.init();
        }
    }
}
