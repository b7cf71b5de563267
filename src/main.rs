mod cache;
mod cli;
mod client;
mod commands;
mod config;
mod error;
mod form;
mod output;
mod resources;
mod responses;
mod tokens;
mod types;

use std::error::Error;
use std::io;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cache::ViewCache;
use cli::{Cli, Commands, ProjectCommands};
use client::{ApiClient, PromptLogin, LOGIN_ROUTE};
use config::Config;
use error::Result;
use tokens::{Credentials, TokenStore};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_tracing(verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {e}", "Error:".red().bold());

        if verbose {
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("Caused by: {cause}");
                source = cause.source();
            }
        }

        std::process::exit(1);
    }
}

/// Logs go to stderr so they never mix with JSON on stdout.
fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,catalog_admin=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("CATALOG_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    output::set_format(cli.output_format());
    output::set_quiet(cli.quiet);

    match cli.command {
        // Commands that don't require config/client
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "catalog", &mut io::stdout());
            Ok(())
        }
        Commands::Init => commands::init::run(),
        command => {
            let config = Config::load()?;
            let http = reqwest::Client::builder()
                .timeout(config.timeout())
                .build()?;
            let credentials = Credentials::new(TokenStore::open(Config::tokens_path()?)?);

            let route = match command {
                Commands::Login(_) => LOGIN_ROUTE.to_string(),
                _ => std::env::args().skip(1).collect::<Vec<_>>().join(" "),
            };
            let client = ApiClient::new(http, config.api_url()?, credentials)
                .with_route(route)
                .with_redirect(PromptLogin);
            let mut views = ViewCache::load(Config::cache_path()?);

            let result = dispatch(command, &client, &mut views).await;
            views.save();
            result
        }
    }
}

async fn dispatch(command: Commands, client: &ApiClient, views: &mut ViewCache) -> Result<()> {
    match command {
        Commands::Login(args) => commands::auth::login(client, args).await,
        Commands::Logout => {
            views.clear();
            commands::auth::logout(client)
        }
        Commands::Projects => commands::projects::list(client, views).await,
        Commands::Project { action } => match action {
            ProjectCommands::List => commands::projects::list(client, views).await,
            ProjectCommands::View { id } => commands::projects::view(client, views, &id).await,
            ProjectCommands::Create(args) => commands::projects::create(client, views, args).await,
            ProjectCommands::Edit(args) => commands::projects::edit(client, views, args).await,
            ProjectCommands::Delete { id, yes } => {
                commands::projects::delete(client, views, &id, yes).await
            }
        },
        Commands::Technologies => commands::technologies::list(client, views).await,
        Commands::Categories => commands::categories::list(client, views).await,
        Commands::Screenshots => commands::screenshots::list(client, views).await,
        Commands::Completions { .. } | Commands::Init => {
            // Already handled in run
            Ok(())
        }
    }
}
