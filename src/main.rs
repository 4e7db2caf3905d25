use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use vitrine::cli::{Cli, Commands, ConfigAction, OutputOptions};
use vitrine::commands::{
    ListOptions, cmd_config_get, cmd_config_set, cmd_config_show, cmd_create, cmd_delete,
    cmd_list, cmd_show, cmd_update, cmd_url,
};

/// `RUST_LOG` wins; otherwise `--verbose` shows the engine's debug output.
fn init_tracing(verbose: bool) {
    let default = if verbose { "vitrine=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::List {
            resource,
            search,
            filters,
            sort,
            page,
            url,
            json,
        } => {
            let options = ListOptions {
                search,
                filters,
                sort,
                page,
                url,
            };
            cmd_list(resource, options, OutputOptions::new(json)).await
        }
        Commands::Url {
            resource,
            query,
            json,
        } => cmd_url(resource, &query, OutputOptions::new(json)),
        Commands::Show { resource, id, json } => {
            cmd_show(resource, id, OutputOptions::new(json)).await
        }
        Commands::Create {
            resource,
            fields,
            json,
        } => cmd_create(resource, &fields, OutputOptions::new(json)).await,
        Commands::Update {
            resource,
            id,
            fields,
            json,
        } => cmd_update(resource, id, &fields, OutputOptions::new(json)).await,
        Commands::Delete { resource, id, json } => {
            cmd_delete(resource, id, OutputOptions::new(json)).await
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { json } => cmd_config_show(OutputOptions::new(json)),
            ConfigAction::Set { key, value, json } => {
                cmd_config_set(&key, &value, OutputOptions::new(json))
            }
            ConfigAction::Get { key, json } => cmd_config_get(&key, OutputOptions::new(json)),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
