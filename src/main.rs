//! CLI entry point for the storefront client.

mod cli;

use clap::Parser;
use storefront::api::classify::validation_errors;
use storefront::api::ApiClient;
use storefront::config::load_config;
use storefront::error::ApiError;
use storefront::services::auth::{self, LoginCredentials};
use storefront::services::products;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("storefront=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();

    let mut config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    if let Some(url) = &args.base_url {
        config.api.base_url = url.clone();
    }

    let client = ApiClient::new(&config);
    if let Err(message) = run(&client, args.command).await {
        eprintln!("error: {message}");
        std::process::exit(1);
    }
}

async fn run(client: &ApiClient, command: cli::Command) -> Result<(), String> {
    match command {
        cli::Command::Login { email } => {
            let password = rpassword::prompt_password("Password: ")
                .map_err(|e| format!("failed to read password: {e}"))?;
            let credentials = LoginCredentials {
                email,
                password,
                remember: true,
            };
            let user = auth::login(client, &credentials)
                .await
                .map_err(describe_failure)?;
            println!("signed in as {} <{}>", user.name, user.email);
        }
        cli::Command::Me => {
            let user = auth::fetch_current_user(client)
                .await
                .map_err(describe_failure)?;
            println!("{} <{}>", user.name, user.email);
        }
        cli::Command::Products => {
            for product in products::list(client).await.map_err(describe_failure)? {
                println!("{:>6}  {}", product.id, product.name);
            }
        }
        cli::Command::Get { path } => {
            let value = client.get(&path).await.map_err(describe_failure)?;
            print_json(&value)?;
        }
        cli::Command::Post { path, body } => {
            let body: serde_json::Value =
                serde_json::from_str(&body).map_err(|e| format!("--json is not valid JSON: {e}"))?;
            let value = client.post(&path, &body).await.map_err(describe_failure)?;
            print_json(&value)?;
        }
    }
    Ok(())
}

/// Render a failure for the console, with field-level detail on 422.
fn describe_failure(err: ApiError) -> String {
    let mut message = err.to_string();
    if let Some(fields) = validation_errors(&err) {
        for (field, detail) in fields {
            message.push_str(&format!("\n  {field}: {detail}"));
        }
    }
    message
}

fn print_json(value: &serde_json::Value) -> Result<(), String> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|e| format!("failed to render JSON: {e}"))?;
    println!("{rendered}");
    Ok(())
}
