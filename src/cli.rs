//! CLI argument parsing via clap.

use clap::{Parser, Subcommand};

/// Console client for the storefront API.
#[derive(Debug, Parser)]
#[command(name = "storefront", version)]
pub struct Args {
    /// Path to config file (default: ./storefront.toml or
    /// ~/.config/storefront/storefront.toml).
    #[arg(short = 'c', long = "config")]
    pub config: Option<String>,

    /// Override API base URL.
    #[arg(long = "base-url")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and print the authenticated user.
    Login {
        #[arg(long = "email")]
        email: String,
    },
    /// Print the currently authenticated user.
    Me,
    /// List the catalog.
    Products,
    /// Issue a GET against an API path and print the JSON response.
    Get { path: String },
    /// Issue a POST with a JSON body and print the JSON response.
    Post {
        path: String,
        #[arg(long = "json")]
        body: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn get_parses_path() {
        let args = Args::parse_from(["storefront", "get", "/products"]);
        match args.command {
            Command::Get { path } => assert_eq!(path, "/products"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn post_requires_json_body() {
        let args =
            Args::parse_from(["storefront", "post", "/orders", "--json", r#"{"qty":1}"#]);
        match args.command {
            Command::Post { path, body } => {
                assert_eq!(path, "/orders");
                assert_eq!(body, r#"{"qty":1}"#);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn base_url_override_parses() {
        let args = Args::parse_from([
            "storefront",
            "--base-url",
            "http://localhost:8000",
            "products",
        ]);
        assert_eq!(args.base_url.as_deref(), Some("http://localhost:8000"));
    }
}
