//! CLI commands and argument parsing

use crate::types::Method;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line client for the Canvas LMS REST API
#[derive(Parser, Debug)]
#[command(name = "canvas-api")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the API, e.g. https://canvas.example.edu/api/v1
    #[arg(long, global = true, env = "CANVAS_API_URL")]
    pub url: Option<String>,

    /// Access token sent as a bearer credential
    #[arg(long, global = true, env = "CANVAS_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    pub timeout: u64,

    /// Retries for idempotent requests
    #[arg(long, global = true, default_value = "2")]
    pub retries: u32,

    /// Extra header sent with every request (`name:value`)
    #[arg(short = 'H', long = "header", global = true, value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Pretty-print JSON output
    #[arg(short, long, global = true)]
    pub pretty: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// GET a single, non-paginated resource
    Get {
        endpoint: String,

        /// Query parameter (`key=value`, `key[]=value` for arrays)
        #[arg(short, long = "query", value_parser = parse_pair)]
        query: Vec<(String, String)>,
    },

    /// Print every element of every page, one JSON value per line
    Items {
        endpoint: String,

        /// Query parameter (`key=value`, `key[]=value` for arrays)
        #[arg(short, long = "query", value_parser = parse_pair)]
        query: Vec<(String, String)>,

        /// Stop after this many elements
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print every page body, one JSON value per line
    Pages {
        endpoint: String,

        /// Query parameter (`key=value`, `key[]=value` for arrays)
        #[arg(short, long = "query", value_parser = parse_pair)]
        query: Vec<(String, String)>,
    },

    /// Send a POST, PUT, PATCH or DELETE request
    Request {
        method: Method,

        endpoint: String,

        /// JSON request body
        #[arg(long)]
        body: Option<String>,
    },

    /// Upload a file as multipart/form-data
    Upload {
        endpoint: String,

        file: PathBuf,

        /// Form field sent before the file (`key=value`)
        #[arg(short, long = "field", value_parser = parse_pair)]
        field: Vec<(String, String)>,
    },

    /// Start a SIS import from a CSV or ZIP file
    SisImport { file: PathBuf },
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    raw.split_once(':')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected name:value, got '{raw}'"))
}
