//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::client::Client;
use crate::error::{Error, Result};
use crate::http::{ClientOptions, QueryParams};
use crate::types::JsonValue;
use futures::TryStreamExt;
use std::time::Duration;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let client = self.client()?;

        match &self.cli.command {
            Commands::Get { endpoint, query } => {
                let response = client.get(endpoint, &query_params(query)).await?;
                self.output(&response.body);
            }
            Commands::Items {
                endpoint,
                query,
                limit,
            } => {
                let mut items = client.list_items(endpoint, &query_params(query));
                match limit {
                    Some(limit) => {
                        for item in items.take_array(*limit).await? {
                            self.output(&item);
                        }
                    }
                    None => {
                        while let Some(item) = items.try_next().await? {
                            self.output(&item);
                        }
                    }
                }
                debug!("{} items printed", items.yielded());
            }
            Commands::Pages { endpoint, query } => {
                let mut pages = client.list_pages(endpoint, &query_params(query));
                while let Some(page) = pages.try_next().await? {
                    self.output(&page.body);
                }
            }
            Commands::Request {
                method,
                endpoint,
                body,
            } => {
                let body = match body {
                    Some(raw) => serde_json::from_str(raw)?,
                    None => JsonValue::Null,
                };
                let response = client.request(endpoint, *method, body).await?;
                self.output(&response.body);
            }
            Commands::Upload {
                endpoint,
                file,
                field,
            } => {
                let response = client.upload(endpoint, file, field.clone()).await?;
                self.output(&response.body);
            }
            Commands::SisImport { file } => {
                let response = client.sis_import(file).await?;
                self.output(&response.body);
            }
        }

        Ok(())
    }

    /// Build the API client from global flags
    fn client(&self) -> Result<Client> {
        let url = self
            .cli
            .url
            .as_deref()
            .ok_or_else(|| Error::config("API URL not specified (use --url or CANVAS_API_URL)"))?;
        let token = self.cli.token.as_deref().ok_or_else(|| {
            Error::config("API token not specified (use --token or CANVAS_API_TOKEN)")
        })?;

        let mut builder = ClientOptions::builder()
            .timeout(Duration::from_secs(self.cli.timeout))
            .max_retries(self.cli.retries);
        for (name, value) in &self.cli.headers {
            builder = builder.header(name, value);
        }

        Client::with_options(url, token, builder.build())
    }

    /// Output a JSON value
    fn output(&self, value: &JsonValue) {
        println!("{}", render(value, self.cli.pretty));
    }
}

fn render(value: &JsonValue, pretty: bool) -> String {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    rendered.unwrap_or_default()
}

/// Turn `key=value` pairs into query parameters
///
/// Keys ending in `[]` accumulate into an array parameter.
fn query_params(pairs: &[(String, String)]) -> QueryParams {
    let mut params = QueryParams::new();
    for (key, value) in pairs {
        match key.strip_suffix("[]") {
            Some(key) => params.push(key, value),
            None => params = params.param(key, value),
        }
    }
    params
}
