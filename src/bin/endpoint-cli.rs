use clap::{Parser, Subcommand};
use serde_json::Value;

use universal_endpoint::config::load_config;
use universal_endpoint::demo::{DemoService, FooRequest};
use universal_endpoint::{CallError, ClientProxy, RequestEnvelope};

#[derive(Parser)]
#[command(name = "endpoint-cli")]
#[command(about = "Call the demo service through the client proxy", long_about = None)]
struct Cli {
    /// Base URL of the server (overrides the config file).
    #[arg(short, long)]
    url: Option<String>,

    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Bearer token sent as the Authorization header.
    #[arg(short, long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Greet someone
    Foo { name: String, age: f64 },
    /// Send a number
    Number { n: f64 },
    /// Largest of at least two numbers
    Max {
        #[arg(required = true, num_args = 2..)]
        nums: Vec<f64>,
    },
    /// Call the no-argument operation
    Bar,
    /// Call any operation by name with a JSON argument
    Raw {
        operation: String,
        #[arg(default_value = "null")]
        argument: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Default::default(),
    };
    let base_url = cli.url.unwrap_or(config.client.base_url);

    let demo = DemoService::define()?;
    let client = ClientProxy::new(&demo.service, &base_url)?;

    let token = cli.token.as_deref();

    let result: Result<Value, CallError> = match cli.command {
        Commands::Foo { name, age } => demo
            .foo
            .call(&client, authorize(FooRequest { name, age }, token))
            .await
            .map(|r| Value::String(r.message)),
        Commands::Number { n } => demo
            .primitive_number
            .call(&client, authorize(n, token))
            .await
            .map(Value::String),
        Commands::Max { nums } => demo
            .max
            .call(&client, authorize(nums, token))
            .await
            .map(Value::from),
        Commands::Bar => demo
            .bar
            .call(&client, authorize((), token))
            .await
            .map(Value::String),
        Commands::Raw {
            operation,
            argument,
        } => {
            let argument: Value = serde_json::from_str(&argument)?;
            client.call(&operation, authorize(argument, token)).await
        }
    };

    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(CallError::Transport {
            status,
            message,
            body,
        }) => {
            eprintln!("Error: server returned {} {}", status, message);
            if !body.is_empty() {
                eprintln!("Response: {}", body);
            }
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

fn authorize<T>(payload: T, token: Option<&str>) -> RequestEnvelope<T> {
    let envelope = RequestEnvelope::<T>::from(payload);
    match token {
        Some(token) => envelope.with_header("authorization", format!("Bearer {token}")),
        None => envelope,
    }
}
