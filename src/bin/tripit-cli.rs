use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Value};

use tripit_mcp::http::X_USER_ID;

#[derive(Parser)]
#[command(name = "tripit-cli")]
#[command(about = "Command-line client for the TripIt MCP server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8787")]
    url: String,

    /// Act as this user (sent as X-User-Id).
    #[arg(long)]
    user_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the server answers
    Ping,
    /// List available tools
    Tools,
    /// Call a tool
    Call {
        /// Tool name, e.g. tripit_list_trips
        name: String,
        /// Tool arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(user_id) = &cli.user_id {
        headers.insert(X_USER_ID, HeaderValue::from_str(user_id)?);
    }

    let (method, params) = match &cli.command {
        Commands::Ping => ("ping", None),
        Commands::Tools => ("tools/list", None),
        Commands::Call { name, args } => {
            let arguments: Value = serde_json::from_str(args)?;
            ("tools/call", Some(json!({ "name": name, "arguments": arguments })))
        }
    };

    let mut request = json!({ "jsonrpc": "2.0", "id": 1, "method": method });
    if let Some(params) = params {
        request["params"] = params;
    }

    let res = client
        .post(format!("{}/mcp", cli.url.trim_end_matches('/')))
        .headers(headers)
        .json(&request)
        .send()
        .await?;

    print_response(&cli.command, res).await
}

async fn print_response(
    command: &Commands,
    res: reqwest::Response,
) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let body: Value = match res.json().await {
        Ok(body) => body,
        Err(e) => {
            eprintln!("Error: server returned status {} with an unreadable body: {}", status, e);
            std::process::exit(1);
        }
    };

    if let Some(error) = body.get("error") {
        eprintln!("Error {}: {}", error["code"], error["message"].as_str().unwrap_or_default());
        std::process::exit(1);
    }

    let result = body.get("result").cloned().unwrap_or(Value::Null);
    match command {
        Commands::Ping => println!("ok"),
        Commands::Tools => {
            for tool in result["tools"].as_array().into_iter().flatten() {
                println!(
                    "{:<32} {}",
                    tool["name"].as_str().unwrap_or_default(),
                    tool["description"].as_str().unwrap_or_default()
                );
            }
        }
        Commands::Call { .. } => {
            for block in result["content"].as_array().into_iter().flatten() {
                println!("{}", block["text"].as_str().unwrap_or_default());
            }
            if result["isError"].as_bool().unwrap_or(false) {
                std::process::exit(2);
            }
        }
    }
    Ok(())
}
