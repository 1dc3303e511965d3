use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "dynroute-cli")]
#[command(about = "Management CLI for a running dynroute server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8080")]
    url: String,

    /// Bearer token for the registration endpoint.
    #[arg(short, long)]
    token: Option<String>,

    #[arg(long, default_value = "/__test__")]
    test_endpoint: String,

    #[arg(long, default_value = "/__register__")]
    registration_endpoint: String,

    #[arg(long, default_value = "/__get_endpoints__")]
    endpoints_endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the server answers its probe
    Test,
    /// List registered endpoints
    Endpoints,
    /// Register an endpoint backed by a handler source file
    Register {
        endpoint: String,
        source: String,
        /// Skip registration when the endpoint is already listed
        #[arg(long)]
        if_missing: bool,
    },
    /// Call a registered endpoint
    Call {
        endpoint: String,
        /// Query parameter as key=value, repeatable
        #[arg(short, long = "param", value_parser = parse_param)]
        param: Vec<(String, String)>,
    },
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got \"{}\"", s))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Test => {
            let res = client
                .get(format!("{}{}", base, cli.test_endpoint))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Endpoints => {
            let res = client
                .get(format!("{}{}", base, cli.endpoints_endpoint))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Register {
            endpoint,
            source,
            if_missing,
        } => {
            if if_missing {
                let listed: Vec<String> = client
                    .get(format!("{}{}", base, cli.endpoints_endpoint))
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                if listed.contains(&endpoint) {
                    println!("{} already registered", endpoint);
                    return Ok(());
                }
            }

            let mut headers = HeaderMap::new();
            if let Some(token) = &cli.token {
                headers.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&format!("Bearer {}", token))?,
                );
            }
            let res = client
                .post(format!("{}{}", base, cli.registration_endpoint))
                .headers(headers)
                .form(&[("endpoint", endpoint.as_str()), ("path_to_source", source.as_str())])
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Call { endpoint, param } => {
            let res = client
                .get(format!("{}{}", base, endpoint))
                .query(&param)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        eprintln!("Response: {}", text);
        std::process::exit(1);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) if json.is_array() || json.is_object() => {
            println!("{}", serde_json::to_string_pretty(&json)?)
        }
        _ => println!("{}", text),
    }
    Ok(())
}
