use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gatectl")]
#[command(about = "Management CLI for the admission gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:4000")]
    url: String,

    /// Bearer token for protected operations.
    #[arg(short, long, env = "GATECTL_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Obtain a signed token for a name and role
    Enroll {
        #[arg(long)]
        name: String,
        #[arg(long)]
        role: String,
    },
    /// List all records
    List,
    /// Create a record (requires the admin role)
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        price: i64,
        #[arg(long, default_value = "")]
        isbn: String,
        #[arg(long, default_value_t = 0)]
        published_year: i32,
        #[arg(long, default_value = "")]
        category: String,
    },
    /// Delete one record by id (requires the admin role)
    Delete { id: String },
    /// Delete every record (requires the admin role)
    Purge,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
    }

    let res = match cli.command {
        Commands::Enroll { name, role } => {
            client.post(format!("{}/auth/token", cli.url))
                .json(&json!({ "name": name, "role": role }))
                .send()
                .await?
        }
        Commands::List => {
            client.get(format!("{}/records", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Create { title, author, price, isbn, published_year, category } => {
            client.post(format!("{}/records", cli.url))
                .headers(headers)
                .json(&json!({
                    "title": title,
                    "author": author,
                    "price": price,
                    "isbn": isbn,
                    "published_year": published_year,
                    "category": category,
                }))
                .send()
                .await?
        }
        Commands::Delete { id } => {
            client.delete(format!("{}/records/{}", cli.url, id))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Purge => {
            client.delete(format!("{}/records", cli.url))
                .headers(headers)
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    match json {
        Value::String(s) => println!("{}", s),
        other => println!("{}", serde_json::to_string_pretty(&other)?),
    }
    Ok(())
}
