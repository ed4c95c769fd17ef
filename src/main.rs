use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::runtime::Handle;
use weatherlist_core::Config;
use weatherlist_services::{RecordField, RecordId, WeatherClient, WeatherDraft};
use weatherlist_ui::{Severity, WeatherListModel};

#[derive(Parser)]
#[command(name = "weatherlist")]
#[command(about = "Browse and edit weather records on a remote weather service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one page of all records
    List {
        /// Page to show (clamped to the pages that exist)
        #[arg(default_value_t = 1)]
        page: usize,
    },
    /// Look up the record for a city
    Search { city: String },
    /// Show every record with the given condition text
    Condition { text: String },
    /// Show every record at the given temperature
    Temperature {
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },
    /// Create a record
    Add {
        city: String,
        temperature: String,
        condition: String,
    },
    /// Change fields of an existing record and save it
    Update {
        id: RecordId,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        temperature: Option<String>,
        #[arg(long)]
        condition: Option<String>,
    },
    /// Delete a record
    Delete { id: RecordId },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    weatherlist_core::init()?;

    let (config, _) = Config::load_validated().context("Failed to load configuration")?;
    let client =
        WeatherClient::from_config(&config.service).context("Failed to create weather client")?;
    tracing::info!("Using weather service at {}", client.base_url());

    let mut model = WeatherListModel::new(Arc::new(client), Handle::current(), &config);

    match cli.command {
        Commands::List { page } => {
            model.load_all();
            model.settle().await;
            model.set_page(page);
        }
        Commands::Search { city } => {
            model.search(&city);
            model.settle().await;
        }
        Commands::Condition { text } => {
            model.search_by_condition(&text);
            model.settle().await;
        }
        Commands::Temperature { value } => {
            model.search_by_temperature(value);
            model.settle().await;
        }
        Commands::Add {
            city,
            temperature,
            condition,
        } => {
            model.load_all();
            model.settle().await;
            model.set_draft(WeatherDraft::new(city, temperature, condition));
            model.add();
            model.settle().await;
            model.set_page(usize::MAX);
        }
        Commands::Update {
            id,
            city,
            temperature,
            condition,
        } => {
            model.load_all();
            model.settle().await;
            let edits = [
                (RecordField::City, city),
                (RecordField::Temperature, temperature),
                (RecordField::Condition, condition),
            ];
            for (field, value) in edits {
                if let Some(value) = value {
                    model.edit_field(id, field, value);
                }
            }
            if !model.commit(id) {
                anyhow::bail!("No weather record with id {}", id);
            }
            model.settle().await;
        }
        Commands::Delete { id } => {
            model.load_all();
            model.settle().await;
            if !model.remove(id) {
                anyhow::bail!("No weather record with id {}", id);
            }
            model.settle().await;
        }
    }

    print_page(&model);
    Ok(())
}

fn print_page(model: &WeatherListModel) {
    let window = model.window();

    for record in model.page_records() {
        println!(
            "{:>6}  {:<20} {:>8}  {}",
            record.id, record.city, record.temperature, record.condition.text
        );
    }

    let pages: Vec<String> = window
        .page_numbers
        .iter()
        .map(|p| {
            if *p == window.current_page {
                format!("[{}]", p)
            } else {
                p.to_string()
            }
        })
        .collect();
    println!(
        "\n{} {} {}   page {} of {}, {} records",
        if window.can_prev { "<" } else { " " },
        pages.join(" "),
        if window.can_next { ">" } else { " " },
        window.current_page,
        window.total_pages,
        model.len()
    );

    if let Some(notification) = model.notification() {
        let label = match notification.severity {
            Severity::Success => "ok",
            Severity::Error => "error",
        };
        println!("{}: {}", label, notification.message);
    }
}
