use clap::{Parser, ValueEnum};
use serde_json::json;
use tracing::instrument;

use super::{
    Session,
    terminal::{self, Colorize},
};

const NAME_WIDTH: usize = 32;

#[derive(Debug, Parser)]
#[command(about = "List your baked goods")]
pub struct List {
    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

/// Output format for listing.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl List {
    #[instrument(level = "debug", skip(session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        let (journal, user) = session.open()?;
        let summaries = journal.baked_goods_of(&user);

        match self.output {
            OutputFormat::Json => {
                let rows: Vec<_> = summaries
                    .iter()
                    .map(|summary| {
                        let baked_good = summary.baked_good;
                        json!({
                            "uuid": baked_good.uuid(),
                            "name": baked_good.name(),
                            "description": baked_good.description(),
                            "iterations": summary.iteration_count,
                            "cover_photo": summary.cover_photo.and_then(|photo| journal.display_url(photo)),
                            "created": baked_good.created(),
                            "updated": baked_good.updated(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            }
            OutputFormat::Table => {
                if summaries.is_empty() {
                    println!("No baked goods yet. Create one with `crumb new <NAME>`.");
                    return Ok(());
                }

                if terminal::is_narrow() {
                    for summary in &summaries {
                        println!(
                            "{} ({})",
                            summary.baked_good.name(),
                            summary.iteration_count
                        );
                    }
                    return Ok(());
                }

                println!(
                    "{}",
                    format!(
                        "{:<NAME_WIDTH$}  {:>10}  {:<12}  {}",
                        "NAME", "ITERATIONS", "CREATED", "UUID"
                    )
                    .dim()
                );
                for summary in &summaries {
                    let baked_good = summary.baked_good;
                    let uuid = baked_good.uuid().to_string();
                    println!(
                        "{:<NAME_WIDTH$}  {:>10}  {:<12}  {}",
                        terminal::truncate(baked_good.name(), NAME_WIDTH),
                        summary.iteration_count,
                        terminal::format_date(baked_good.created().date_naive()),
                        uuid[..8].dim()
                    );
                }
            }
        }

        Ok(())
    }
}
