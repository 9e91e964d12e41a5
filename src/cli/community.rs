use clap::Parser;
use tracing::instrument;

use super::{
    Session,
    terminal::{self, Colorize},
};

#[derive(Debug, Parser)]
#[command(about = "Show the most recent baked goods of every baker")]
pub struct Community {
    /// How many baked goods to show (defaults to the configured limit)
    #[arg(short = 'n', long)]
    limit: Option<usize>,
}

impl Community {
    #[instrument(level = "debug", skip(session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        let journal = session.journal()?;
        let limit = self.limit.unwrap_or(journal.config().community_limit);
        let entries = journal.community_feed(limit);

        if entries.is_empty() {
            println!("Nothing has been baked yet.");
            return Ok(());
        }

        for entry in entries {
            let baked_good = entry.baked_good;
            println!(
                "{}  {}",
                baked_good.name(),
                format!("by {}", entry.author_name).dim()
            );
            if let Some(description) = baked_good.description() {
                println!("  {}", terminal::truncate(description, 72));
            }
            println!(
                "  {}",
                terminal::format_date(baked_good.created().date_naive()).dim()
            );
        }
        Ok(())
    }
}
