//! Offline helpers that need no journal.

use clap::{Parser, ValueEnum};
use crumb::domain::{Formula, substitution};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Baker's percentages for the default formula")]
pub struct Calc {
    /// Target total flour weight in grams (defaults to the formula's own)
    #[arg(short, long)]
    flour: Option<f64>,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Calc {
    #[instrument(level = "debug")]
    pub fn run(self) -> anyhow::Result<()> {
        let formula = Formula::default();
        let flour = self.flour.unwrap_or_else(|| formula.base_flour());
        if !flour.is_finite() || flour < 0.0 {
            anyhow::bail!("Flour weight must be a non-negative number (got {flour})");
        }
        let scaled = formula.at_flour(flour);

        if self.output == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&scaled)?);
            return Ok(());
        }

        println!(
            "{}",
            format!("{:<16} {:>10}  {:>7}", "INGREDIENT", "AMOUNT", "%").dim()
        );
        for weighted in &scaled.ingredients {
            let ingredient = &weighted.ingredient;
            println!(
                "{:<16} {:>8.1} {:<2} {:>6.1}%",
                ingredient.name, ingredient.amount, ingredient.unit, weighted.percentage
            );
        }
        println!("\nHydration: {}", format!("{}%", scaled.hydration).info());
        Ok(())
    }
}

#[derive(Debug, Parser)]
#[command(about = "Look up ingredient substitutions")]
pub struct Subs {
    /// Filter by ingredient or substitute (case-insensitive)
    query: Option<String>,
}

impl Subs {
    #[instrument(level = "debug")]
    pub fn run(self) -> anyhow::Result<()> {
        let query = self.query.unwrap_or_default();
        let mut found = false;

        for entry in substitution::search(&query) {
            found = true;
            println!("{}", entry.ingredient.info());
            println!("  Use:  {}", entry.substitute);
            println!("  {}", entry.notes.dim());
        }

        if !found {
            println!("No substitutions match '{query}'.");
        }
        Ok(())
    }
}
