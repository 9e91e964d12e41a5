use clap::Parser;
use crumb::{
    Journal, SortOption,
    domain::{BakedGoodView, IterationView},
    storage::Loaded,
};
use serde_json::{Value, json};
use tracing::instrument;

use super::{
    Session,
    terminal::{self, Colorize},
};

#[derive(Debug, Parser)]
#[command(about = "Show a baked good with its iterations and statistics")]
pub struct Show {
    /// Name, UUID or UUID prefix of the baked good
    baked_good: String,

    /// Iteration order: date-desc, date-asc, rating-desc or rating-asc
    /// (defaults to the configured order)
    #[arg(long, value_name = "ORDER")]
    sort: Option<SortOption>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Show {
    #[instrument(level = "debug", skip(session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        let (journal, user) = session.open()?;
        let uuid = journal.resolve_baked_good(&user, &self.baked_good)?.uuid();
        let view = journal.baked_good_view(&user, uuid)?;
        let sort = self.sort.unwrap_or(journal.config().default_sort);

        match self.output {
            OutputFormat::Pretty => output_pretty(&journal, &view, sort),
            OutputFormat::Json => output_json(&journal, &view, sort)?,
        }
        Ok(())
    }
}

fn output_pretty(journal: &Journal<Loaded>, view: &BakedGoodView<'_>, sort: SortOption) {
    let baked_good = view.baked_good;
    println!("# {}", baked_good.name());
    if let Some(description) = baked_good.description() {
        println!("{description}");
    }
    println!();

    let stats = &view.stats;
    println!("{}", "Statistics".dim());
    println!("  Iterations:  {}", stats.iteration_count);
    println!(
        "  Average:     {}",
        stats
            .avg_rating
            .map_or_else(|| "unrated".to_string(), |avg| format!("{avg:.1}"))
    );
    println!("  Best:        {}", terminal::stars(stats.best_rating));
    if let Some(last) = stats.last_baked {
        println!("  Last baked:  {}", terminal::format_date(last));
    }
    if let Some(url) = view.cover_photo().and_then(|photo| journal.display_url(photo)) {
        println!("  Cover:       {url}");
    }
    println!("  UUID:        {}", baked_good.uuid());

    let iterations = view.sorted(sort);
    if iterations.is_empty() {
        println!("\nNo iterations yet. Record one with `crumb bake`.");
        return;
    }

    println!("\n{}", format!("Iterations ({})", sort.label()).dim());
    for iteration in &iterations {
        print_iteration_line(iteration);
    }
}

fn print_iteration_line(view: &IterationView<'_>) {
    let iteration = view.iteration;
    let uuid = iteration.uuid().to_string();
    let photos = match view.photo_count() {
        0 => String::new(),
        1 => " · 1 photo".to_string(),
        n => format!(" · {n} photos"),
    };
    println!(
        "  {}  {}  {} · {}{}  {}",
        terminal::format_date(iteration.bake_date()),
        terminal::stars(iteration.rating()),
        iteration.difficulty(),
        terminal::format_minutes(iteration.total_minutes()),
        photos,
        uuid[..8].dim()
    );
}

fn output_json(
    journal: &Journal<Loaded>,
    view: &BakedGoodView<'_>,
    sort: SortOption,
) -> anyhow::Result<()> {
    let baked_good = view.baked_good;
    let iterations: Vec<Value> = view
        .sorted(sort)
        .iter()
        .map(|iteration| iteration_json(journal, iteration))
        .collect();

    let output = json!({
        "uuid": baked_good.uuid(),
        "name": baked_good.name(),
        "description": baked_good.description(),
        "created": baked_good.created(),
        "updated": baked_good.updated(),
        "sort": sort,
        "stats": {
            "iteration_count": view.stats.iteration_count,
            "avg_rating": view.stats.avg_rating,
            "best_rating": view.stats.best_rating,
            "last_baked": view.stats.last_baked,
        },
        "iterations": iterations,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// The JSON shape shared by `show` and `iteration show`.
pub fn iteration_json(journal: &Journal<Loaded>, view: &IterationView<'_>) -> Value {
    let iteration = view.iteration;
    let photos: Vec<Value> = view
        .photos
        .iter()
        .map(|photo| {
            json!({
                "uuid": photo.uuid(),
                "order": photo.order(),
                "url": journal.display_url(photo),
            })
        })
        .collect();

    json!({
        "uuid": iteration.uuid(),
        "baked_good": iteration.baked_good(),
        "bake_date": iteration.bake_date(),
        "difficulty": iteration.difficulty(),
        "total_minutes": iteration.total_minutes(),
        "rating": iteration.rating(),
        "notes": iteration.notes(),
        "source_url": iteration.source_url(),
        "recipe": iteration.recipe(),
        "created": iteration.created(),
        "updated": iteration.updated(),
        "photos": photos,
    })
}
