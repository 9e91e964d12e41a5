use std::{fs, path::PathBuf};

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::Parser;
use crumb::{Difficulty, NonBlankString, Rating, domain::IterationPatch};
use dialoguer::Confirm;
use tracing::instrument;

use super::{
    Session,
    bake::today,
    show::iteration_json,
    terminal::{self, Colorize},
};

#[derive(Debug, clap::Subcommand)]
pub enum IterationCommand {
    /// Show an iteration with its recipe and photos
    Show(Show),

    /// Change an iteration
    Edit(Edit),

    /// Start a new iteration from an existing one, dated today
    Duplicate(Duplicate),

    /// Delete an iteration and its photos
    Delete(Delete),
}

impl IterationCommand {
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        match self {
            Self::Show(command) => command.run(session),
            Self::Edit(command) => command.run(session),
            Self::Duplicate(command) => command.run(session),
            Self::Delete(command) => command.run(session),
        }
    }
}

#[derive(Debug, Parser)]
pub struct Show {
    /// UUID or UUID prefix of the iteration
    iteration: String,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

impl Show {
    #[instrument(level = "debug", skip(session))]
    fn run(self, session: &Session) -> anyhow::Result<()> {
        let (journal, user) = session.open()?;
        let uuid = journal.resolve_iteration(&user, &self.iteration)?.uuid();
        let view = journal.iteration_view(&user, uuid)?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&iteration_json(&journal, &view))?
            );
            return Ok(());
        }

        let iteration = view.iteration;
        if let Some(baked_good) = journal.catalog().baked_good(iteration.baked_good()) {
            println!("# {}", baked_good.name());
        }
        println!("{}\n", terminal::format_date(iteration.bake_date()));

        println!("{}", "Details".dim());
        println!("  Rating:     {}", terminal::stars(iteration.rating()));
        println!("  Difficulty: {}", iteration.difficulty());
        println!(
            "  Time:       {}",
            terminal::format_minutes(iteration.total_minutes())
        );
        if let Some(source) = iteration.source_url() {
            println!("  Source:     {source}");
        }
        println!("  UUID:       {}", iteration.uuid());

        if let Some(notes) = iteration.notes() {
            println!("\n{}", "Notes".dim());
            println!("{notes}");
        }

        println!("\n{}", "Recipe".dim());
        println!("{}", iteration.recipe());

        if !view.photos.is_empty() {
            println!("\n{}", "Photos".dim());
            for photo in &view.photos {
                let location = journal
                    .display_url(photo)
                    .unwrap_or_else(|| "(missing)".warning());
                println!("  {}. {location}", photo.order());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Edit {
    /// UUID or UUID prefix of the iteration
    iteration: String,

    /// New recipe text
    #[arg(long, conflicts_with = "recipe_file")]
    recipe: Option<String>,

    /// Read the new recipe from a file
    #[arg(long, value_name = "PATH")]
    recipe_file: Option<PathBuf>,

    /// New difficulty
    #[arg(short, long)]
    difficulty: Option<Difficulty>,

    /// New total time in minutes
    #[arg(short = 't', long)]
    minutes: Option<u32>,

    /// New bake date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// New rating from 1 to 5
    #[arg(long)]
    rating: Option<Rating>,

    /// New notes (an empty string clears them)
    #[arg(long)]
    notes: Option<String>,

    /// New source URL (an empty string clears it)
    #[arg(long, value_name = "URL")]
    source: Option<String>,
}

impl Edit {
    #[instrument(skip(session))]
    fn run(self, session: &Session) -> anyhow::Result<()> {
        let recipe = match (self.recipe, &self.recipe_file) {
            (Some(text), _) => Some(text),
            (None, Some(path)) => Some(
                fs::read_to_string(path)
                    .with_context(|| format!("Failed to read recipe from {}", path.display()))?,
            ),
            (None, None) => None,
        };
        let recipe = recipe
            .map(NonBlankString::new)
            .transpose()
            .context("The recipe must not be blank")?;

        let patch = IterationPatch {
            recipe,
            difficulty: self.difficulty,
            total_minutes: self.minutes,
            bake_date: self.date,
            rating: self.rating,
            notes: self.notes,
            source_url: self.source,
        };
        if patch.is_empty() {
            anyhow::bail!("Nothing to change: pass at least one field to update");
        }

        let (mut journal, user) = session.open()?;
        let uuid = journal.resolve_iteration(&user, &self.iteration)?.uuid();
        journal.update_iteration(&user, uuid, patch)?;

        println!("{}", "✅ Iteration updated".success());
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Duplicate {
    /// UUID or UUID prefix of the iteration to copy
    iteration: String,
}

impl Duplicate {
    #[instrument(skip(session))]
    fn run(self, session: &Session) -> anyhow::Result<()> {
        let (mut journal, user) = session.open()?;
        let uuid = journal.resolve_iteration(&user, &self.iteration)?.uuid();
        let copy = journal.duplicate_iteration(&user, uuid, today())?;

        println!(
            "{}",
            format!("✅ Started a new iteration for {}", copy.bake_date()).success()
        );
        println!("   {}", copy.uuid().to_string().dim());
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Delete {
    /// UUID or UUID prefix of the iteration
    iteration: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

impl Delete {
    #[instrument(skip(session))]
    fn run(self, session: &Session) -> anyhow::Result<()> {
        let (mut journal, user) = session.open()?;
        let uuid = journal.resolve_iteration(&user, &self.iteration)?.uuid();

        if !self.yes {
            let photos = journal.catalog().photos_of(uuid).len();
            let proceed = Confirm::new()
                .with_prompt(format!(
                    "Delete iteration {} and {photos} photo(s)?",
                    &uuid.to_string()[..8]
                ))
                .default(false)
                .interact()?;
            if !proceed {
                println!("Cancelled");
                std::process::exit(130);
            }
        }

        let report = journal.delete_iteration(&user, uuid)?;
        println!(
            "{}",
            format!("✅ Deleted iteration ({} photos)", report.photos).success()
        );
        if report.left_for_gc > 0 {
            println!(
                "{}",
                format!(
                    "⚠️  {} file(s) could not be removed; run `crumb gc` to retry",
                    report.left_for_gc
                )
                .warning()
            );
        }
        Ok(())
    }
}
