use std::{fs, path::PathBuf};

use anyhow::Context as _;
use chrono::{Local, NaiveDate};
use clap::Parser;
use crumb::{
    Difficulty, Journal, NonBlankString, Rating, User,
    domain::NewIteration,
    storage::{Loaded, PhotoUpload},
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::instrument;
use uuid::Uuid;

use super::{Session, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Record a bake of a baked good")]
pub struct Bake {
    /// Name, UUID or UUID prefix of the baked good
    baked_good: String,

    /// The recipe as text
    #[arg(long, conflicts_with = "recipe_file", required_unless_present = "recipe_file")]
    recipe: Option<String>,

    /// Read the recipe from a file
    #[arg(long, value_name = "PATH")]
    recipe_file: Option<PathBuf>,

    /// How demanding the bake was
    #[arg(short, long, default_value = "Medium")]
    difficulty: Difficulty,

    /// Total time in minutes
    #[arg(short = 't', long, default_value_t = 0)]
    minutes: u32,

    /// Bake date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Rating from 1 to 5
    #[arg(long)]
    rating: Option<Rating>,

    /// Free-form notes
    #[arg(long)]
    notes: Option<String>,

    /// Where the recipe came from
    #[arg(long, value_name = "URL")]
    source: Option<String>,

    /// Photos to attach
    #[arg(long = "photo", value_name = "PATH")]
    photos: Vec<PathBuf>,
}

impl Bake {
    #[instrument(skip(session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        let recipe = match (self.recipe, &self.recipe_file) {
            (Some(text), _) => text,
            (None, Some(path)) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read recipe from {}", path.display()))?,
            (None, None) => anyhow::bail!("A recipe is required: pass --recipe or --recipe-file"),
        };
        let recipe = NonBlankString::new(recipe).context("The recipe must not be blank")?;

        let (mut journal, user) = session.open()?;
        let baked_good = journal.resolve_baked_good(&user, &self.baked_good)?.uuid();

        let fields = NewIteration {
            recipe,
            difficulty: self.difficulty,
            total_minutes: self.minutes,
            bake_date: self.date.unwrap_or_else(today),
            rating: self.rating,
            notes: self.notes,
            source_url: self.source,
        };
        let iteration = journal.create_iteration(&user, baked_good, fields)?;

        println!(
            "{}",
            format!("✅ Recorded bake of {}", iteration.bake_date()).success()
        );
        println!("   {}", iteration.uuid().to_string().dim());

        if !self.photos.is_empty() {
            upload_with_progress(&mut journal, &user, iteration.uuid(), self.photos)?;
        }
        Ok(())
    }
}

/// Today's date in the local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Uploads photos one by one behind a progress bar and reports failures.
///
/// Returns an error if any upload failed, after every file was attempted.
pub fn upload_with_progress(
    journal: &mut Journal<Loaded>,
    user: &User,
    iteration: Uuid,
    sources: Vec<PathBuf>,
) -> anyhow::Result<()> {
    let bar = ProgressBar::new(sources.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let mut failed = Vec::new();
    let mut uploaded = 0;
    for source in sources {
        bar.set_message(source.display().to_string());
        let upload = journal.upload_photo(user, iteration, PhotoUpload::new(source));
        if let Some(reason) = upload.failure() {
            failed.push((upload.source().to_path_buf(), reason.to_string()));
        } else {
            uploaded += 1;
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    if uploaded > 0 {
        println!("{}", format!("📷 Uploaded {uploaded} photo(s)").success());
    }
    if failed.is_empty() {
        return Ok(());
    }
    for (path, reason) in &failed {
        eprintln!("{}", format!("  ✗ {}: {reason}", path.display()).warning());
    }
    anyhow::bail!("{} photo upload(s) failed", failed.len())
}
