use clap::Parser;
use crumb::{NonBlankString, domain::BakedGoodPatch};
use dialoguer::Confirm;
use tracing::instrument;

use super::{Session, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Create a baked good")]
pub struct New {
    /// Name of the baked good
    name: NonBlankString,

    /// A short description
    #[arg(short, long)]
    description: Option<String>,
}

impl New {
    #[instrument(skip(session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        let (mut journal, user) = session.open()?;
        let baked_good = journal.create_baked_good(&user, self.name, self.description)?;

        println!(
            "{}",
            format!("✅ Added {}", baked_good.name()).success()
        );
        println!("   {}", baked_good.uuid().to_string().dim());
        Ok(())
    }
}

#[derive(Debug, Parser)]
#[command(about = "Rename or describe a baked good")]
pub struct Edit {
    /// Name, UUID or UUID prefix of the baked good
    baked_good: String,

    /// New name
    #[arg(long)]
    name: Option<NonBlankString>,

    /// New description (an empty string clears it)
    #[arg(long)]
    description: Option<String>,
}

impl Edit {
    #[instrument(skip(session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        let patch = BakedGoodPatch {
            name: self.name,
            description: self.description,
        };
        if patch.is_empty() {
            anyhow::bail!("Nothing to change: pass --name and/or --description");
        }

        let (mut journal, user) = session.open()?;
        let uuid = journal.resolve_baked_good(&user, &self.baked_good)?.uuid();
        let updated = journal.update_baked_good(&user, uuid, patch)?;

        println!("{}", format!("✅ Updated {}", updated.name()).success());
        Ok(())
    }
}

#[derive(Debug, Parser)]
#[command(about = "Delete a baked good with all its iterations and photos")]
pub struct Delete {
    /// Name, UUID or UUID prefix of the baked good
    baked_good: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,

    /// Show what would be deleted without deleting anything
    #[arg(long)]
    dry_run: bool,
}

impl Delete {
    #[instrument(skip(session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        let (mut journal, user) = session.open()?;
        let uuid = journal.resolve_baked_good(&user, &self.baked_good)?.uuid();

        let view = journal.baked_good_view(&user, uuid)?;
        let name = view.baked_good.name().to_string();
        let iterations = view.iterations.len();
        let photos: usize = view.iterations.iter().map(|it| it.photo_count()).sum();

        println!("Will delete {name}:");
        println!("  • {iterations} iteration(s)");
        println!("  • {photos} photo(s)");

        if self.dry_run {
            println!("\n{}", "Dry run: nothing was deleted".info());
            return Ok(());
        }

        if !self.yes {
            let proceed = Confirm::new()
                .with_prompt("Proceed?")
                .default(false)
                .interact()?;
            if !proceed {
                println!("Cancelled");
                std::process::exit(130);
            }
        }

        let report = journal.delete_baked_good(&user, uuid)?;
        println!(
            "{}",
            format!(
                "✅ Deleted {name} ({} iterations, {} photos)",
                report.iterations, report.photos
            )
            .success()
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
