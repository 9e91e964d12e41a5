use std::path::PathBuf;

use clap::Parser;
use tracing::instrument;

use super::{Session, bake::upload_with_progress, terminal::Colorize};

#[derive(Debug, clap::Subcommand)]
pub enum PhotoCommand {
    /// Upload photos to an iteration
    Add(Add),

    /// Remove a photo
    Remove(Remove),
}

impl PhotoCommand {
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        match self {
            Self::Add(command) => command.run(session),
            Self::Remove(command) => command.run(session),
        }
    }
}

#[derive(Debug, Parser)]
pub struct Add {
    /// UUID or UUID prefix of the iteration
    iteration: String,

    /// Image files to upload
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

impl Add {
    #[instrument(skip(session))]
    fn run(self, session: &Session) -> anyhow::Result<()> {
        let (mut journal, user) = session.open()?;
        let iteration = journal.resolve_iteration(&user, &self.iteration)?.uuid();
        upload_with_progress(&mut journal, &user, iteration, self.files)
    }
}

#[derive(Debug, Parser)]
pub struct Remove {
    /// UUID or UUID prefix of the photo
    photo: String,
}

impl Remove {
    #[instrument(skip(session))]
    fn run(self, session: &Session) -> anyhow::Result<()> {
        let (mut journal, user) = session.open()?;
        let uuid = journal.resolve_photo(&user, &self.photo)?.uuid();
        let removed = journal.delete_photo(&user, uuid)?;

        println!(
            "{}",
            format!("✅ Removed photo {}", removed.uuid()).success()
        );
        Ok(())
    }
}
