use clap::Parser;
use tracing::instrument;

use super::{Session, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Finish interrupted deletes and remove unused blobs")]
pub struct Gc {}

impl Gc {
    #[instrument(skip(session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        let journal = session.journal()?;
        match journal.collect_garbage() {
            Ok(report) => {
                println!("{}", format!("✅ Cleanup complete: {report}").success());
                if report.blob_sweep_skipped {
                    println!(
                        "{}",
                        "⚠️  Fix or remove the skipped files below, then run `crumb gc` again to drop unused blobs"
                            .warning()
                    );
                    for path in journal.skipped_files() {
                        println!("  • {}", path.display());
                    }
                }
                Ok(())
            }
            Err(e) => {
                eprintln!("{}", "⚠️  Some files could not be removed".warning());
                Err(e.into())
            }
        }
    }
}
