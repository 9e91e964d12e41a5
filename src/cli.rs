use std::path::{Path, PathBuf};

mod bake;
mod baked_good;
mod community;
mod gc;
mod iteration;
mod list;
mod photo;
mod show;
mod terminal;
mod tools;

use anyhow::Context as _;
use bake::Bake;
use baked_good::{Delete, Edit, New};
use clap::ArgAction;
use community::Community;
use crumb::{
    Config, Identity, Journal, User,
    domain::{IdentityConfig, SyncOutcome},
    storage::{Layout, Loaded},
};
use gc::Gc;
use iteration::IterationCommand;
use list::List;
use photo::PhotoCommand;
use show::Show;
use terminal::Colorize;
use tools::{Calc, Subs};
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the root of the journal
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    /// The identity subject to act as (defaults to the configured identity)
    #[arg(short, long, global = true, value_name = "SUBJECT")]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let session = Session {
            root: self.root,
            subject: self.user,
        };
        self.command.run(&session)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

/// Where the journal is and who is using it.
#[derive(Debug)]
pub struct Session {
    root: PathBuf,
    subject: Option<String>,
}

impl Session {
    fn root(&self) -> &Path {
        &self.root
    }

    /// Loads the journal without identifying the caller.
    fn journal(&self) -> anyhow::Result<Journal<Loaded>> {
        Journal::new(self.root.clone())
            .load_all()
            .with_context(|| format!("failed to load journal at {}", self.root.display()))
    }

    /// Loads the journal and identifies the caller.
    ///
    /// The configured identity carries a full profile and is synced on every
    /// run. A bare `--user` subject only registers a user the first time.
    fn open(&self) -> anyhow::Result<(Journal<Loaded>, User)> {
        let mut journal = self.journal()?;
        let configured = journal.config().identity.clone();

        let identity = match (&self.subject, configured) {
            (Some(subject), Some(configured)) if configured.subject == *subject => {
                Identity::from(configured)
            }
            (Some(subject), _) => {
                if let Some(user) = journal.user_by_subject(subject) {
                    let user = user.clone();
                    return Ok((journal, user));
                }
                Identity::new(subject.clone())
            }
            (None, Some(configured)) => Identity::from(configured),
            (None, None) => anyhow::bail!(
                "no identity given: pass --user or set [identity] in {}",
                Layout::new(self.root.clone()).config_path().display()
            ),
        };

        let (user, outcome) = journal.sync_user(&identity)?;
        if outcome == SyncOutcome::Created {
            eprintln!(
                "{}",
                format!("Welcome, {}!", user.display_name()).success()
            );
        }
        Ok((journal, user))
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Initialize a new journal
    Init(Init),

    /// Show (and optionally update) the calling baker
    Whoami(Whoami),

    /// Create a baked good
    New(New),

    /// Rename or describe a baked good
    Edit(Edit),

    /// Delete a baked good with all its iterations and photos
    Delete(Delete),

    /// List your baked goods
    List(List),

    /// Show a baked good with its iterations and statistics
    Show(Show),

    /// Record a bake of a baked good
    Bake(Bake),

    /// Manage iterations
    #[command(subcommand)]
    Iteration(IterationCommand),

    /// Manage photos
    #[command(subcommand)]
    Photo(PhotoCommand),

    /// Show the most recent baked goods of every baker
    Community(Community),

    /// Baker's percentages for the default formula
    Calc(Calc),

    /// Look up ingredient substitutions
    Subs(Subs),

    /// Finish interrupted deletes and remove unused blobs
    Gc(Gc),
}

impl Command {
    fn run(self, session: &Session) -> anyhow::Result<()> {
        match self {
            Self::Init(command) => command.run(session),
            Self::Whoami(command) => command.run(session),
            Self::New(command) => command.run(session),
            Self::Edit(command) => command.run(session),
            Self::Delete(command) => command.run(session),
            Self::List(command) => command.run(session),
            Self::Show(command) => command.run(session),
            Self::Bake(command) => command.run(session),
            Self::Iteration(command) => command.run(session),
            Self::Photo(command) => command.run(session),
            Self::Community(command) => command.run(session),
            Self::Calc(command) => command.run(),
            Self::Subs(command) => command.run(),
            Self::Gc(command) => command.run(session),
        }
    }
}

#[derive(Debug, clap::Parser)]
pub struct Init {
    /// Display name for the default identity (requires --user)
    #[arg(long, requires = "user")]
    name: Option<String>,

    /// Email for the default identity (requires --user)
    #[arg(long, requires = "user")]
    email: Option<String>,
}

impl Init {
    #[instrument(skip(session))]
    fn run(self, session: &Session) -> anyhow::Result<()> {
        let layout = Layout::new(session.root().to_path_buf());
        let config_path = layout.config_path();
        if config_path.exists() {
            anyhow::bail!(
                "Journal already initialized (found {})",
                config_path.display()
            );
        }

        layout
            .create_dirs()
            .context("Failed to create the .crumb directory")?;

        let mut config = Config::default();
        config.identity = session.subject.clone().map(|subject| IdentityConfig {
            subject,
            email: self.email,
            name: self.name,
            picture_url: None,
        });
        config
            .save(&config_path)
            .map_err(|e| anyhow::anyhow!("Failed to create config.toml: {e}"))?;

        println!("Initialized baking journal in {}", session.root().display());
        println!("  Created: .crumb/config.toml");
        println!("  Created: .crumb/blobs/");
        println!();
        println!("Next steps:");
        if config.identity.is_none() {
            println!("  Add an [identity] section to .crumb/config.toml, or pass --user");
        }
        println!("  crumb new \"Sourdough\"");

        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Whoami {
    /// Change your display name
    #[arg(long)]
    name: Option<String>,

    /// Change your email
    #[arg(long)]
    email: Option<String>,
}

impl Whoami {
    #[instrument(skip(session))]
    fn run(self, session: &Session) -> anyhow::Result<()> {
        let (mut journal, mut user) = session.open()?;

        if self.name.is_some() || self.email.is_some() {
            let identity = Identity {
                subject: user.subject().to_string(),
                email: self.email,
                name: self.name.or_else(|| user.name().map(str::to_string)),
                picture_url: user.image_url().map(str::to_string),
            };
            let (updated, outcome) = journal.sync_user(&identity)?;
            if outcome == SyncOutcome::Updated {
                println!("{}", "✅ Profile updated".success());
            }
            user = updated;
        }

        println!("{}", user.display_name());
        println!("  {}  {}", "Subject:".dim(), user.subject());
        if !user.email().is_empty() {
            println!("  {}    {}", "Email:".dim(), user.email());
        }
        println!("  {}     {}", "UUID:".dim(), user.uuid());
        println!(
            "  {}   {}",
            "Joined:".dim(),
            user.created().format("%Y-%m-%d")
        );
        println!(
            "  {}    {}",
            "Bakes:".dim(),
            journal.baked_goods_of(&user).len()
        );

        Ok(())
    }
}
