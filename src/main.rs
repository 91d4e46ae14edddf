//! prism-folio - Portfolio command line
//!
//! Entry point for the CLI binary: content listing, theme preference,
//! contact links, pointer trace simulation.

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prism_folio::config::{Config, LoggingConfig};
use prism_folio::contact::{ContactForm, Field, FormError};
use prism_folio::content::{Portfolio, ProjectCategory};
use prism_folio::page::PageLayout;
use prism_folio::pointer::PointerHub;
use prism_folio::scene::Scene;
use prism_folio::theme::{self, EnvAppearance, ThemePreference, ThemeStore};
use prism_folio::trace::{self, PointerTrace};
use prism_folio::utils::format_user_error;

/// Command-line arguments for prism-folio
#[derive(Parser, Debug)]
#[command(name = "prism-folio")]
#[command(version, about = "Personal portfolio with a targeting cursor", long_about = None)]
pub struct Args {
    /// Configuration file path (default: user config dir)
    #[arg(short, long, env = "PRISM_FOLIO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long, default_value = "compact", global = true)]
    pub log_format: String,

    /// Write logs to file (in addition to stderr)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Frame rate for trace replay
    #[arg(long, env = "PRISM_FOLIO_REFRESH_HZ", global = true)]
    pub refresh_hz: Option<u32>,

    /// Content TOML replacing the bundled portfolio
    #[arg(long, env = "PRISM_FOLIO_CONTENT", global = true)]
    pub content: Option<PathBuf>,

    /// Theme preference file
    #[arg(long, env = "PRISM_FOLIO_PREFERENCES", global = true)]
    pub preferences: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print portfolio content
    Show {
        /// Section to print (default: all)
        #[arg(value_enum, default_value = "all")]
        section: Section,

        /// Only projects in this category
        #[arg(long)]
        category: Option<ProjectCategory>,

        /// Only featured projects
        #[arg(long)]
        featured: bool,
    },

    /// Read or change the theme preference
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },

    /// Validate a message and print its mailto link
    Contact {
        /// Sender name
        #[arg(long, default_value = "")]
        name: String,

        /// Sender email
        #[arg(long, default_value = "")]
        email: String,

        /// Subject line
        #[arg(long, default_value = "")]
        subject: String,

        /// Message body
        #[arg(long, default_value = "")]
        message: String,
    },

    /// Replay a pointer trace and print one JSON frame per line
    Simulate {
        /// JSON pointer trace
        #[arg(long)]
        trace: PathBuf,

        /// Pace frames with a real-time clock
        #[arg(long)]
        realtime: bool,
    },

    /// Print the effective configuration
    Config,
}

/// Content sections for `show`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Everything
    All,
    /// Name, title, bio
    About,
    /// Work timeline
    Experience,
    /// Project showcase
    Projects,
    /// Skill categories
    Skills,
    /// Contact details
    Contact,
}

/// Theme actions
#[derive(Subcommand, Debug)]
pub enum ThemeAction {
    /// Print the stored preference and the resolved theme
    Get,
    /// Store a preference (light|dark|system)
    Set {
        /// New preference
        preference: ThemePreference,
    },
    /// Switch between light and dark
    Toggle,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(Config::default_path);
    let loaded = match &config_path {
        Some(path) => Config::load_or_default(path),
        None => Ok(Config::default_config()),
    };

    let logging = loaded
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    let _guard = match init_logging(&args, &logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", format_user_error(&e));
            return ExitCode::FAILURE;
        }
    };

    info!("prism-folio v{} ({} {})", env!("CARGO_PKG_VERSION"), env!("BUILD_DATE"), env!("GIT_HASH"));

    let result = loaded.and_then(|config| {
        let config = config.with_overrides(args.refresh_hz, args.content.clone(), args.preferences.clone());
        config.validate()?;
        debug!("Config: {:?}", config);
        Ok(config)
    });

    let outcome = match result {
        Ok(config) => run(args.command, config).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", format_user_error(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Show {
            section,
            category,
            featured,
        } => {
            let portfolio = config.portfolio()?;
            show(&portfolio, section, category, featured);
            Ok(())
        }
        Command::Theme { action } => run_theme(&config, action),
        Command::Contact {
            name,
            email,
            subject,
            message,
        } => run_contact(&config, [name, email, subject, message]),
        Command::Simulate { trace, realtime } => simulate(&config, &trace, realtime).await,
        Command::Config => {
            let rendered = toml::to_string_pretty(&config).context("Failed to serialize config")?;
            println!("{}", rendered);
            Ok(())
        }
    }
}

fn show(portfolio: &Portfolio, section: Section, category: Option<ProjectCategory>, featured: bool) {
    let wants = |s: Section| section == Section::All || section == s;
    let personal = &portfolio.personal;

    if wants(Section::About) {
        println!("{}", personal.name);
        println!("{}", personal.title);
        println!("{}", personal.tagline);
        println!();
        println!("{}", personal.bio);
        println!();
    }

    if wants(Section::Experience) {
        println!("== Experience ==");
        for job in &portfolio.experience {
            println!("{} | {} | {}", job.role, job.company, job.period);
            for line in &job.description {
                println!("  - {}", line);
            }
            println!("  [{}]", job.technologies.join(", "));
        }
        println!();
    }

    if wants(Section::Projects) {
        println!("== Projects ==");
        let projects = portfolio
            .projects
            .iter()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .filter(|p| !featured || p.featured);
        for project in projects {
            let star = if project.featured { "*" } else { " " };
            println!("{} {} ({})", star, project.title, project.category);
            println!("    {}", project.description);
            println!("    {}", project.github_url);
            if let Some(live) = &project.live_url {
                println!("    {}", live);
            }
        }
        println!();
    }

    if wants(Section::Skills) {
        println!("== Skills ==");
        for group in &portfolio.skills {
            println!("{} (avg {:.0}%)", group.title, group.average_level());
            for skill in &group.skills {
                println!("  {:<24} {:>3}%  {}", skill.name, skill.level, skill.experience);
            }
        }
        println!();
    }

    if wants(Section::Contact) {
        let contact = &portfolio.contact;
        println!("== Contact ==");
        println!("{}", contact.email);
        if let Some(phone) = &contact.phone {
            println!("{}", phone);
        }
        println!("{}", contact.location);
        for link in &contact.social_links {
            println!("{:<10} {}", link.platform, link.url);
        }
        println!();
    }

    if section == Section::All {
        println!("© {} {}", chrono::Local::now().year(), personal.name);
    }
}

fn run_theme(config: &Config, action: ThemeAction) -> Result<()> {
    let preferences = config.preference_store()?;
    let store = theme::init(ThemeStore::new(preferences, Box::new(EnvAppearance)));
    let mut store = store.lock();

    match action {
        ThemeAction::Get => {}
        ThemeAction::Set { preference } => store
            .set_preference(preference)
            .context("Failed to save theme preference")?,
        ThemeAction::Toggle => {
            store.toggle().context("Failed to save theme preference")?;
        }
    }

    println!("preference: {}", store.preference());
    println!("resolved:   {}", store.resolved());
    println!("primary:    {}", store.palette().primary);
    Ok(())
}

fn run_contact(config: &Config, values: [String; 4]) -> Result<()> {
    let portfolio = config.portfolio()?;
    let mut form = ContactForm::new();
    for (field, value) in Field::ALL.into_iter().zip(values) {
        form.set(field, value);
    }

    match form.submit(&portfolio.contact.email) {
        Ok(link) => {
            println!("{}", link);
            Ok(())
        }
        Err(FormError::Invalid(errors)) => {
            for (field, error) in errors.iter() {
                eprintln!("{}: {}", field, error);
            }
            anyhow::bail!("Contact form has {} invalid field(s)", errors.len())
        }
    }
}

async fn simulate(config: &Config, path: &std::path::Path, realtime: bool) -> Result<()> {
    let trace = PointerTrace::load(path)
        .with_context(|| format!("Failed to load pointer trace {}", path.display()))?;
    let portfolio = config.portfolio()?;
    let viewport = trace.viewport.unwrap_or_default();

    let page = PageLayout::build(&portfolio, viewport, trace.scroll_y).context("Failed to lay out page")?;
    info!(
        "Page laid out: {} elements, {:.0}px tall",
        page.tree().len(),
        page.document_height()
    );

    let hub = PointerHub::new();
    let mut scene = Scene::new(&hub, config.scene_settings(), page.into_tree())?;
    let options = config.replay_options();

    if realtime {
        let mut failed = None;
        trace::replay_realtime(&mut scene, &hub, &trace, options, |frame| {
            if failed.is_none() {
                match serde_json::to_string(&frame) {
                    Ok(line) => println!("{}", line),
                    Err(e) => failed = Some(e),
                }
            }
        })
        .await
        .context("Failed to replay pointer trace")?;
        if let Some(e) = failed {
            return Err(e).context("Failed to serialize frame");
        }
    } else {
        let frames = trace::replay(&mut scene, &hub, &trace, options).context("Failed to replay pointer trace")?;
        for frame in frames {
            println!("{}", serde_json::to_string(&frame).context("Failed to serialize frame")?);
        }
    }

    info!("Simulated {} frames", scene.frame_count());
    Ok(())
}

fn init_logging(args: &Args, config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let log_level = match args.verbose {
        0 => config.level.to_lowercase(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("prism_folio={level},prism_folio_gui={level},warn", level = log_level))
    });

    // Explicit file wins over the configured log directory
    let (file_writer, guard) = match (&args.log_file, &config.log_dir) {
        (Some(path), _) => {
            let file = File::create(path).with_context(|| format!("Failed to create log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            (Some(writer), Some(guard))
        }
        (None, Some(dir)) => {
            let appender = tracing_appender::rolling::daily(dir, "prism-folio.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        (None, None) => (None, None),
    };

    // Frames and listings go to stdout; logs to stderr
    match args.log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .with(file_writer.map(|writer| {
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(writer)
                        .with_ansi(false)
                }))
                .init();
        }
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr),
                )
                .with(file_writer.map(|writer| {
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                }))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_writer(std::io::stderr),
                )
                .with(file_writer.map(|writer| {
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_writer(writer)
                        .with_ansi(false)
                }))
                .init();
        }
    }

    if let Some(path) = &args.log_file {
        info!("Logging to file: {}", path.display());
    }
    Ok(guard)
}
