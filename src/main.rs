use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{Level, warn};

use dealflow::banner::{BannerInfo, print_banner, print_session_summary};
use dealflow::commands::{CommandRegistry, CommandResult, SessionInfo, StateChange};
use dealflow::completer::anthropic::{API_KEY_ENV, AnthropicCompleter};
use dealflow::config::{Config, KEY_FOCUS, KEY_MODEL, Settings};
use dealflow::consts::{DEFAULT_MODEL, default_db_path};
use dealflow::dashboard::render::render_run;
use dealflow::dashboard::{Dashboard, Mode, Submission};
use dealflow::fetcher::http::HttpFetcher;
use dealflow::orchestrator::Orchestrator;
use dealflow::pipeline::{Registry, presets};
use dealflow::spinner::Spinner;
use dealflow::store::sqlite::SqliteStore;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Pipeline {
    /// Five analysts, every one runs on every page
    Investment,
    /// Pick one research focus per page
    Research,
}

impl Pipeline {
    fn label(self) -> &'static str {
        match self {
            Pipeline::Investment => "investment",
            Pipeline::Research => "research",
        }
    }

    fn build(self) -> anyhow::Result<(Registry, Mode)> {
        Ok(match self {
            Pipeline::Investment => (presets::investment()?, Mode::Sequence),
            Pipeline::Research => (presets::research()?, Mode::Select),
        })
    }
}

#[derive(Parser)]
#[command(
    name = "dealflow",
    version,
    about = "Scrape a page, hand it to a crew of analysts, keep the memos."
)]
struct Cli {
    /// Which step line-up to run
    #[arg(short, long, value_enum, default_value_t = Pipeline::Investment)]
    pipeline: Pipeline,

    /// Anthropic model name (remembered for next time)
    #[arg(long)]
    model: Option<String>,

    /// SQLite database path for results (use :memory: for ephemeral)
    #[arg(short, long)]
    db: Option<String>,

    /// Page fetch timeout in seconds
    #[arg(short = 't', long, default_value_t = 10)]
    fetch_timeout: u64,

    /// Feed each step the previous step's output instead of the page text
    #[arg(long, default_value_t = false)]
    chain: bool,

    /// Maintain the full-text index used by /find
    #[arg(long, default_value_t = false)]
    enable_vector_backend: bool,

    /// Research focus to start with (research pipeline only)
    #[arg(short, long)]
    focus: Option<String>,

    /// Analyze a single URL and exit (non-interactive)
    #[arg(short, long)]
    run: Option<String>,

    /// Log pipeline activity to stderr
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let db_path = resolve_db_path(cli.db.as_deref())?;
    let config = Config::open(&db_path)?;

    let model = match &cli.model {
        Some(model) => {
            config.set(KEY_MODEL, model)?;
            model.clone()
        }
        None => config
            .get(KEY_MODEL)?
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
    };

    let settings = Settings {
        model,
        fetch_timeout: Duration::from_secs(cli.fetch_timeout),
        chain_outputs: cli.chain,
        disable_vector_backend: !cli.enable_vector_backend,
    };

    let completer = AnthropicCompleter::from_env(Some(settings.model.clone()));
    let auth_status = if completer.has_credentials() {
        "API key (env) ✓".to_string()
    } else {
        format!("not authenticated, set {API_KEY_ENV}")
    };

    let (registry, mode) = cli.pipeline.build()?;
    let fetcher = HttpFetcher::new(settings.fetch_timeout)?;
    let store = SqliteStore::open(&db_path, &settings)?;
    let search_label = if store.is_indexed() {
        "full-text index"
    } else {
        "scan"
    };

    let orchestrator =
        Orchestrator::new(registry, Arc::new(completer), Arc::new(fetcher), &settings);
    let mut dashboard = Dashboard::new(orchestrator, Arc::new(store), mode)?;

    if mode == Mode::Select {
        let wanted = match &cli.focus {
            Some(focus) => Some(focus.clone()),
            None => config.get(KEY_FOCUS)?,
        };
        let first = dashboard.steps().first().map(|s| s.to_string());
        let focus = wanted.or(first).context("research pipeline has no steps")?;
        if let Err(e) = dashboard.set_focus(&focus) {
            warn!(error = %e, "ignoring saved focus");
            config.remove(KEY_FOCUS)?;
            if let Some(first) = dashboard.steps().first().map(|s| s.to_string()) {
                dashboard.set_focus(&first)?;
            }
        }
    } else if cli.focus.is_some() {
        eprintln!("warning: --focus is ignored for the investment pipeline");
    }

    let database_label = if db_path == ":memory:" {
        "ephemeral"
    } else {
        &db_path
    };

    // Single run mode
    if let Some(url) = cli.run {
        submit(&mut dashboard, &url).await;
        print_session_summary(dashboard.session_usage());
        return Ok(());
    }

    let steps = dashboard.steps();
    print_banner(&BannerInfo {
        pipeline: cli.pipeline.label(),
        steps: &steps,
        model: &settings.model,
        auth_status: &auth_status,
        database: database_label,
        search: search_label,
    });
    drop(steps);

    let commands = CommandRegistry::new();

    // REPL, async stdin so Ctrl+C is caught at the prompt too
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("\ndealflow> ");
        io::stdout().flush()?;

        let line = tokio::select! {
            result = lines.next_line() => {
                match result {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        // Ctrl+D (EOF)
                        println!();
                        break;
                    }
                    Err(e) => {
                        eprintln!("input error: {}", e);
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };

        let result = {
            let info = SessionInfo {
                pipeline: cli.pipeline.label(),
                model: &settings.model,
                db_path: &db_path,
                usage: dashboard.session_usage(),
                dashboard: Some(&dashboard),
            };
            commands.dispatch(&line, &info).await
        };

        match result {
            CommandResult::Handled => {}
            CommandResult::Quit => break,
            CommandResult::StateChanged(StateChange::Focus(focus)) => {
                match dashboard.set_focus(&focus) {
                    Ok(()) => config.set(KEY_FOCUS, &focus)?,
                    Err(e) => eprintln!("  ✗ {e}"),
                }
            }
            CommandResult::NotACommand => {
                // Ctrl+C during a run abandons it, not the REPL
                tokio::select! {
                    _ = submit(&mut dashboard, &line) => {}
                    _ = tokio::signal::ctrl_c() => {
                        println!("\n\ninterrupted, nothing saved");
                    }
                }
            }
        }
    }

    print_session_summary(dashboard.session_usage());
    Ok(())
}

/// Run one submission and print what came of it.
async fn submit(dashboard: &mut Dashboard, input: &str) {
    let spinner = Spinner::follow("starting", dashboard.events());
    let result = dashboard.submit(input).await;
    spinner.stop().await;

    match result {
        Ok(Submission::Warned(message)) => eprintln!("  ⚠ {message}"),
        Ok(Submission::Completed { run, id }) => {
            print!("\n{}", render_run(&run));
            match id {
                Some(id) => println!("\n✓ saved as #{id}"),
                None => eprintln!("\n✗ every step failed, nothing saved"),
            }
        }
        Err(e) => eprintln!("\nerror: {e:#}"),
    }
}

/// `--db` if given, else `~/.dealflow/dealflow.db` (created on demand).
fn resolve_db_path(flag: Option<&str>) -> anyhow::Result<String> {
    if let Some(path) = flag {
        return Ok(path.to_string());
    }
    let Some(path) = default_db_path() else {
        return Ok("dealflow.db".to_string());
    };
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    Ok(path.to_string_lossy().into_owned())
}
