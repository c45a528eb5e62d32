use anyhow::{Context, Result};
use clap::Parser;

mod app;
mod chat;
mod cli;
mod config;
mod errors;
mod export;
mod generate;
mod history;
mod log;
mod model;
mod prompt;
mod provider;
mod ux;
mod wire;

use app::{Action, AppState, GenerationOutcome};
use cli::{ChatArgs, Command, ExportArgs, GenerateArgs, HistoryCommand};
use errors::MobiusError;
use history::HistoryStore;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    log::init(args.debug);

    let mut cfg = config::Config::load(args.config.as_deref())?;
    if let Some(m) = args.model {
        cfg.default_model = m;
    }
    if let Some(d) = &args.data_dir {
        cfg.data_dir = d.clone();
    }

    let history = HistoryStore::open_dir(&cfg.data_dir);

    match args.command {
        Command::History { action } => run_history(action, history),
        Command::Export(e) => run_export(e, &history, &cfg),
        Command::Generate(g) => {
            let app = make_app(&cfg, args.debug, args.api_key, history)?;
            run_generate(g, app, &cfg).await
        }
        Command::Chat(c) => {
            let app = make_app(&cfg, args.debug, args.api_key, history)?;
            run_chat(c, app).await
        }
    }
}

fn make_app(
    cfg: &config::Config,
    debug: bool,
    api_key: Option<String>,
    history: HistoryStore,
) -> Result<AppState> {
    let prov = provider::make_provider(cfg, debug)?;
    let mut app = AppState::new(cfg, prov, history);

    let key = match api_key {
        Some(k) if !k.trim().is_empty() => k,
        _ => ux::read_line("Enter Gemini API Key: ").unwrap_or_default(),
    };
    app.apply(Action::SetApiKey(key.trim().to_string()))?;
    Ok(app)
}

async fn run_generate(args: GenerateArgs, mut app: AppState, cfg: &config::Config) -> Result<()> {
    for action in args.profile_actions() {
        app.apply(action)?;
    }
    if args.interactive {
        for action in ux::questionnaire(app.form()) {
            app.apply(action)?;
        }
    }

    if !app.has_api_key() {
        return Err(MobiusError::MissingCredential).context("Please enter your Google GenAI API Key.");
    }

    let pb = ux::spinner("Generating Strategy...");
    let outcome = app.generate().await;
    pb.finish_and_clear();

    let created_at = match outcome? {
        GenerationOutcome::Applied { created_at, .. } => created_at,
        GenerationOutcome::Superseded => return Ok(()),
    };
    let content = app.output().unwrap_or_default();
    ux::show_output(content);

    if let Some(format) = args.export {
        let dir = args.export_dir.unwrap_or_else(|| cfg.export_dir.clone());
        let path = export::export(content, format, &dir, created_at)?;
        ux::show_notice(&format!("Saved to {}", path.display()));
    }
    Ok(())
}

async fn run_chat(args: ChatArgs, mut app: AppState) -> Result<()> {
    if !app.chat().session().is_ready() {
        return Err(MobiusError::SessionNotReady.into());
    }

    if let Some(msg) = args.message {
        let pb = ux::spinner("Thinking...");
        let turn = app.send_chat(&msg).await?.cloned();
        pb.finish_and_clear();
        if let Some(turn) = turn {
            ux::show_turn(&turn);
        }
        return Ok(());
    }

    ux::banner();
    if let Some(model) = app.chat().session().model() {
        println!("Powered by {}. Type /exit to leave.\n", model.display_name());
    }
    for turn in app.chat().turns() {
        ux::show_turn(turn);
    }

    while let Some(line) = ux::read_line("> ") {
        if line.trim() == "/exit" {
            break;
        }
        let pb = ux::spinner("Thinking...");
        let result = app.send_chat(&line).await.map(|t| t.cloned());
        pb.finish_and_clear();
        match result {
            Ok(Some(turn)) => ux::show_turn(&turn),
            Ok(None) => {}
            Err(e) => ux::show_error(&e.to_string()),
        }
    }
    Ok(())
}

fn run_history(action: HistoryCommand, mut history: HistoryStore) -> Result<()> {
    match action {
        HistoryCommand::List => ux::show_history(history.load_all()),
        HistoryCommand::Show { id } => {
            let item = history.load_one(&id)?;
            ux::show_history(std::slice::from_ref(item));
            ux::show_output(&item.content);
        }
        HistoryCommand::Clear { yes } => {
            if yes || ux::confirm("Delete all saved strategies?") {
                history.clear()?;
                ux::show_notice("History cleared.");
            }
        }
    }
    Ok(())
}

fn run_export(args: ExportArgs, history: &HistoryStore, cfg: &config::Config) -> Result<()> {
    let item = history.load_one(&args.id)?;
    let dir = args.dir.unwrap_or_else(|| cfg.export_dir.clone());
    let path = export::export(&item.content, args.format, &dir, item.timestamp)?;
    ux::show_notice(&format!("Saved to {}", path.display()));
    Ok(())
}
