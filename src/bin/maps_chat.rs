//! maps-chat：地图对话助手的命令行前端
//!
//! Usage:
//!   maps-chat [--config <path>]
//!
//! Shows the initial map location and a suggested prompt, then reads one
//! message per line from stdin and prints turn events and map queries as
//! they happen. `RUST_LOG` controls log output (stderr).

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use ai_maps_agent::client::{ChatSession, GeminiChat};
use ai_maps_agent::config::{example_prompt, INITIAL_LOCATION};
use ai_maps_agent::router::{ChannelMapRenderer, MapRenderer};
use ai_maps_agent::tools::{HttpLocationLookup, MapToolbox};
use ai_maps_agent::{
    AgentConfig, ChatState, HttpTransport, MapQuery, ToolDispatcher, ToolRegistry, TurnEvent,
};
use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = match config_path() {
        Some(path) => AgentConfig::from_yaml_file(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AgentConfig::from_env()?,
    };

    let transport = HttpTransport::new()?;
    let (map_tx, mut map_rx) = mpsc::unbounded_channel();
    let lookup = HttpLocationLookup::new(&config.lookup, transport.clone())?;
    let renderer = Arc::new(ChannelMapRenderer::new(map_tx));
    renderer.render_map_query(MapQuery::location(INITIAL_LOCATION));
    let toolbox = MapToolbox::new(renderer, Arc::new(lookup));
    let registry = Arc::new(ToolRegistry::with_map_tools(Arc::new(toolbox))?);

    let model = GeminiChat::new(&config, transport, registry.definitions())
        .context("set GEMINI_API_KEY or API_KEY")?;
    let mut session =
        ChatSession::new(Arc::new(model), ToolDispatcher::new(registry)).with_config(&config);

    tokio::spawn(async move {
        while let Some(query) = map_rx.recv().await {
            match serde_json::to_string(&query) {
                Ok(json) => println!("[map] {}", json),
                Err(e) => tracing::warn!(error = %e, "unprintable map query"),
            }
        }
    });

    println!("Try: {}", example_prompt(uuid::Uuid::new_v4().as_u128()));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.is_empty() {
            prompt();
            continue;
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        let printer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                print_event(&event);
            }
        });

        let summary = session.send_message(text, tx).await;
        printer.await?;
        println!("{}", summary.answer_html.trim_end());
        prompt();
    }

    Ok(())
}

fn config_path() -> Option<PathBuf> {
    let args: Vec<String> = std::env::args().collect();
    args.iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn print_event(event: &TurnEvent) {
    match event {
        TurnEvent::StateChanged { state } if *state != ChatState::Idle => {
            eprintln!("[{:?}]", state);
        }
        TurnEvent::MessageAdded { role, html } => {
            println!("[{:?}] {}", role, html.trim_end());
        }
        TurnEvent::ToolCallCompleted { call, result } => {
            println!("[tool] {} -> {}", call.name, result.joined_text());
        }
        _ => {}
    }
}
