//! Passage application binary - composition root.
//!
//! Ties the chat engine to a terminal session:
//! 1. Load configuration from TOML
//! 2. Refuse to start without a signed-in user
//! 3. Build the engine against the configured answering backend
//! 4. Run a line-oriented loop: plain lines are questions, `/` lines are
//!    commands for chat management, citations, and text selection
//!
//! Questions are resolved in spawned tasks while the loop keeps reading, so
//! a slow answer on one chat never blocks switching to or asking in another.

mod cli;

use std::io::Write as _;
use std::time::Duration;

use clap::Parser;
use passage_chat::{
    validate_log_level, AnswerPayload, AnsweringClient, Author, ChatEngine, ChatId,
    PassageConfig, Point, SuggestionGateway,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;

use cli::CliArgs;

const HELP: &str = "\
commands:
  /new               start a new chat
  /chats             list chats
  /switch <n>        make chat n active
  /sources           show citations for the current answer
  /select <text>     select text from the citation panel
  /ask [question]    ask about the selection (bare selection if omitted)
  /dismiss           drop the selection
  /suggest           follow-up suggestions for the last answer
  /quit              exit
anything else is sent to the active chat as a question.";

type Engine = ChatEngine<AnsweringClient>;
type Pending = JoinSet<(ChatId, AnswerPayload)>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config_file = args.resolve_config_path();
    let config = PassageConfig::load_or_default(&config_file);

    // Tracing. CLI override wins over the config file; unknown levels
    // degrade to info.
    let log_level = validate_log_level(
        &args
            .resolve_log_level()
            .unwrap_or_else(|| config.general.log_level.clone()),
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    tracing::info!("Starting Passage v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Auth gate: without a signed-in user the session is unreachable.
    let Some(user) = args.resolve_user() else {
        eprintln!("passage: no user signed in (set --user or PASSAGE_USER)");
        std::process::exit(1);
    };
    tracing::info!(%user, "User signed in");

    let backend_url = args.resolve_backend_url(&config.backend.endpoint);
    let timeout = Duration::from_secs(config.backend.request_timeout_secs);
    let transport = AnsweringClient::new(backend_url.clone(), timeout)?;
    let mut engine = ChatEngine::new(transport);
    tracing::info!(%backend_url, "Answering backend configured");

    let suggestions = if config.suggestions.enabled {
        let client = AnsweringClient::new(config.suggestions.endpoint.clone(), timeout)?;
        Some(SuggestionGateway::new(client))
    } else {
        None
    };

    println!("passage — signed in as {user}. Type /help for commands.");

    // In-flight answers, keyed by the chat they belong to.
    let mut pending: Pending = JoinSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_line(&mut engine, &mut pending, &suggestions, line.trim()).await {
                    break;
                }
            }
            Some(joined) = pending.join_next() => {
                match joined {
                    Ok((chat_id, answer)) => match engine.complete_send(chat_id, answer) {
                        Ok(reply) => print_reply(&engine, &reply.content),
                        Err(e) => println!("error: {e}"),
                    },
                    Err(e) => println!("error: {e}"),
                }
            }
        }
    }

    tracing::info!("Passage shutting down");
    Ok(())
}

/// Dispatch one input line. Returns false when the session should end.
async fn handle_line(
    engine: &mut Engine,
    pending: &mut Pending,
    suggestions: &Option<SuggestionGateway<AnsweringClient>>,
    line: &str,
) -> bool {
    if line.is_empty() {
        return true;
    }

    match line.split_once(' ').map_or((line, ""), |(c, rest)| (c, rest.trim())) {
        ("/quit", _) | ("/exit", _) => return false,
        ("/help", _) => println!("{HELP}"),
        ("/new", _) => {
            engine.create_chat();
            println!("started a new chat");
        }
        ("/chats", _) => {
            let active = engine.active_chat().map(|c| c.id);
            for (i, chat) in engine.chats().iter().enumerate() {
                let marker = if Some(chat.id) == active { "*" } else { " " };
                println!("{marker} {i}: {} — {}", chat.title, chat.last_message_preview());
            }
        }
        ("/switch", n) => {
            let target = n
                .parse::<usize>()
                .ok()
                .and_then(|i| engine.chats().get(i).map(|c| c.id));
            match target {
                Some(id) => match engine.select_chat(id) {
                    Ok(()) => {
                        let title = engine.active_chat().map(|c| c.title.as_str()).unwrap_or("?");
                        println!("switched to: {title}");
                    }
                    Err(e) => println!("error: {e}"),
                },
                None => println!("no such chat (see /chats)"),
            }
        }
        ("/sources", _) => {
            let citations = engine.presenter().citations();
            if citations.is_empty() {
                println!("no sources for the current answer");
            }
            for citation in citations {
                let highlight = if engine.presenter().is_highlighted(&citation.text) {
                    " [highlighted]"
                } else {
                    ""
                };
                let lines_note = citation
                    .line_range
                    .map(|r| format!(" (lines {}-{})", r.from, r.to))
                    .unwrap_or_default();
                println!("[{}{lines_note}]{highlight} {}", citation.source_label, citation.text);
            }
        }
        ("/select", text) if !text.is_empty() => {
            engine.on_select(text, Point { x: 0.0, y: 0.0 });
            println!("selected: {text}");
        }
        ("/select", _) => println!("usage: /select <text>"),
        ("/ask", free) => {
            let free_text = (!free.is_empty()).then_some(free);
            match engine.take_selection_question(free_text) {
                Some(question) => start_question(engine, pending, question),
                None => println!("nothing selected (use /select first)"),
            }
        }
        ("/dismiss", _) => {
            engine.dismiss_selection();
            println!("selection dismissed");
        }
        ("/suggest", _) => match (suggestions, last_answer_text(engine)) {
            (None, _) => println!("suggestions are disabled in the configuration"),
            (_, None) => println!("no answer to suggest follow-ups for"),
            (Some(gateway), Some(text)) => {
                for suggestion in gateway.follow_ups(&text).await {
                    println!("  ? {suggestion}");
                }
            }
        },
        _ => start_question(engine, pending, line.to_string()),
    }
    true
}

/// Begin a send on the active chat and resolve the answer in the
/// background; the loop completes it when the gateway returns.
fn start_question(engine: &mut Engine, pending: &mut Pending, question: String) {
    let chat_id = match engine.active_chat() {
        Some(chat) => chat.id,
        None => engine.create_chat(),
    };
    match engine.begin_send(chat_id, &question) {
        Ok(_) => {
            let gateway = engine.gateway();
            pending.spawn(async move { (chat_id, gateway.ask(&question).await) });
        }
        Err(e) => println!("error: {e}"),
    }
}

fn print_reply(engine: &Engine, content: &str) {
    println!("{content}");
    let n = engine.presenter().citations().len();
    if n > 0 {
        println!("({n} source{} — /sources to view)", if n == 1 { "" } else { "s" });
    }
}

fn last_answer_text(engine: &Engine) -> Option<String> {
    engine.active_chat().and_then(|chat| {
        chat.messages
            .iter()
            .rev()
            .find(|m| m.author == Author::Assistant)
            .map(|m| m.content.clone())
    })
}
