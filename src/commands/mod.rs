/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`: Interactive conversation with local tool dispatch
- `content`: Daily posts, deep insight and article reading
- `render`: Terminal rendering of widgets and content

Handlers are small and wire together the library components:
gateway, tools, session, cache and content service.
*/

use crate::config::Config;
use crate::content::{ContentFailure, DailyContentCache, DailyContentService};
use crate::providers::create_gateway;
use crate::resilience::ErrorClassifier;
use crate::storage::SledStore;
use std::sync::Arc;

/// Build the content service backed by the on-disk store
///
/// Failures are classified so that a missing API key is reported as
/// `AUTH_REQUIRED` like any other credential problem.
pub fn build_content_service(
    config: &Config,
) -> std::result::Result<DailyContentService, ContentFailure> {
    let classify = |context: &str, e: anyhow::Error| ContentFailure {
        class: ErrorClassifier::default().classify(&e),
        detail: format!("{}: {:#}", context, e),
    };

    let gateway = create_gateway(&config.gateway).map_err(|e| classify("gateway", e))?;
    let path = config
        .storage
        .resolve_path()
        .map_err(|e| classify("storage", e))?;
    let store = SledStore::open(&path).map_err(|e| classify("storage", e))?;
    tracing::debug!("Content store at {}", path.display());

    let cache = Arc::new(DailyContentCache::new(
        Arc::new(store),
        config.content.namespace.clone(),
    ));
    Ok(DailyContentService::new(
        gateway,
        cache,
        config.content.clone(),
    ))
}

/// Print a content failure and convert it for the process exit path
fn report_failure(failure: ContentFailure) -> anyhow::Error {
    use colored::Colorize;

    eprintln!("{}", render::failure(&failure).red());
    if failure.requires_reauthentication() {
        eprintln!(
            "{}",
            "Re-authenticate: set GEMINI_API_KEY (or API_KEY) and try again.".yellow()
        );
    }
    failure.into()
}

// Terminal rendering
pub mod render {
    //! Plain-text rendering shared by the chat and content handlers.

    use crate::content::{ContentFailure, DeepInsight, GeneratedPost};
    use crate::tools::Widget;

    /// Render a widget as a short text card
    pub fn widget(widget: &Widget) -> String {
        match widget {
            Widget::Product(p) => {
                let mut out = format!(
                    "[PRODUCT] {}  ::  {}\n  {}\n  {}",
                    p.name, p.status, p.specs, p.url
                );
                if let Some(external) = &p.external_url {
                    out.push_str(&format!("\n  {}", external));
                }
                out
            }
            Widget::Status(s) => format!(
                "[STATUS] node {}\n  uptime {}  load {}  stability {}\n  nodes {}  temp {}  memory {}",
                s.node_id,
                s.uptime,
                s.neural_load,
                s.signal_stability,
                s.active_nodes,
                s.core_temperature,
                s.memory_integrity
            ),
            Widget::Navigation(n) => format!("[NAVIGATION] {} -> {}", n.page, n.path),
        }
    }

    /// One line per post for the daily listing
    pub fn post_summary(post: &GeneratedPost) -> String {
        format!(
            "{}  [{}]  {}\n    {}\n    {}",
            post.date, post.category, post.title, post.excerpt, post.id
        )
    }

    /// Full post with its article body, if any
    pub fn post_article(post: &GeneratedPost) -> String {
        let body = post.content.as_deref().unwrap_or(&post.excerpt);
        format!("{}\n{}  [{}]\n\n{}", post.title, post.date, post.category, body)
    }

    pub fn insight(insight: &DeepInsight) -> String {
        let mut out = format!("LOGIC\n  {}\n\nTRENDS\n", insight.logic);
        for (i, trend) in insight.trends.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, trend));
        }
        out.push_str(&format!("\nPREDICTION\n  {}", insight.prediction));
        out
    }

    pub fn failure(failure: &ContentFailure) -> String {
        format!("[{}] {}", failure.class, failure.detail)
    }
}

// Chat command handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Creates the gateway, tool registry and session, then runs a
    //! readline loop. Navigation requests from tools arrive on a channel
    //! and are printed as they fire.

    use super::render;
    use crate::agent::{ConversationSession, SendOutcome, UiCommand};
    use crate::config::Config;
    use crate::error::Result;
    use crate::providers::create_gateway;
    use crate::tools::ToolRegistry;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use std::sync::Arc;
    use std::time::Duration;

    /// Start interactive chat mode
    ///
    /// # Errors
    ///
    /// Returns error if the gateway cannot be created or the terminal
    /// cannot be initialized. Failed exchanges are shown inline.
    pub async fn run_chat(config: Config) -> Result<()> {
        let gateway = create_gateway(&config.gateway)?;
        let tools = Arc::new(ToolRegistry::with_defaults(Duration::from_millis(
            config.chat.navigation_delay_ms,
        )));

        let (ui_tx, mut ui_rx) = tokio::sync::mpsc::unbounded_channel();
        let session = ConversationSession::new(gateway, tools, config.chat.clone(), config.locale)
            .with_ui_channel(ui_tx);

        tokio::spawn(async move {
            while let Some(command) = ui_rx.recv().await {
                match command {
                    UiCommand::Navigate { path } => {
                        println!("{}", format!(">> navigating to {}", path).cyan());
                    }
                }
            }
        });

        for message in session.history() {
            println!("{}\n", message.text.green());
        }

        let mut rl = DefaultEditor::new()?;
        loop {
            match rl.readline("astrai> ") {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    if matches!(input, "exit" | "quit") {
                        break;
                    }
                    let _ = rl.add_history_entry(input);

                    match session.send(input).await {
                        SendOutcome::Replied(message) => {
                            if session.is_tool_active() {
                                println!("{}", "[neural tools engaged]".dimmed());
                            }
                            println!("\n{}", message.text);
                            if let Some(widget) = &message.widget {
                                println!("{}", render::widget(widget).cyan());
                            }
                            println!();
                        }
                        SendOutcome::Failed(notice) => {
                            eprintln!("{}\n", notice.text.red());
                        }
                        SendOutcome::Ignored => {}
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        println!("Link closed.");
        Ok(())
    }
}

// Daily content command handlers
pub mod content {
    //! Daily posts, deep insight and article reading.

    use super::{build_content_service, render, report_failure};
    use crate::config::Config;
    use crate::error::Result;
    use colored::Colorize;

    /// Print today's posts, generating them on a cache miss
    pub async fn run_daily(config: Config) -> Result<()> {
        let service = build_content_service(&config).map_err(report_failure)?;
        let posts = service
            .daily_posts(config.locale)
            .await
            .map_err(report_failure)?;

        println!(
            "{}\n",
            format!("SIGNALS {} ({})", service.today(), config.locale).bold()
        );
        for post in &posts {
            println!("{}\n", render::post_summary(post));
        }
        Ok(())
    }

    /// Print today's deep insight
    pub async fn run_insight(config: Config) -> Result<()> {
        let service = build_content_service(&config).map_err(report_failure)?;
        let insight = service
            .deep_insight(config.locale)
            .await
            .map_err(report_failure)?;
        println!("{}", render::insight(&insight));
        Ok(())
    }

    /// Print one post with its full article
    pub async fn run_read(config: Config, post_id: &str) -> Result<()> {
        let service = build_content_service(&config).map_err(report_failure)?;
        let post = service
            .expand_post(config.locale, post_id)
            .await
            .map_err(report_failure)?;
        println!("{}", render::post_article(&post));
        Ok(())
    }
}
