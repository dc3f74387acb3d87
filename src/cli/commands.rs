use std::fmt::Write as _;

use crate::app::about::about_text;
use crate::app::{AppContext, NewsumError, Result};
use crate::client::Source;
use crate::config::{Preferences, TextScale};
use crate::domain::{FetchState, Headline, NewsSummary};
use crate::orchestrator::{Orchestrator, RefreshOutcome};

/// One deadline-bounded refresh, turning anything but success into an error
/// carrying the user-facing message.
async fn load_once<S: Source>(orchestrator: &Orchestrator<S>) -> Result<FetchState<S::Item>> {
    match orchestrator.refresh_with_deadline().await {
        RefreshOutcome::Loaded { count } => {
            tracing::debug!(count, "Refresh complete");
            Ok(orchestrator.snapshot())
        }
        RefreshOutcome::Failed { message } => Err(NewsumError::Other(message)),
        RefreshOutcome::TimedOut => {
            let message = orchestrator
                .snapshot()
                .error_message
                .unwrap_or_else(|| NewsumError::TimedOut(orchestrator.policy().deadline).user_message());
            Err(NewsumError::Other(message))
        }
        other => Err(NewsumError::Other(format!("Refresh did not complete: {other:?}"))),
    }
}

pub async fn list_headlines(ctx: &AppContext, json: bool) -> Result<()> {
    let orchestrator = ctx.headlines()?;
    let state = load_once(&orchestrator).await?;

    if json {
        let out = serde_json::to_string_pretty(&*state.items)
            .map_err(|e| NewsumError::Other(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    if state.items.is_empty() {
        println!("No headlines");
        return Ok(());
    }

    for (index, headline) in state.items.iter().enumerate() {
        println!("{}", headline_row(index, headline));
    }

    Ok(())
}

pub async fn show_headline(ctx: &AppContext, index: usize) -> Result<()> {
    let orchestrator = ctx.headlines()?;
    let state = load_once(&orchestrator).await?;

    let headline = state.items.get(index).ok_or_else(|| {
        NewsumError::Other(format!(
            "No headline at index {} ({} available)",
            index,
            state.items.len()
        ))
    })?;

    print!("{}", headline_detail(headline));
    Ok(())
}

pub async fn list_latest(ctx: &AppContext) -> Result<()> {
    let orchestrator = ctx.latest()?;
    let state = load_once(&orchestrator).await?;

    if state.items.is_empty() {
        println!("No summaries");
        return Ok(());
    }

    for summary in state.items.iter() {
        println!("{}", summary_block(summary));
    }

    Ok(())
}

pub fn text_scale(ctx: &AppContext, value: Option<f64>) -> Result<()> {
    let mut prefs = ctx.load_preferences();

    if let Some(value) = value {
        let scale = TextScale::from(value);
        if scale.value() != value {
            println!("Adjusted {} to {}", value, scale);
        }
        prefs = Preferences { text_scale: scale };
        ctx.save_preferences(&prefs)?;
    }

    println!("Text scale: {}", prefs.text_scale);
    Ok(())
}

pub fn about() {
    print!("{}", about_text());
}

fn headline_row(index: usize, headline: &Headline) -> String {
    format!(
        "{:>3}  {}  {:<16}  {}",
        index,
        headline.published_at.format("%Y-%m-%d %H:%M"),
        headline.source_name,
        headline.display_title()
    )
}

fn headline_detail(headline: &Headline) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", headline.display_title());
    let _ = writeln!(out, "{} <{}>", headline.source_name, headline.source_url);
    let _ = writeln!(
        out,
        "Published: {}",
        headline.published_at.format("%Y-%m-%d %H:%M UTC")
    );
    if let Some(generated) = headline.summary_generated_at {
        let _ = writeln!(out, "Summarized: {}", generated.format("%Y-%m-%d %H:%M UTC"));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", headline.display_content());
    if !headline.summary.trim().is_empty() && !headline.description.trim().is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", headline.description);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", headline.url);
    out
}

fn summary_block(summary: &NewsSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", summary.title, summary.source_name);
    if let Some(keywords) = summary.keyword_line() {
        let _ = writeln!(out, "  [{}]", keywords);
    }
    let _ = writeln!(out, "  {}", summary.summary);
    let _ = write!(out, "  {}", summary.reference_url);
    out
}
