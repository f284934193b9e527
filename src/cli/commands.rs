use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app::{AppContext, GoodscribeError, Result};
use crate::domain::{DynamicStatus, MediaCandidates, ProductReport};
use crate::pipeline::{LoginCheckpoint, Outcome, ScrapeRequest};

pub struct RunOptions {
    pub cookie: Option<String>,
    pub login_confirmed: bool,
    pub json: bool,
    pub no_prompt: bool,
}

pub async fn run(ctx: &AppContext, text: &str, options: RunOptions) -> Result<()> {
    let request = ScrapeRequest {
        raw_text: text.to_string(),
        cookie: options.cookie,
        login_confirmed: options.login_confirmed,
    };

    let checkpoint = match ctx.pipeline.run(&request).await? {
        Outcome::Completed(report) => return print_report(&report, options.json),
        Outcome::AwaitingLogin(checkpoint) => checkpoint,
    };

    println!("This page needs a logged-in session ({}).", checkpoint.url);
    if options.no_prompt {
        println!("Run `goodscribe login` with the same link, then retry with --login-confirmed.");
        return Err(GoodscribeError::LoginRequired {
            url: checkpoint.url,
        });
    }

    if !prompt_login(ctx, &checkpoint.login_url).await? {
        return Err(GoodscribeError::LoginRequired {
            url: checkpoint.url,
        });
    }

    match ctx.pipeline.run(&checkpoint.confirm()).await? {
        Outcome::Completed(report) => print_report(&report, options.json),
        Outcome::AwaitingLogin(LoginCheckpoint { url, .. }) => {
            Err(GoodscribeError::LoginRequired { url })
        }
    }
}

pub async fn login(ctx: &AppContext, text: &str) -> Result<()> {
    let link = ctx.normalizer.normalize(text)?;
    if prompt_login(ctx, link.target_url()).await? {
        println!("Session saved.");
    }
    Ok(())
}

pub fn normalize(ctx: &AppContext, text: &str, json: bool) -> Result<()> {
    let link = ctx.normalizer.normalize(text)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&link)?);
        return Ok(());
    }

    println!("Original:   {}", link.original_url);
    println!("Goods id:   {}", link.goods_id.as_deref().unwrap_or("-"));
    println!("Normalized: {}", link.normalized_url.as_deref().unwrap_or("-"));
    Ok(())
}

/// Open a login window and wait for the user to press Enter.
///
/// Returns false if stdin closed before confirmation; nothing is saved then.
async fn prompt_login(ctx: &AppContext, url: &str) -> Result<bool> {
    let window = ctx.login_window().open(url).await?;
    println!("Log in using the browser window, then press Enter here to continue.");

    let mut line = String::new();
    let read = BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    if read == 0 {
        window.cancel().await;
        println!("No confirmation received, session not saved.");
        return Ok(false);
    }

    let saved = window.confirm().await?;
    println!("Saved {} cookie(s).", saved);
    Ok(true)
}

fn print_report(report: &ProductReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let d = &report.diagnostics;
    println!("Title: {}", report.title.as_deref().unwrap_or("-"));
    println!("Image: {}", report.image_url.as_deref().unwrap_or("-"));
    println!("Video: {}", report.video_url.as_deref().unwrap_or("-"));
    println!();
    println!("== Selling points ==\n{}\n", report.selling_points);
    println!("== 30s script ==\n{}\n", report.script);
    println!("== Social post ==\n{}\n", report.rewrite);
    println!(
        "Source: {:?}, copy: {:?}, browser: {}",
        report.source,
        report.generated_by,
        dynamic_label(&d.dynamic)
    );
    println!("Tried: {}", d.attempted_urls.join(", "));
    for error in &d.static_errors {
        eprintln!("  {}", error);
    }
    if report.video_url.is_none() {
        for line in candidate_lines(&d.candidates) {
            println!("{}", line);
        }
    }
    Ok(())
}

/// Media the scrape saw, for checking by hand when no video was kept.
fn candidate_lines(candidates: &MediaCandidates) -> Vec<String> {
    if candidates.is_empty() && candidates.network_urls_count == 0 {
        return Vec::new();
    }

    let mut lines = vec![format!(
        "No playable video found; {} network response(s) seen. Candidates:",
        candidates.network_urls_count
    )];
    let groups = [
        ("video", &candidates.video_candidates),
        ("json video", &candidates.json_video_candidates),
        ("image", &candidates.image_candidates),
    ];
    for (label, urls) in groups {
        lines.extend(urls.iter().map(|u| format!("  {:<10} {}", label, u)));
    }
    lines
}

fn dynamic_label(status: &DynamicStatus) -> String {
    match status {
        DynamicStatus::Skipped => "skipped".to_string(),
        DynamicStatus::Rendered => "rendered".to_string(),
        DynamicStatus::LoginRequired => "login required".to_string(),
        DynamicStatus::Failed(reason) => format!("failed ({})", reason),
    }
}
