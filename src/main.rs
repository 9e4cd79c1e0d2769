use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use uninavi_search::config::load_config;
use uninavi_search::stream::stage_label;
use uninavi_search::{
    HttpTransport, MemoryFavorites, SearchFilters, SearchSession, SessionPhase, SessionState,
};

/// uninavi-search - Stream university search results from the uninavi backend
#[derive(Parser, Debug)]
#[command(name = "uninavi-search")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Stream university search results from the uninavi backend", long_about = None)]
struct Cli {
    /// Enable verbose logging (can be used multiple times: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Search backend base URL (overrides config and UNINAVI_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Print results as JSON instead of a table
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    filters: FilterArgs,
}

/// Search criteria, passed through to the backend unmodified.
#[derive(clap::Args, Debug, Default)]
struct FilterArgs {
    /// Region (e.g. 関東)
    #[arg(long, default_value = "")]
    region: String,

    /// Prefecture (e.g. 東京都)
    #[arg(long, default_value = "")]
    prefecture: String,

    /// Faculty keyword (e.g. 情報)
    #[arg(long, default_value = "")]
    faculty: String,

    /// Exam type (e.g. 一般選抜)
    #[arg(long, default_value = "")]
    exam_type: String,

    /// Common-test usage (あり / なし)
    #[arg(long, default_value = "")]
    use_common_test: String,

    /// Deviation score range (e.g. 55-65)
    #[arg(long, default_value = "")]
    deviation_score: String,

    /// Institution type (国公立 / 私立)
    #[arg(long, default_value = "")]
    institution_type: String,

    /// Institution name keyword
    #[arg(long, default_value = "")]
    name_keyword: String,

    /// Common-test score range (e.g. 70-85%)
    #[arg(long, default_value = "")]
    common_test_score: String,

    /// External English certification (あり / 不要)
    #[arg(long, default_value = "")]
    external_english: String,

    /// Required subjects summary
    #[arg(long, default_value = "")]
    required_subjects: String,

    /// Tuition cap (e.g. 150万円以内)
    #[arg(long, default_value = "")]
    tuition_max: String,

    /// Scholarship availability (あり)
    #[arg(long, default_value = "")]
    scholarship: String,

    /// Qualification keyword
    #[arg(long, default_value = "")]
    qualification: String,

    /// Exam schedule constraint
    #[arg(long, default_value = "")]
    exam_schedule: String,
}

impl From<FilterArgs> for SearchFilters {
    fn from(args: FilterArgs) -> Self {
        SearchFilters {
            region: args.region,
            prefecture: args.prefecture,
            faculty: args.faculty,
            exam_type: args.exam_type,
            use_common_test: args.use_common_test,
            deviation_score: args.deviation_score,
            institution_type: args.institution_type,
            name_keyword: args.name_keyword,
            common_test_score: args.common_test_score,
            external_english: args.external_english,
            required_subjects: args.required_subjects,
            tuition_max: args.tuition_max,
            scholarship: args.scholarship,
            qualification: args.qualification,
            exam_schedule: args.exam_schedule,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("uninavi_search={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(api_url) = cli.api_url {
        config.api.base_url = api_url;
    }

    let transport = HttpTransport::with_settings(
        &config.api.base_url,
        &config.api.user_agent,
        config.api.connect_timeout(),
    )
    .context("failed to set up the search transport")?;

    let favorites = Arc::new(MemoryFavorites::new());
    let mut session = SearchSession::new(Arc::new(transport), favorites);
    let mut updates = session.watch();
    session.start(cli.filters.into());

    let show_bar = !cli.quiet && !cli.json && std::io::stderr().is_terminal();
    let bar = make_progress_bar(show_bar)?;

    let final_state = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                session.cancel();
                break session.snapshot();
            }
            changed = updates.changed() => {
                changed.context("session state channel closed")?;
                let state = updates.borrow_and_update().clone();
                render_progress(&bar, &state);
                if state.phase.is_terminal() && !state.loading {
                    break state;
                }
            }
        }
    };
    bar.finish_and_clear();

    report(&final_state, cli.json, cli.quiet)
}

fn make_progress_bar(visible: bool) -> Result<ProgressBar> {
    if !visible {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:30.cyan/blue} {pos:>3}% {msg}")
            .context("invalid progress bar template")?,
    );
    bar.enable_steady_tick(Duration::from_millis(120));
    Ok(bar)
}

fn render_progress(bar: &ProgressBar, state: &SessionState) {
    bar.set_position(state.progress_value.round() as u64);
    if let Some(progress) = &state.progress {
        bar.set_message(format!(
            "[{}] {}",
            stage_label(&progress.stage),
            progress.message
        ));
    }
}

fn report(state: &SessionState, json: bool, quiet: bool) -> Result<()> {
    if let Some(error) = &state.error {
        eprintln!("{} {}", "検索エラー:".red().bold(), error);
    }
    if state.phase == SessionPhase::Cancelled && !quiet {
        eprintln!("{}", "検索が中断されました。".yellow());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&state.results)?);
        return Ok(());
    }

    if state.results.is_empty() {
        if !quiet {
            println!("結果はありません。");
        }
        return Ok(());
    }

    if !quiet {
        let count = format!("取得済 {} 件", state.results.len());
        match state.expected_total {
            Some(total) => println!("{} / 推定 {} 件", count.bold(), total),
            None => println!("{}", count.bold()),
        }
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(["大学名", "学部 / 学科", "偏差値", "共テ", "方式", "試験日"]);

    for university in &state.results {
        let faculty = if university.department.is_empty() {
            university.faculty.clone()
        } else {
            format!("{} / {}", university.faculty, university.department)
        };
        table.add_row([
            Cell::new(&university.name),
            Cell::new(faculty),
            Cell::new(&university.deviation_score),
            Cell::new(&university.common_test_score),
            Cell::new(&university.exam_type),
            Cell::new(&university.exam_date),
        ]);
    }
    println!("{table}");

    Ok(())
}
