use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use clap::{ Parser, arg, command, Subcommand, Args };
use tokio::io::{ stdin, AsyncBufReadExt, BufReader };
use tracing::info;

mod backend;
mod controller;
mod logger;
mod model;
mod validator;
mod view;

use backend::HttpBackend;
use controller::{ RequestController, RequestState };

#[derive(Parser)]
#[command(
    version,
    about = "IP threat intelligence client",
    long_about = "IP threat intelligence client\n\n\
    Submits an IP address to an aggregation backend that combines reputation\n\
    feeds with an AI risk assessment, and renders the returned report."
)]
struct Cli {
    #[command(subcommand)]
    subcommand: SubCommands,
    /// Increase logging verbosity
    #[arg(short('v'), long, action = clap::ArgAction::Count)]
    verbosity: u8,
}

#[derive(Subcommand)]
pub enum SubCommands {
    #[command(
        about = "Analyze an IP address",
        long_about = "Analyze a single IP address, or start an interactive prompt when no address is given",
        name = "analyze"
    )] AnalyzeCommand(AnalyzeArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Aggregation backend base URL
    #[arg(
        short('u'),
        long = "url",
        env = "IPINTEL_URL",
        value_name = "url",
        default_value = "http://localhost:8000"
    )]
    pub url: String,
    /// IP address to analyze; when omitted, addresses are read interactively
    #[arg(value_name = "ip")]
    pub ip: Option<String>,
    /// Start with the raw threat intel sources expanded
    #[arg(long = "show-raw", env = "IPINTEL_SHOW_RAW", default_value_t = false)]
    pub show_raw: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    run(true).await
}

async fn run(require_logging: bool) -> Result<()> {
    let args = Cli::parse();
    let level = logger::verbosity_to_level_filter(args.verbosity);
    let sub = logger::setup_logger(level)?;
    let log_result = tracing::subscriber::set_global_default(sub);
    if require_logging {
        log_result?;
    }

    let SubCommands::AnalyzeCommand(aargs) = args.subcommand;
    info!("using aggregation backend at {}", aargs.url);
    let backend = Arc::new(HttpBackend::new(aargs.url));
    let controller = Arc::new(RequestController::new(backend));

    match aargs.ip {
        Some(ip) => {
            controller.submit(&ip).await;
            // a failed lookup is rendered state, not a process failure
            render(&controller.current(), aargs.show_raw);
        }
        None => {
            prompt_loop(&controller, aargs.show_raw).await?;
        }
    }
    Ok(())
}

async fn prompt_loop(controller: &RequestController, mut show_raw: bool) -> Result<()> {
    println!("enter an IP address to analyze, :raw to toggle raw sources, :q to quit");
    let mut lines = BufReader::new(stdin()).lines();
    prompt()?;
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            ":q" | ":quit" => {
                break;
            }
            ":raw" => {
                show_raw = !show_raw;
            }
            _ => {
                controller.submit(&line).await;
            }
        }
        // every event re-renders from the current state snapshot
        render(&controller.current(), show_raw);
        prompt()?;
    }
    Ok(())
}

fn prompt() -> Result<()> {
    print!("ip> ");
    std::io::stdout().flush()?;
    Ok(())
}

fn render(state: &RequestState, show_raw: bool) {
    if let Some(msg) = view::project_error(state) {
        println!("error: {}", msg);
    }
    if let Some(s) = view::project_summary(state) {
        println!();
        println!("Summary");
        println!("  IP address:      {}", s.ip);
        println!("  Hostname:        {}", s.hostname);
        println!("  ISP:             {}", s.isp);
        println!("  Country:         {}", s.country);
        println!("  Abuse score:     {}", s.abuse_score);
        println!("  Recent reports:  {}", s.recent_reports);
        println!("  VPN/proxy:       {}", s.vpn_proxy);
        println!("  Fraud score:     {}", s.fraud_score);
    }
    if let Some(r) = view::project_risk(state) {
        println!();
        println!("AI Risk Assessment");
        println!("  Risk level: {}{}{}", ansi_for(r.color), r.level, ANSI_RESET);
        if let Some(c) = r.confidence {
            println!("  Confidence: {}", c);
        }
        if let Some(m) = r.model {
            println!("  Model:      {}", m);
        }
        if let Some(a) = r.analysis {
            println!();
            println!("  {}", a);
        }
        if let Some(recommendations) = r.recommendations {
            println!();
            println!("  Recommendations:");
            for rec in recommendations {
                println!("    - {}", rec);
            }
        }
    }
    if let Some(raw) = view::project_raw_sources(state) {
        println!();
        if show_raw {
            println!("Raw Threat Intelligence");
            println!("{}", raw.pretty());
        } else {
            println!("Raw threat intelligence available (:raw or --show-raw to display)");
        }
    }
}

const ANSI_RESET: &str = "\x1b[0m";

// hues come from the risk projection; this only maps them onto terminal
// colors
fn ansi_for(color: &str) -> &'static str {
    match color {
        "#16a34a" => "\x1b[32m",
        "#f97316" => "\x1b[33m",
        "#dc2626" => "\x1b[31m",
        _ => "\x1b[90m",
    }
}
