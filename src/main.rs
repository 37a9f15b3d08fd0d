use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use clap::Parser;

use screenlens::config;
use screenlens::layout::export;
use screenlens::layout::types::Layout;
use screenlens::pipeline::Analyzer;
use screenlens::query;

#[derive(Parser)]
#[command(name = "screenlens", version, about = "Screenshot UI structure analyzer")]
struct Cli {
    /// Screenshot to analyze (PNG or JPEG).
    image: PathBuf,

    /// Optional one-shot query; omit to enter the interactive prompt.
    query: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load .env file if present (ignore error if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Input errors surface here, before the analysis core runs
    if !cli.image.exists() {
        eprintln!("Error: image file '{}' not found", cli.image.display());
        std::process::exit(1);
    }

    let cfg = match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(error = %e, "no usable config — falling back to defaults");
            config::AppConfig::default()
        }
    };

    let analyzer = Analyzer::from_config(&cfg);

    println!("Analyzing screen...");
    let layout = analyzer.analyze_file(&cli.image).await;

    if layout.confidence_score == 0.0 {
        println!("confused - Unable to analyze the screen properly");
        if !layout.ambiguities.is_empty() {
            println!("Issues: {}", layout.ambiguities.join("; "));
        }
        return;
    }

    match export::to_json(&layout, cfg.output.pretty) {
        Ok(json) => {
            let out_path = analysis_path(&cli.image);
            match std::fs::write(&out_path, json) {
                Ok(()) => println!("Analysis saved to: {}", out_path.display()),
                Err(e) => tracing::error!(error = %e, "failed to write analysis JSON"),
            }
        }
        Err(e) => tracing::error!(error = %e, "failed to serialize analysis"),
    }

    println!("Overall confidence: {}", layout.confidence_score);
    println!("Components found: {}", layout.components().len());
    println!("Relationships mapped: {}", layout.relationships.len());
    if !layout.ambiguities.is_empty() {
        println!("Ambiguities: {}", layout.ambiguities.join("; "));
    }

    match cli.query {
        Some(q) => {
            println!("\nQuery: {q}");
            println!("Response: {}", query::answer(&layout, &q));
        }
        None => interactive_loop(&layout),
    }
}

fn analysis_path(image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "screen".to_string());
    image.with_file_name(format!("{stem}_analysis.json"))
}

fn interactive_loop(layout: &Layout) {
    println!("\nEntering interactive query mode. Type 'exit' to quit.");
    let stdin = std::io::stdin();

    loop {
        print!("\nQuery: ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let q = line.trim();
        if q.is_empty() {
            continue;
        }
        if q.eq_ignore_ascii_case("exit") || q.eq_ignore_ascii_case("quit") {
            break;
        }

        println!("Response: {}", query::answer(layout, q));
    }
}
