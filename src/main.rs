//! WCC bot entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI args
//!   3. Load config, apply CLI overrides
//!   4. Resolve effective log level (CLI `-v` flags > env > config)
//!   5. Init logger once
//!   6. Validate the API credential for the selected provider
//!   7. Load the knowledge file (optional)
//!   8. Build the provider and the pipeline blueprint
//!   9. Run the selected mode: compare demo, security demo, or channels

use tokio_util::sync::CancellationToken;
use tracing::info;

use wcc_bot::bootstrap::logger;
use wcc_bot::config::{self, Config};
use wcc_bot::error::AppError;
use wcc_bot::knowledge::KnowledgeBase;
use wcc_bot::llm::providers;
use wcc_bot::pipeline::PipelineBuilder;
use wcc_bot::prompt::{PatternKind, SystemInstruction, system::DEFAULT_PERSONA};
use wcc_bot::{comms, demo};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present; the file is optional.
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let mut config = config::load(args.config_path.as_deref())?;

    if let Some(key) = &args.pattern {
        config.pipeline.pattern = key.parse::<PatternKind>()?;
    }
    if args.insecure {
        config.pipeline.secure = false;
    }
    if args.web {
        config.comms.axum_channel.enabled = true;
    }

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    logger::init(effective_log_level, args.log_level.is_some())?;

    info!(
        bot_name = %config.bot_name,
        provider = %config.llm.provider,
        pattern = %config.pipeline.pattern,
        secure = config.pipeline.secure,
        effective_log_level = %effective_log_level,
        "config loaded"
    );

    if providers::requires_api_key(&config.llm.provider) && config.llm_api_key.is_none() {
        return Err(AppError::Config(format!(
            "{} is not set; it is required for the {} provider (add it to .env or the environment)",
            config.llm.api_key_env, config.llm.provider
        )));
    }

    let knowledge = config.knowledge_file.as_deref().map(KnowledgeBase::load).transpose()?;
    let system = SystemInstruction::build(DEFAULT_PERSONA, knowledge.as_ref());

    let provider = providers::build(&config.llm, config.llm_api_key.clone())
        .map_err(|e| AppError::Config(e.to_string()))?;

    let blueprint = PipelineBuilder::from_config(&config.pipeline, config.generation, provider)
        .system_instruction(system);

    info!(provider = blueprint.provider().name(), faqs = knowledge.as_ref().map_or(0, |k| k.len()), "pipeline ready");

    if args.compare {
        let results = demo::compare(&blueprint, demo::COMPARE_QUERY).await;
        print!("{}", demo::render_compare(demo::COMPARE_QUERY, &results));
        return Ok(());
    }

    if args.security_demo {
        let results = demo::security_demo(&blueprint).await;
        print!("{}", demo::render_security(&results));
        return Ok(());
    }

    print_startup_summary(&config, &blueprint);

    // Shared shutdown token. Ctrl-C cancels it, all channels watch it.
    let shutdown = CancellationToken::new();

    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, shutting down");
            ctrlc_token.cancel();
        }
    });

    comms::start(&config, blueprint, shutdown.clone()).join().await?;
    shutdown.cancel();

    {
        use std::io::Write as _;
        println!("\nBye :) ...");
        let _ = std::io::stdout().flush();
    }

    Ok(())
}

fn print_startup_summary(config: &Config, blueprint: &PipelineBuilder) {
    let fit = |text: String| -> String {
        const WIDTH: usize = 58;
        let char_count = text.chars().count();
        if char_count >= WIDTH {
            let mut out = text.chars().take(WIDTH - 1).collect::<String>();
            out.push('…');
            out
        } else {
            format!("{text:<WIDTH$}")
        }
    };

    let model = match config.llm.provider.as_str() {
        "gemini" => config.llm.gemini.model.as_str(),
        "openai" | "openai-compatible" => config.llm.openai.model.as_str(),
        _ => "-",
    };
    let generation = blueprint.generation_config();

    let mut comms_lines = Vec::new();
    comms_lines.push(format!("⌨️  pty: {}", if config.comms.pty.enabled { "enabled" } else { "disabled" }));
    if config.comms.axum_channel.enabled {
        comms_lines.push(format!("🧩 axum: http://{}", config.comms.axum_channel.bind));
    } else {
        comms_lines.push("🧩 axum: disabled".to_string());
    }

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ 🤖 {}║", fit(config.bot_name.clone()));
    println!("╟──────────────────────────────────────────────────────────────╢");
    println!("║ 🧠 LLM                                                       ║");
    println!("║   {}║", fit(format!("provider={} model={model}", blueprint.provider().name())));
    println!(
        "║   {}║",
        fit(format!(
            "temp={} max_tokens={} top_p={}",
            generation.temperature(),
            generation.max_output_tokens(),
            generation.top_p()
        ))
    );
    println!("╟──────────────────────────────────────────────────────────────╢");
    println!("║ 🧩 Pipeline                                                  ║");
    println!(
        "║   {}║",
        fit(format!(
            "pattern={} secure={} search={}",
            blueprint.pattern_kind().key(),
            blueprint.is_secure(),
            config.pipeline.search
        ))
    );
    println!("╟──────────────────────────────────────────────────────────────╢");
    println!("║ 📡 Comms                                                     ║");
    for line in comms_lines {
        println!("║   {}║", fit(line));
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
}

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
    pattern: Option<String>,
    insecure: bool,
    compare: bool,
    security_demo: bool,
    web: bool,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;
    let mut pattern = None;
    let mut insecure = false;
    let mut compare = false;
    let mut security_demo = false;
    let mut web = false;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: wcc-bot [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("  -p, --pattern <KEY>        Prompt pattern: zero_shot, few_shot, chain_of_thought,");
                println!("                             role_based, structured_output, guarded");
                println!("      --insecure             Disable input/output screening");
                println!("      --web                  Enable the web widget channel");
                println!("      --compare              Compare prompt patterns on one query and exit");
                println!("      --security-demo        Run the security test cases and exit");
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                std::process::exit(0);
            }
            "-f" | "--config" => match iter.next() {
                Some(path) => config_path = Some(path),
                None => {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            },
            "-p" | "--pattern" => match iter.next() {
                Some(key) => pattern = Some(key),
                None => {
                    eprintln!("error: -p/--pattern requires a pattern key");
                    std::process::exit(1);
                }
            },
            "--insecure" => insecure = true,
            "--compare" => compare = true,
            "--security-demo" => security_demo = true,
            "--web" => web = true,
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            other => eprintln!("warning: ignoring unknown argument '{other}'"),
        }
    }

    CliArgs {
        log_level: logger::level_for_verbosity(verbosity),
        config_path,
        pattern,
        insecure,
        compare,
        security_demo,
        web,
    }
}
