//! CLI entrypoint for llm-conclave
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, bail};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use conclave_application::{
    CouncilOrchestrator, CouncilRequest, Gateway, GenerateRequest, HealthMonitor, HealthTable,
};
use conclave_domain::{Query, Role};
use conclave_infrastructure::{ConfigLoader, HttpHealthProbe, build_responders, probe_targets};
use conclave_presentation::{Cli, ConsoleFormatter, OutputFormat, ProgressReporter, SimpleProgress};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level; RUST_LOG wins when set
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting llm-conclave");

    // Load configuration
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };

    if cli.show_config {
        ConfigLoader::print_config_sources();
        println!();
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let issues = config.validate();
    for issue in &issues {
        eprintln!("config {}", issue);
    }
    if issues.iter().any(|issue| issue.is_fatal()) {
        bail!("Configuration has errors, fix them or run with --no-config");
    }

    // === Dependency Injection ===
    // Registry and HTTP adapters
    let registry = Arc::new(config.registry());
    let responders = build_responders(&registry, config.retry.to_policy())?;

    // Health monitoring
    let health = Arc::new(HealthTable::new(registry.enabled().map(|r| r.name.clone())));
    let monitor = HealthMonitor::new(
        Arc::new(HttpHealthProbe::default()),
        Arc::clone(&health),
        probe_targets(&registry),
        config.health.to_settings(),
    );

    // Gateway with breakers and cache
    let gateway = Arc::new(Gateway::new(
        Arc::clone(&registry),
        responders,
        Arc::clone(&health),
        config.cache.to_cache(),
        config.gateway.to_settings(config.breaker.to_settings()),
    ));

    // One-shot health check mode, no background monitor needed
    if cli.check_health {
        info!("probing {} responders", registry.enabled().count());
        monitor.probe_all().await;
        let records = health.all().await;
        println!("{}", ConsoleFormatter::format_health(&records));
        return Ok(());
    }

    let question = match cli.question {
        Some(q) => q,
        None => bail!("Question is required. Try: llm-conclave \"your question\""),
    };
    let Some(query) = Query::try_new(question.as_str()) else {
        bail!("Question cannot be empty");
    };
    let role = match &cli.role {
        Some(name) => match Role::try_new(name.as_str()) {
            Some(role) => Some(role),
            None => bail!("Role cannot be empty"),
        },
        None => None,
    };

    // Seed health statuses, then keep probing in the background
    monitor.probe_all().await;
    let token = CancellationToken::new();
    let monitor_handle = tokio::spawn(monitor.run(token.clone()));

    // Council mode
    if cli.council {
        let mut council_config = config.council_config(&registry);
        if !cli.participant.is_empty() {
            council_config.participants = cli.participant.clone();
            // The chair follows the overridden roster unless named somewhere
            if cli.chairman.is_none()
                && config.council.chairman.is_none()
                && let Some(first) = council_config.participants.first()
            {
                council_config.chairman = first.clone();
            }
        }
        if let Some(chairman) = &cli.chairman {
            council_config.chairman = chairman.clone();
        }
        if cli.no_reviews {
            council_config.include_reviews = false;
        }

        if !cli.quiet {
            println!();
            println!("Question: {}", question);
            println!("Council: {}", council_config.participants.join(", "));
            println!("Chairman: {}", council_config.chairman);
            println!();
        }

        let mut request = CouncilRequest::new(query, council_config);
        if let Some(context) = &cli.context {
            request = request.with_context(context.as_str());
        }

        let orchestrator = CouncilOrchestrator::new(Arc::clone(&gateway));
        let result = if cli.quiet {
            orchestrator.run(request).await
        } else if cli.verbose > 0 {
            // Progress bars and log lines fight over stderr
            orchestrator.run_with_progress(request, &SimpleProgress).await
        } else {
            let progress = ProgressReporter::new();
            orchestrator.run_with_progress(request, &progress).await
        };
        token.cancel();
        let result = result?;

        let output = match cli.output {
            OutputFormat::Full => ConsoleFormatter::format_council(&result),
            OutputFormat::Answer => ConsoleFormatter::format_council_answer(&result),
            OutputFormat::Json => ConsoleFormatter::format_council_json(&result),
        };
        println!("{}", output);
        let _ = monitor_handle.await;
        return Ok(());
    }

    // Single routed request
    let mut request = GenerateRequest::new(question);
    if let Some(role) = role {
        request = request.with_role(role);
    }
    if let Some(system) = &cli.system {
        request = request.with_system_prompt(system.as_str());
    }
    if let Some(temperature) = cli.temperature {
        request = request.with_temperature(temperature);
    }
    if let Some(max_tokens) = cli.max_tokens {
        request = request.with_max_tokens(max_tokens);
    }
    if let Some(secs) = cli.timeout_secs {
        request = request.with_timeout(Duration::from_secs(secs));
    }

    let response = gateway.generate(request).await;
    token.cancel();

    let output = match cli.output {
        OutputFormat::Full => {
            ConsoleFormatter::format_response(&response, &gateway.fallback_events())
        }
        OutputFormat::Answer => ConsoleFormatter::format_answer(&response),
        OutputFormat::Json => {
            ConsoleFormatter::format_response_json(&response, &gateway.fallback_events())
        }
    };
    println!("{}", output);
    let _ = monitor_handle.await;

    Ok(())
}
