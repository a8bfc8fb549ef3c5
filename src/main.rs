use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use vext_lib::client::{preview::inject_preview_styles, DispatcherClient, DEFAULT_SERVER_URL};
use vext_lib::config::{
    load_config, remove_token_in, resolve_api_key, store_token_in, Candidate, PartialConfig,
    PartialDispatchConfig, PartialServerConfig, SecretsConfig, Vendor,
};
use vext_lib::dispatch::{DispatchResponse, Dispatcher};
use vext_lib::file_storage::projects::{self, Project};
use vext_lib::models::{AnalysisResult, PriorContext};
use vext_lib::providers::HttpGenerationClient;
use vext_lib::server::{self, ServerAppState};
use vext_lib::shutdown::{register_signal_handlers, ShutdownState};

/// VEXT - landing pages and growth kits from a one-line business idea
#[derive(Parser, Debug)]
#[command(name = "vext")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Extra config file layered over ~/.vext/config.toml
    #[arg(long, global = true, env = "VEXT_CONFIG")]
    config: Option<PathBuf>,

    /// Dispatcher URL used by the client commands
    #[arg(long, global = true, env = "VEXT_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP dispatcher
    Serve {
        #[arg(long)]
        port: Option<u16>,

        #[arg(long)]
        bind: Option<String>,

        /// Allowed CORS origin (repeatable); any origin when omitted
        #[arg(long = "cors-origin")]
        cors_origins: Vec<String>,

        /// gemini, openai, anthropic or groq
        #[arg(long, env = "VEXT_VENDOR")]
        vendor: Option<Vendor>,

        /// Vendor base URL override
        #[arg(long)]
        base_url: Option<String>,

        /// Candidate as `api_version/model` (repeatable, tried in order)
        #[arg(long = "candidate", value_parser = parse_candidate)]
        candidates: Vec<Candidate>,

        /// Per-attempt timeout in seconds
        #[arg(long)]
        attempt_timeout: Option<u64>,

        /// Overall deadline in seconds
        #[arg(long)]
        deadline: Option<u64>,
    },

    /// Analyze a business idea
    Analyze {
        idea: String,

        /// Save the result as a new project
        #[arg(long)]
        save: bool,
    },

    /// Refine a saved project's landing page
    Refine {
        project_id: String,
        instruction: String,

        /// Store the refined result back into the project
        #[arg(long)]
        save: bool,
    },

    /// Ask a short question
    Chat { message: String },

    /// Manage saved projects
    Projects {
        #[command(subcommand)]
        action: ProjectsAction,
    },

    /// Manage vendor API keys in ~/.vext/secrets.toml
    Secrets {
        #[command(subcommand)]
        action: SecretsAction,
    },
}

#[derive(Subcommand, Debug)]
enum SecretsAction {
    /// Store a key; read from stdin when --key is omitted
    Set {
        vendor: Vendor,
        #[arg(long)]
        key: Option<String>,
    },
    Delete {
        vendor: Vendor,
    },
    /// Show which vendors have a key (values are never printed)
    List,
}

#[derive(Subcommand, Debug)]
enum ProjectsAction {
    List,
    Show {
        id: String,
    },
    Delete {
        id: String,
    },
    /// Write the landing page, with preview styles, to a file
    Export {
        id: String,
        #[arg(long)]
        out: PathBuf,
    },
}

fn parse_candidate(value: &str) -> Result<Candidate, String> {
    match value.split_once('/') {
        Some((version, model)) if !version.is_empty() && !model.is_empty() => {
            Ok(Candidate::new(version, model))
        }
        _ => Err(format!(
            "expected `api_version/model`, e.g. v1beta/gemini-2.0-flash, got '{}'",
            value
        )),
    }
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run(cli)) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Serve {
            port,
            bind,
            cors_origins,
            vendor,
            base_url,
            candidates,
            attempt_timeout,
            deadline,
        } => {
            let overrides = PartialConfig {
                dispatch: Some(PartialDispatchConfig {
                    vendor,
                    base_url,
                    candidates: (!candidates.is_empty()).then_some(candidates),
                    attempt_timeout_secs: attempt_timeout,
                    deadline_secs: deadline,
                    ..Default::default()
                }),
                server: Some(PartialServerConfig {
                    bind,
                    port,
                    cors_origins: (!cors_origins.is_empty()).then_some(cors_origins),
                }),
            };
            serve(cli.config, overrides).await
        }
        Command::Analyze { idea, save } => {
            let client = DispatcherClient::new(&cli.server)?;
            let response = client.analyze(&idea).await?;
            print_response(&response);

            if save {
                match &response {
                    DispatchResponse::Structured { result, .. } => {
                        let saved = projects::save_project(Project::from_result(&idea, result))
                            .map_err(|e| anyhow!(e))?;
                        println!("\nSaved as project {}", saved.id);
                    }
                    _ => println!("\nNothing saved: no analysis was produced"),
                }
            }
            Ok(())
        }
        Command::Refine {
            project_id,
            instruction,
            save,
        } => refine(&cli.server, &project_id, &instruction, save).await,
        Command::Chat { message } => {
            let client = DispatcherClient::new(&cli.server)?;
            print_response(&client.chat(&message).await?);
            Ok(())
        }
        Command::Projects { action } => manage_projects(action),
        Command::Secrets { action } => manage_secrets(action),
    }
}

async fn serve(config_path: Option<PathBuf>, overrides: PartialConfig) -> Result<()> {
    let config = load_config(config_path.as_deref(), Some(overrides))?;
    let secrets = SecretsConfig::load().unwrap_or_else(|e| {
        log::warn!("Ignoring secrets file: {}", e);
        SecretsConfig::default()
    });

    let client = HttpGenerationClient::from_config(&config.dispatch, &secrets)?;
    let dispatcher = Dispatcher::new(Arc::new(client), config.dispatch.clone());

    let shutdown_state = ShutdownState::new();
    if let Err(e) = register_signal_handlers(shutdown_state.clone()) {
        log::warn!("Failed to register signal handlers: {}", e);
    }

    let state = ServerAppState::new(dispatcher, secrets, shutdown_state);
    server::run_server(&config.server, state)
        .await
        .map_err(|e| anyhow!(e))
}

async fn refine(server_url: &str, project_id: &str, instruction: &str, save: bool) -> Result<()> {
    let mut project = projects::get_project(project_id)
        .ok_or_else(|| anyhow!("Project not found: {}", project_id))?;

    if project.landing_page.html_document.trim().is_empty() {
        return Err(anyhow!(
            "Project {} has no landing page to refine",
            project_id
        ));
    }

    let prior_context = PriorContext {
        grade: Some(project.grade_percent),
        title: Some(project.landing_page.headline.clone()),
        tagline: Some(project.landing_page.subheadline.clone()),
    };

    let client = DispatcherClient::new(server_url)?;
    let response = client
        .refine(
            instruction,
            &project.landing_page.html_document,
            Some(prior_context),
        )
        .await?;
    print_response(&response);

    if save {
        match &response {
            DispatchResponse::Structured { result, .. } => {
                project.apply_refinement(result);
                projects::save_project(project).map_err(|e| anyhow!(e))?;
                println!("\nProject {} updated", project_id);
            }
            _ => println!("\nProject left unchanged: no refinement was produced"),
        }
    }
    Ok(())
}

fn manage_projects(action: ProjectsAction) -> Result<()> {
    match action {
        ProjectsAction::List => {
            let all = projects::get_all_projects();
            if all.is_empty() {
                println!("No saved projects");
            }
            for project in all {
                let updated = project
                    .updated_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!(
                    "{}  {:>2} {:>3}%  {}  {}",
                    project.id,
                    project.grade,
                    project.grade_percent,
                    updated,
                    vext_lib::utils::truncate_chars(&project.idea_text, 50)
                );
            }
        }
        ProjectsAction::Show { id } => {
            let project =
                projects::get_project(&id).ok_or_else(|| anyhow!("Project not found: {}", id))?;
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        ProjectsAction::Delete { id } => {
            projects::delete_project(&id).map_err(|e| anyhow!(e))?;
            println!("Deleted {}", id);
        }
        ProjectsAction::Export { id, out } => {
            let project =
                projects::get_project(&id).ok_or_else(|| anyhow!("Project not found: {}", id))?;
            let html = inject_preview_styles(&project.landing_page.html_document);
            std::fs::write(&out, html)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("Wrote {}", out.display());
        }
    }
    Ok(())
}

fn manage_secrets(action: SecretsAction) -> Result<()> {
    let path = SecretsConfig::get_secrets_path()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?;

    match action {
        SecretsAction::Set { vendor, key } => {
            let key = match key {
                Some(key) => key,
                None => {
                    eprintln!("Paste the {} API key and press enter:", vendor);
                    let mut line = String::new();
                    std::io::stdin()
                        .read_line(&mut line)
                        .context("Failed to read API key from stdin")?;
                    line
                }
            };
            store_token_in(&path, vendor, &key)?;
            println!("Stored {} key in {}", vendor, path.display());
        }
        SecretsAction::Delete { vendor } => {
            if remove_token_in(&path, vendor)? {
                println!("Deleted {} key", vendor);
            } else {
                println!("No {} key stored", vendor);
            }
        }
        SecretsAction::List => {
            let secrets = SecretsConfig::load_from(&path)?;
            for vendor in Vendor::all() {
                let from_env = resolve_api_key(*vendor, &SecretsConfig::default()).is_some();
                let source = if from_env {
                    vendor.preset().key_env
                } else if resolve_api_key(*vendor, &secrets).is_some() {
                    "secrets file"
                } else {
                    "not set"
                };
                println!("{:<10} {}", vendor.as_str(), source);
            }
        }
    }
    Ok(())
}

fn print_analysis(result: &AnalysisResult) {
    println!("Grade: {} ({}%)", result.grade_letter, result.grade);
    if !result.target_audience.is_empty() {
        println!("Audience: {}", result.target_audience);
    }
    println!("Headline: {}", result.landing_page.headline);
    if !result.landing_page.subheadline.is_empty() {
        println!("Subheadline: {}", result.landing_page.subheadline);
    }
    for trigger in &result.psychology_triggers {
        println!("  - {}: {}", trigger.trigger, trigger.explanation);
    }
    if !result.strategy_summary.is_empty() {
        println!("\n{}", result.strategy_summary);
    }
    for hook in &result.viral_kit.hooks {
        println!("  hook: {}", hook);
    }
}

fn print_response(response: &DispatchResponse) {
    match response {
        DispatchResponse::Structured {
            result,
            model,
            attempts,
        } => {
            print_analysis(result);
            println!("\n[{} after {} attempt(s)]", model, attempts.len());
        }
        DispatchResponse::Conversational { reply, model, .. } => {
            println!("{}", reply);
            println!("\n[{}]", model);
        }
        DispatchResponse::Degraded {
            message, attempts, ..
        } => {
            println!("{}", message);
            println!("\n[degraded after {} attempt(s)]", attempts.len());
        }
    }
}
