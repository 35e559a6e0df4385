use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr as _;
use std::sync::Arc;
use wayfare_client::{
    ApiClient, AuthService, HealthService, IdentityProvider, PlanService, PlanStreamClient,
    StreamCallbacks, UserService, VideoService,
};
use wayfare_config::Config;
use wayfare_store::FileCredentialStore;
use wayfare_types::{Budget, CreatePlanRequest, CreateVideoRequest, GeneratePlanRequest};

#[derive(Parser, Debug)]
#[command(name = "wayfare", about = "wayfare — travel-planning API client")]
struct Cli {
    /// Path to the YAML configuration file (default: ~/.wayfare/config.yaml).
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    /// Credential file path (default: ~/.wayfare/credentials.json).
    #[arg(long, value_name = "PATH", global = true)]
    credentials: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show authentication status.
    Status,
    /// Sign in with an OAuth authorization code or a native-SDK identity token.
    Login {
        /// Provider name (google / apple).
        provider: String,
        /// OAuth authorization code from the redirect.
        #[arg(long, conflicts_with = "id_token")]
        code: Option<String>,
        /// Identity token issued by the provider's native SDK.
        #[arg(long)]
        id_token: Option<String>,
    },
    /// Remove stored credentials.
    Logout,
    /// Show the authenticated user's profile.
    Profile,
    /// Travel plan operations.
    Plans {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Generate a plan through the streaming endpoint.
    Generate {
        /// Destination, e.g. "Jeju".
        location: String,
        /// Trip start date (YYYY-MM-DD).
        #[arg(long)]
        start: String,
        /// Trip end date (YYYY-MM-DD).
        #[arg(long)]
        end: String,
        /// Spending tier: low / medium / high (default: medium).
        #[arg(long)]
        budget: Option<String>,
    },
    /// Video compilation job operations.
    Videos {
        #[command(subcommand)]
        command: VideoCommands,
    },
    /// Probe the API gateway health endpoint.
    Health,
}

#[derive(Subcommand, Debug)]
enum PlanCommands {
    /// List your plans.
    List,
    /// Show one plan with its itinerary.
    Show { id: u64 },
    /// Create a plan.
    Create {
        title: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    /// Delete a plan.
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
enum VideoCommands {
    /// List your video jobs.
    List,
    /// Show one video job.
    Show { id: u64 },
    /// Submit a video-compilation job from photo URLs.
    Create {
        /// Photo URLs, in display order.
        #[arg(required = true)]
        photos: Vec<String>,
        /// Compilation template name.
        #[arg(long)]
        template: Option<String>,
        /// Idempotency key to retry a prior submission safely.
        #[arg(long)]
        key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let store = Arc::new(FileCredentialStore::new(
        cli.credentials.unwrap_or_else(default_credentials_path),
    ));
    let api = Arc::new(
        ApiClient::new(&config, store).map_err(|e| anyhow::anyhow!("client setup failed: {e}"))?,
    );

    match cli.command {
        Commands::Status => cmd_status(api).await,
        Commands::Login {
            provider,
            code,
            id_token,
        } => cmd_login(api, &provider, code, id_token).await,
        Commands::Logout => cmd_logout(api).await,
        Commands::Profile => cmd_profile(api).await,
        Commands::Plans { command } => cmd_plans(api, command).await,
        Commands::Generate {
            location,
            start,
            end,
            budget,
        } => cmd_generate(&config, location, start, end, budget).await,
        Commands::Videos { command } => cmd_videos(api, command).await,
        Commands::Health => cmd_health(api).await,
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let result = match path {
        Some(path) => Config::from_file(path),
        None => {
            let default = default_config_path();
            if default.exists() {
                Config::from_file(&default)
            } else {
                Config::from_env()
            }
        }
    };
    result.map_err(|e| anyhow::anyhow!("config error: {e}"))
}

async fn cmd_status(api: Arc<ApiClient>) -> Result<()> {
    let auth = AuthService::new(api);
    match auth.load_session().await? {
        Some(session) => println!("authenticated as user {}", session.user_id),
        None => println!("not authenticated"),
    }
    Ok(())
}

async fn cmd_login(
    api: Arc<ApiClient>,
    provider: &str,
    code: Option<String>,
    id_token: Option<String>,
) -> Result<()> {
    let auth = AuthService::new(api);
    let token = match (code, id_token) {
        (Some(code), _) => auth.oauth_callback(provider, &code).await?,
        (None, Some(id_token)) => {
            let provider = match provider {
                "google" => IdentityProvider::Google,
                "apple" => IdentityProvider::Apple,
                other => anyhow::bail!("unknown provider '{other}' (expected google or apple)"),
            };
            auth.verify_id_token(provider, &id_token).await?
        }
        (None, None) => anyhow::bail!("pass either --code or --id-token"),
    };
    auth.persist_session(&token, None).await?;
    eprintln!("signed in as user {}", token.user_id);
    Ok(())
}

async fn cmd_logout(api: Arc<ApiClient>) -> Result<()> {
    AuthService::new(api).logout().await?;
    eprintln!("logged out");
    Ok(())
}

async fn cmd_profile(api: Arc<ApiClient>) -> Result<()> {
    let user = UserService::new(api).get_profile().await?;
    println!("{}", serde_json::to_string_pretty(&user)?);
    Ok(())
}

async fn cmd_plans(api: Arc<ApiClient>, command: PlanCommands) -> Result<()> {
    let plans = PlanService::new(api);
    match command {
        PlanCommands::List => {
            for plan in plans.list().await? {
                println!(
                    "{}\t{}\t{} → {}",
                    plan.id, plan.title, plan.start_date, plan.end_date
                );
            }
        }
        PlanCommands::Show { id } => {
            let plan = plans.get(id).await?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        PlanCommands::Create { title, start, end } => {
            let plan = plans
                .create(&CreatePlanRequest {
                    title,
                    start_date: start,
                    end_date: end,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        PlanCommands::Delete { id } => {
            plans.delete(id).await?;
            eprintln!("plan {id} deleted");
        }
    }
    Ok(())
}

async fn cmd_generate(
    config: &Config,
    location: String,
    start: String,
    end: String,
    budget: Option<String>,
) -> Result<()> {
    let budget = budget
        .map(|b| Budget::from_str(&b))
        .transpose()
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let client =
        PlanStreamClient::new(config).map_err(|e| anyhow::anyhow!("client setup failed: {e}"))?;

    // Ctrl-C drops the connection instead of leaving the generation running.
    let cancel = tokio_util::sync::CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_on_signal.cancel();
        }
    });

    // Progress goes to stderr so stdout stays pipeable JSON.
    let callbacks = StreamCallbacks::new()
        .on_status(|message, progress| eprintln!("[{progress:>3.0}%] {message}"))
        .on_progress(|message, progress| eprintln!("[{progress:>3.0}%] {message}"))
        .on_chunk(|content| eprint!("{content}"))
        .on_error(|message| eprintln!("error: {message}"));

    let plan = client
        .generate_with_cancel(
            &GeneratePlanRequest {
                location,
                start_date: start,
                end_date: end,
                budget,
            },
            &callbacks,
            &cancel,
        )
        .await?;
    eprintln!();
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

async fn cmd_videos(api: Arc<ApiClient>, command: VideoCommands) -> Result<()> {
    let videos = VideoService::new(api);
    match command {
        VideoCommands::List => {
            for job in videos.list().await? {
                println!("{}\t{:?}\t{} photos", job.id, job.status, job.photo_urls.len());
            }
        }
        VideoCommands::Show { id } => {
            let job = videos.get(id).await?;
            println!("{}", serde_json::to_string_pretty(&job)?);
        }
        VideoCommands::Create {
            photos,
            template,
            key,
        } => {
            let job = videos
                .create(
                    &CreateVideoRequest {
                        photo_urls: photos,
                        template,
                    },
                    key,
                )
                .await?;
            println!("{}", serde_json::to_string_pretty(&job)?);
        }
    }
    Ok(())
}

async fn cmd_health(api: Arc<ApiClient>) -> Result<()> {
    let status = HealthService::new(api).health().await?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

fn default_config_path() -> PathBuf {
    wayfare_dir().join("config.yaml")
}

fn default_credentials_path() -> PathBuf {
    wayfare_dir().join("credentials.json")
}

fn wayfare_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".wayfare")
}
