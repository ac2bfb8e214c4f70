use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use echoes::conversation::{InteractionMode, SessionEvent, SessionSummary, StatsWrite, WordCasePolicy};
use echoes::integration::{build_session, load_dashboard, AppConfig, Session};
use echoes::llm::{
    GeminiClient, NarrativeScaffoldRequest, RubricScoreRequest, SelfReflectionPromptsRequest,
};
use echoes::messages::Speaker;
use echoes::profile::{AcademicLevel, EnglishProficiency, UserId, UserProfile};
use echoes::speech::{CaptureState, ListenerConfig};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long to wait for the final stats write before exiting
const STATS_FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "echoes", version, about = "Guided conversational English practice")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a practice conversation
    Chat(ChatArgs),

    /// Show progress statistics for a learner
    Stats {
        #[arg(long)]
        user: String,
        #[arg(long)]
        stats_file: Option<PathBuf>,
        /// Print the dashboard as JSON
        #[arg(long)]
        json: bool,
    },

    /// Suggest a sentence starter that continues what the learner said
    Scaffold { previous: String },

    /// Score a response against a speaking-of-self rubric
    Score {
        #[arg(long)]
        criteria: String,
        response: String,
    },

    /// Generate self-reflection prompts for a learner
    Prompts(PromptsArgs),
}

#[derive(Args)]
struct ChatArgs {
    #[arg(long)]
    mode: Option<InteractionMode>,
    /// Learner id; statistics are only saved when set
    #[arg(long)]
    user: Option<String>,
    #[arg(long)]
    stats_file: Option<PathBuf>,
    /// Speak replies through the system TTS program
    #[arg(long)]
    speak: bool,
    /// Program that prints recognised speech, one segment per line
    #[arg(long)]
    listen: Option<String>,
    /// Count "Cats" and "cats" as the same word
    #[arg(long)]
    case_insensitive: bool,
}

#[derive(Args)]
struct PromptsArgs {
    #[arg(long)]
    topic: String,
    #[arg(long, default_value_t = 3)]
    count: u32,
    #[arg(long, default_value = "Learner")]
    name: String,
    #[arg(long, default_value_t = 18)]
    age: u32,
    #[arg(long, default_value = "intermediate")]
    proficiency: EnglishProficiency,
    #[arg(long, default_value = "undergraduate")]
    level: AcademicLevel,
    #[arg(long, default_value = "")]
    goals: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; stderr keeps the conversation on stdout readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "echoes=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded environment from {}", path.display());
    }

    let cli = Cli::parse();
    let mut config = AppConfig::from_env().context("Invalid environment configuration")?;

    match cli.command {
        Command::Chat(args) => {
            run_chat(apply_chat_args(config, args)).await
        }
        Command::Stats {
            user,
            stats_file,
            json,
        } => {
            if let Some(path) = stats_file {
                config.stats_file = path;
            }
            show_stats(&config, &UserId::new(user), json).await
        }
        Command::Scaffold { previous } => {
            let client = GeminiClient::new(config.gemini)?;
            let scaffold = client
                .generate_narrative_scaffold(&NarrativeScaffoldRequest {
                    previous_input: previous,
                })
                .await?;
            println!("{}", scaffold.narrative_scaffold);
            Ok(())
        }
        Command::Score { criteria, response } => {
            let client = GeminiClient::new(config.gemini)?;
            let score = client
                .evaluate_rubric_score(&RubricScoreRequest {
                    response,
                    rubric_criteria: criteria,
                })
                .await?;
            println!("Score: {}\n{}", score.score, score.justification);
            Ok(())
        }
        Command::Prompts(args) => {
            let client = GeminiClient::new(config.gemini)?;
            let request = SelfReflectionPromptsRequest {
                user_profile: UserProfile {
                    name: args.name,
                    age: args.age,
                    english_proficiency: args.proficiency,
                    academic_level: args.level,
                    goals: args.goals,
                },
                topic: args.topic,
                number_of_prompts: args.count,
            };
            let prompts = client.generate_self_reflection_prompts(&request).await?;
            for (i, prompt) in prompts.prompts.iter().enumerate() {
                println!("{}. {}", i + 1, prompt);
            }
            Ok(())
        }
    }
}

fn apply_chat_args(mut config: AppConfig, args: ChatArgs) -> AppConfig {
    if let Some(mode) = args.mode {
        config.session.mode = mode;
    }
    if let Some(user) = args.user {
        config.session.user_id = Some(UserId::new(user));
    }
    if let Some(path) = args.stats_file {
        config = config.with_stats_file(path);
    }
    if args.speak {
        config.enable_speech_output = true;
    }
    if let Some(program) = args.listen {
        config = config.with_listener(ListenerConfig::new(program));
    }
    if args.case_insensitive {
        config.session.word_case = WordCasePolicy::Insensitive;
    }
    config
}

/// A line typed at the chat prompt
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Say(String),
    Send,
    Mic,
    Scaffold,
    CloseReflection,
    Help,
    Quit,
    Unknown(String),
    Nothing,
}

impl ReplCommand {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            "" => ReplCommand::Nothing,
            "/quit" | "/exit" => ReplCommand::Quit,
            "/reflect-close" => ReplCommand::CloseReflection,
            "/send" => ReplCommand::Send,
            "/mic" => ReplCommand::Mic,
            "/scaffold" => ReplCommand::Scaffold,
            "/help" => ReplCommand::Help,
            cmd if cmd.starts_with('/') => ReplCommand::Unknown(cmd.to_string()),
            text => ReplCommand::Say(text.to_string()),
        }
    }
}

const HELP: &str = "Type a message and press enter. Commands: /mic (start/stop listening), \
/send (send what was heard), /scaffold (get a sentence starter), /reflect-close, /quit";

async fn run_chat(config: AppConfig) -> Result<()> {
    let Session {
        orchestrator,
        mut handle,
        client,
    } = build_session(&config)?;
    let loop_task = orchestrator.start()?;

    println!("{}", config.session.mode.details().name);
    println!("{}\n", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = handle.recv_event() => match event {
                Some(event) => render(&event),
                None => break,
            },
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match ReplCommand::parse(&line) {
                    ReplCommand::Say(text) => handle.submit_text(text).await?,
                    ReplCommand::Send => handle.submit_input().await?,
                    ReplCommand::Mic => handle.toggle_capture().await?,
                    ReplCommand::CloseReflection => handle.dismiss_reflection().await?,
                    ReplCommand::Scaffold => {
                        let previous = handle
                            .state()
                            .snapshot()
                            .transcript
                            .user_messages()
                            .last()
                            .map(|m| m.text.clone())
                            .unwrap_or_default();
                        match client
                            .generate_narrative_scaffold(&NarrativeScaffoldRequest { previous_input: previous })
                            .await
                        {
                            Ok(scaffold) => {
                                println!("  try: {}", scaffold.narrative_scaffold);
                                handle.set_input(scaffold.narrative_scaffold).await?;
                            }
                            Err(e) => {
                                warn!("Scaffold failed: {}", e);
                                println!("! {}", e.user_message());
                            }
                        }
                    }
                    ReplCommand::Help => println!("{}", HELP),
                    ReplCommand::Quit => break,
                    ReplCommand::Unknown(cmd) => println!("Unknown command {}. {}", cmd, HELP),
                    ReplCommand::Nothing => {}
                }
            }
        }
    }

    let summary = handle.end_session().await?;
    while let Some(event) = handle.try_recv_event() {
        render(&event);
    }
    print_summary(&summary);

    // The loop owns the last error sender besides the store task
    let _ = loop_task.await;
    if summary.stats_write.was_dispatched() {
        match tokio::time::timeout(STATS_FLUSH_TIMEOUT, handle.recv_error()).await {
            Ok(Some(failure)) => {
                if failure.error.is_recoverable() {
                    warn!("Stats write failed, try again next session: {}", failure.error);
                } else {
                    error!("Stats write failed: {}", failure.error);
                }
                println!("! {}", failure.error.user_message());
            }
            Ok(None) => println!("Progress saved to {}", config.stats_file.display()),
            Err(_) => warn!("Gave up waiting for the stats write"),
        }
    }

    Ok(())
}

fn render(event: &SessionEvent) {
    match event {
        SessionEvent::MessageAppended(message) if message.speaker == Speaker::Ai => {
            let mood = message.mood.unwrap_or_default();
            println!("ai ({})> {}", mood, message.text);
        }
        SessionEvent::ComposingChanged(true) => println!("  AI is thinking..."),
        SessionEvent::SubmissionRejected(_) => println!("  Please wait for the reply."),
        SessionEvent::CaptureChanged(CaptureState::Capturing) => {
            println!("  (listening, /mic to stop)")
        }
        SessionEvent::CaptureChanged(CaptureState::Idle) => println!("  (stopped listening)"),
        SessionEvent::InputChanged(text) if !text.is_empty() => println!("  heard: {}", text),
        SessionEvent::ReflectionShown(text) => {
            println!("\n  Reflect: {}\n  (/reflect-close to dismiss)\n", text)
        }
        SessionEvent::Notice(text) => println!("! {}", text),
        _ => {}
    }
}

fn print_summary(summary: &SessionSummary) {
    println!(
        "\nSession over: {} turns, {} minutes, {} unique words.",
        summary.user_turns, summary.elapsed_minutes, summary.unique_words
    );
    if let StatsWrite::Skipped(reason) = summary.stats_write {
        info!("Stats not saved: {:?}", reason);
    }
}

async fn show_stats(config: &AppConfig, user: &UserId, json: bool) -> Result<()> {
    let Some(summary) = load_dashboard(config, user).await? else {
        println!("No sessions recorded for {} yet.", user);
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Progress for {}", user);
    println!("  Sessions:          {}", summary.total_sessions);
    println!("  Avg. minutes:      {:.1}", summary.average_session_minutes);
    if let Some(words) = summary.latest_unique_words {
        println!("  Latest vocabulary: {} unique words", words);
    }
    println!("  Confidence:        {}%", summary.confidence);
    for sample in &summary.lexical_richness {
        println!("    {}  {}", sample.date, sample.unique_words);
    }
    Ok(())
}
