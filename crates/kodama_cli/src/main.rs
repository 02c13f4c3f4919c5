use anyhow::Context;
use clap::Parser;
use kodama_core::{Gender, KodamaConfig, Language, Message, Sender};
use kodama_reasoning::llm::LlmClient;
use kodama_reasoning::providers::{MockProvider, OpenAiClient};
use kodama_reasoning::{DialogueSession, ReplyOutcome, VideoCall};
use kodama_voice::providers::{OpenAiSpeech, SilentSpeech};
use kodama_voice::{MediaSyncController, TextToSpeech};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod terminal_sink;

use terminal_sink::TerminalSink;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config file
    #[arg(short, long, default_value = "kodama.toml", env = "KODAMA_CONFIG")]
    config: PathBuf,

    /// Text provider override (openai | mock)
    #[arg(long)]
    provider: Option<String>,

    /// Speech provider override (openai | silent)
    #[arg(long)]
    tts: Option<String>,

    /// Persona gender override (male | female)
    #[arg(long)]
    gender: Option<Gender>,

    /// Persona language override (ja | en)
    #[arg(long)]
    language: Option<Language>,

    /// Show a still image instead of the looping clip
    #[arg(long)]
    no_video: bool,

    /// Say one thing, print the reply, and hang up
    #[arg(long)]
    once: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Also write daily-rolling log files to this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn init_tracing(args: &Args) -> Option<WorkerGuard> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match &args.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "kodama.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let builder = tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(writer)
                .with_ansi(false);
            if args.log_json {
                builder.json().init();
            } else {
                builder.init();
            }
            Some(guard)
        }
        None => {
            let builder = tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::io::stderr);
            if args.log_json {
                builder.json().init();
            } else {
                builder.init();
            }
            None
        }
    }
}

fn apply_overrides(config: &mut KodamaConfig, args: &Args) {
    if let Some(p) = &args.provider {
        config.llm.provider = p.clone();
    }
    if let Some(t) = &args.tts {
        config.tts.provider = t.clone();
    }
    if let Some(g) = args.gender {
        config.persona.gender = g;
    }
    if let Some(l) = args.language {
        config.persona.language = l;
    }
    if args.no_video {
        config.persona.video_loop = false;
    }
}

fn build_llm(config: &KodamaConfig) -> anyhow::Result<Arc<dyn LlmClient>> {
    let llm = &config.llm;
    Ok(match llm.provider.as_str() {
        "mock" => Arc::new(MockProvider::new(config.persona.language)),
        "openai" => Arc::new(OpenAiClient::new(&llm.model, llm.base_url.as_deref())?),
        other => anyhow::bail!("unknown LLM provider: {}", other),
    })
}

fn build_tts(config: &KodamaConfig) -> anyhow::Result<Box<dyn TextToSpeech>> {
    let tts = &config.tts;
    Ok(match tts.provider.as_str() {
        "silent" => Box::new(SilentSpeech),
        "openai" => Box::new(OpenAiSpeech::new(&tts.model, tts.base_url.as_deref())?),
        other => anyhow::bail!("unknown TTS provider: {}", other),
    })
}

fn print_message(call: &VideoCall, message: &Message) {
    let persona = call.session().persona();
    let label = match message.sender {
        Sender::User => persona.user_label(),
        Sender::Agent => persona.agent_label(),
    };
    println!("\n{}: {}", label, message.text);
    if let Some(rec) = &message.recommendation {
        match &rec.course {
            Some(course) => println!("  📚 {} ({})", course.title, course.url),
            None => println!("  📚 [{}]", rec.category),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    let _log_guard = init_tracing(&args);

    let mut config = KodamaConfig::load_or_default(&args.config);
    apply_overrides(&mut config, &args);
    info!(
        llm = %config.llm.provider,
        tts = %config.tts.provider,
        language = ?config.persona.language,
        "Starting call"
    );

    let llm = build_llm(&config).context("Failed to set up text provider")?;
    let tts = build_tts(&config).context("Failed to set up speech provider")?;

    let session = Arc::new(DialogueSession::from_config(llm, &config));
    let media = Arc::new(
        MediaSyncController::new(
            tts,
            Box::new(TerminalSink::default()),
            session.persona().supports_video_loop,
        )
        .with_fetch_timeout(Duration::from_secs(config.tts.timeout_secs)),
    );
    let call = VideoCall::new(session, media);

    let (greeting, _) = call.open().await;
    print_message(&call, &greeting);

    if let Some(text) = &args.once {
        let turn = call.submit(text).await?;
        if let Some(reply) = turn.reply.message() {
            print_message(&call, reply);
        }
        if let Some(speech) = turn.speech {
            let outcome = speech.await?;
            info!(?outcome, "Reply playback done");
        }
        call.end().await;
        return Ok(());
    }

    println!("\n(/stage shows the conversation stage, /quit hangs up)");
    let mut rl = DefaultEditor::new()?;
    loop {
        let line = match rl.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                error!("Failed to read input: {}", e);
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(trimmed);

        match trimmed {
            "/quit" | "/exit" => break,
            "/stage" => {
                let session = call.session();
                println!("turn {} · {}", session.turn().await, session.stage().await);
                continue;
            }
            _ => {}
        }

        match call.submit(trimmed).await {
            Ok(turn) => match &turn.reply {
                ReplyOutcome::Reply(m) | ReplyOutcome::Fallback(m) => print_message(&call, m),
                ReplyOutcome::Stale { .. } => {}
            },
            Err(e) => println!("[{}]", e),
        }
    }

    let transcript = call.end().await;
    println!("\nCall ended after {} messages.", transcript.len());
    Ok(())
}
