use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mockup_contracts::chat::{parse_intent, Intent, CHAT_HELP_COMMANDS};
use mockup_contracts::history::{GeneratedResult, HistoryFilter, SortOrder};
use mockup_contracts::models::{AspectRatio, ModelTier, QualityTier};
use mockup_contracts::prompt::{PROMPT_MODIFIERS, PROMPT_PRESETS};
use mockup_contracts::request::BackgroundColor;
use mockup_engine::{
    truncate_text, DryrunBackend, GeminiBackend, GenerationBackend, MockupStudio, StudioConfig,
};
use serde_json::{json, Value};

#[derive(Debug, Parser)]
#[command(name = "mockup-rs", version, about = "Product mockup generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate one mockup and save it.
    Generate(GenerateArgs),
    /// Describe a reference image as a prompt.
    Analyze(AnalyzeArgs),
    /// List, delete or clear saved results.
    History(HistoryArgs),
    /// Save a past result by id.
    Download(DownloadArgs),
    /// Interactive session.
    Chat(ChatArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendKind {
    Gemini,
    Dryrun,
}

#[derive(Debug, Parser)]
struct SessionArgs {
    #[arg(long, default_value = ".mockup")]
    state_dir: PathBuf,
    #[arg(long, value_enum, default_value_t = BackendKind::Gemini)]
    backend: BackendKind,
    #[arg(long)]
    api_key: Option<String>,
}

#[derive(Debug, Parser)]
struct GenerateArgs {
    #[command(flatten)]
    session: SessionArgs,
    /// Scene description. May be empty when a reference image is given.
    #[arg(default_value = "")]
    prompt: String,
    #[arg(long, default_value = "HD")]
    quality: QualityTier,
    #[arg(long, default_value = "1:1")]
    aspect: AspectRatio,
    #[arg(long, default_value = "flash")]
    model: ModelTier,
    #[arg(long, default_value = "#000000")]
    bg: BackgroundColor,
    #[arg(long)]
    reference: Option<PathBuf>,
    #[arg(long)]
    refine: bool,
    #[arg(long)]
    preset: Option<String>,
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

#[derive(Debug, Parser)]
struct AnalyzeArgs {
    #[command(flatten)]
    session: SessionArgs,
    image: PathBuf,
}

#[derive(Debug, Parser)]
struct HistoryArgs {
    #[command(flatten)]
    session: SessionArgs,
    #[arg(long)]
    quality: Option<QualityTier>,
    #[arg(long)]
    oldest: bool,
    #[arg(long)]
    delete: Option<String>,
    #[arg(long)]
    clear: bool,
}

#[derive(Debug, Parser)]
struct DownloadArgs {
    #[command(flatten)]
    session: SessionArgs,
    id: String,
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

#[derive(Debug, Parser)]
struct ChatArgs {
    #[command(flatten)]
    session: SessionArgs,
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("mockup-rs error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Analyze(args) => run_analyze(args),
        Command::History(args) => run_history(args),
        Command::Download(args) => run_download(args),
        Command::Chat(args) => {
            run_chat(args)?;
            Ok(0)
        }
    }
}

fn open_studio(args: &SessionArgs) -> MockupStudio {
    let config = StudioConfig::from_env(&args.state_dir).with_api_key(args.api_key.clone());
    let backend: Box<dyn GenerationBackend> = match args.backend {
        BackendKind::Gemini => Box::new(GeminiBackend::new(&config)),
        BackendKind::Dryrun => Box::new(DryrunBackend),
    };
    MockupStudio::open(&config, backend)
}

fn run_generate(args: GenerateArgs) -> Result<i32> {
    let mut studio = open_studio(&args.session);
    if let Some(path) = args.reference.as_deref() {
        studio.attach_reference_file(path)?;
    }
    studio.set_prompt(args.prompt.clone());
    if let Some(preset) = args.preset.as_deref() {
        studio.apply_preset(preset)?;
    }
    studio.set_quality(args.quality);
    studio.set_aspect_ratio(args.aspect);
    studio.set_model(args.model);
    studio.set_background(args.bg.clone());
    studio.set_refine_mode(args.refine);

    let result = studio.generate()?;
    print_result(&result);
    let path = studio.download_current(&args.out)?;
    println!("Saved {}", path.display());
    Ok(0)
}

fn run_analyze(args: AnalyzeArgs) -> Result<i32> {
    let mut studio = open_studio(&args.session);
    studio.attach_reference_file(&args.image)?;
    let prompt = studio.analyze_reference()?;
    println!("{prompt}");
    Ok(0)
}

fn run_history(args: HistoryArgs) -> Result<i32> {
    let mut studio = open_studio(&args.session);
    if args.clear {
        studio.clear_history();
        println!("History cleared.");
        return Ok(0);
    }
    if let Some(id) = args.delete.as_deref() {
        let removed = studio.remove_history_entry(id)?;
        println!("Deleted {}", removed.id);
        return Ok(0);
    }
    let filter = HistoryFilter {
        quality: args.quality,
        order: if args.oldest {
            SortOrder::Oldest
        } else {
            SortOrder::Newest
        },
    };
    print_history(&studio, &filter);
    Ok(0)
}

fn run_download(args: DownloadArgs) -> Result<i32> {
    let mut studio = open_studio(&args.session);
    studio.load_from_history(&args.id)?;
    let path = studio.download_current(&args.out)?;
    println!("Saved {}", path.display());
    Ok(0)
}

fn run_chat(args: ChatArgs) -> Result<()> {
    let mut studio = open_studio(&args.session);
    let stdin = io::stdin();
    let mut line = String::new();

    println!(
        "Mockup chat started (session {}, {} saved results). Type /help for commands.",
        studio.session_id(),
        studio.state().history.len()
    );

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        let read = match stdin.read_line(&mut line) {
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        if read == 0 {
            break;
        }

        let intent = parse_intent(line.trim_end_matches(['\n', '\r']));
        if intent.action == "noop" {
            continue;
        }
        if intent.action == "exit" {
            break;
        }
        if let Err(err) = handle_intent(&mut studio, &intent, &args.out) {
            println!("Error: {err:#}");
        }
    }
    Ok(())
}

fn handle_intent(studio: &mut MockupStudio, intent: &Intent, out_dir: &Path) -> Result<()> {
    match intent.action.as_str() {
        "help" => println!("Commands: {}", CHAT_HELP_COMMANDS.join(" ")),
        "generate" => {
            studio.set_prompt(intent.prompt.clone().unwrap_or_default());
            generate_and_report(studio)?;
        }
        "regenerate" => generate_and_report(studio)?,
        "set_quality" => {
            let tier: QualityTier = required_arg(intent, "value", "/quality")?.parse()?;
            studio.set_quality(tier);
            println!("Quality set to {tier}");
        }
        "set_aspect" => {
            let ratio: AspectRatio = required_arg(intent, "value", "/aspect")?.parse()?;
            studio.set_aspect_ratio(ratio);
            println!("Aspect ratio set to {ratio}");
        }
        "set_model" => {
            let model: ModelTier = required_arg(intent, "value", "/model")?.parse()?;
            studio.set_model(model);
            println!("Model set to {} ({})", model, model.api_model());
        }
        "set_background" => {
            let color: BackgroundColor = required_arg(intent, "value", "/bg")?.parse()?;
            if color.is_default() {
                println!("Background override off");
            } else {
                println!("Background set to {color}");
            }
            studio.set_background(color);
        }
        "set_refine" => {
            let enabled = parse_toggle(required_arg(intent, "value", "/refine")?)?;
            if enabled && studio.state().reference.is_none() {
                bail!("/refine on needs a reference image (use /ref <path>)");
            }
            studio.set_refine_mode(enabled);
            println!("Refine mode {}", if enabled { "on" } else { "off" });
        }
        "attach_reference" => {
            let path = PathBuf::from(required_arg(intent, "path", "/ref")?);
            studio.attach_reference_file(&path)?;
            println!("Reference image set to {}", path.display());
        }
        "clear_reference" => {
            studio.clear_reference();
            println!("Reference image cleared.");
        }
        "analyze" => {
            let prompt = studio.analyze_reference()?;
            println!("Prompt: {prompt}");
        }
        "apply_preset" => {
            studio.apply_preset(required_arg(intent, "value", "/preset")?)?;
            println!("Prompt: {}", studio.state().prompt);
        }
        "apply_modifier" => {
            studio.apply_modifier(required_arg(intent, "value", "/mod")?)?;
            println!("Prompt: {}", studio.state().prompt);
        }
        "list_presets" => {
            for preset in PROMPT_PRESETS {
                println!("{:<12} {}", preset.id, preset.label);
            }
            for modifier in PROMPT_MODIFIERS {
                println!("{:<12} {}", modifier.group, modifier.label);
            }
        }
        "list_history" => {
            let quality = intent
                .arg_str("quality")
                .map(str::parse::<QualityTier>)
                .transpose()?;
            let order = if intent.arg_str("order") == Some("oldest") {
                SortOrder::Oldest
            } else {
                SortOrder::Newest
            };
            print_history(studio, &HistoryFilter { quality, order });
        }
        "load_history" => {
            studio.load_from_history(required_arg(intent, "value", "/load")?)?;
            if let Some(current) = studio.state().current.as_ref() {
                print_result(current);
            }
        }
        "delete_history" => {
            let removed = studio.remove_history_entry(required_arg(intent, "value", "/delete")?)?;
            println!("Deleted {}", removed.id);
        }
        "clear_history" => {
            studio.clear_history();
            println!("History cleared.");
        }
        "download" => {
            let dir = intent
                .arg_str("path")
                .map(PathBuf::from)
                .unwrap_or_else(|| out_dir.to_path_buf());
            let path = studio.download_current(&dir)?;
            println!("Saved {}", path.display());
        }
        "status" => print_status(studio),
        "unknown" => {
            let command = intent.arg_str("command").unwrap_or_default();
            println!("Unknown command /{command}. Type /help for commands.");
        }
        other => println!("Unhandled action {other}"),
    }
    Ok(())
}

fn generate_and_report(studio: &mut MockupStudio) -> Result<()> {
    let result = studio.generate()?;
    print_result(&result);
    Ok(())
}

fn required_arg<'a>(intent: &'a Intent, key: &str, command: &str) -> Result<&'a str> {
    intent
        .arg_str(key)
        .with_context(|| format!("{command} requires an argument"))
}

fn parse_toggle(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => bail!("expected on or off, got '{other}'"),
    }
}

fn print_result(result: &GeneratedResult) {
    println!(
        "Result {} ({}, {}) {}",
        result.id,
        result.quality_tier,
        result.model_tier,
        result.download_file_name()
    );
}

fn print_history(studio: &MockupStudio, filter: &HistoryFilter) {
    let rows = studio.history_view(filter);
    if rows.is_empty() {
        println!("No saved results.");
        return;
    }
    for entry in rows {
        println!(
            "{}  {:<3}  {:<5}  {}",
            entry.id,
            entry.quality_tier,
            entry.model_tier,
            summarize_prompt(&entry.source_prompt, 60)
        );
    }
}

fn print_status(studio: &MockupStudio) {
    let state = studio.state();
    let status: Value = json!({
        "prompt": state.prompt,
        "quality": state.quality.label(),
        "aspect_ratio": state.aspect_ratio.as_str(),
        "model": state.model.api_model(),
        "background": state.background.as_str(),
        "refine": state.refine_mode,
        "reference": state.reference.as_ref().map(|image| image.mime_type.clone()),
        "phase": format!("{:?}", state.phase),
        "current": state.current.as_ref().map(|result| result.id.clone()),
        "error": state.error,
        "history": state.history.len(),
    });
    match serde_json::to_string_pretty(&status) {
        Ok(text) => println!("{text}"),
        Err(err) => println!("Status unavailable: {err}"),
    }
}

fn summarize_prompt(prompt: &str, max_chars: usize) -> String {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return "(reference only)".to_string();
    }
    truncate_text(trimmed, max_chars)
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use mockup_contracts::chat::parse_intent;
    use mockup_contracts::models::{ModelTier, QualityTier};

    use super::{handle_intent, parse_toggle, summarize_prompt, Cli, Command};
    use mockup_engine::{DryrunBackend, MockupStudio, StudioConfig};

    #[test]
    fn generate_flags_parse_into_typed_options() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "mockup-rs",
            "generate",
            "ceramic mug",
            "--quality",
            "4k",
            "--model",
            "pro",
            "--backend",
            "dryrun",
            "--bg",
            "ffffff",
        ])?;
        let Command::Generate(args) = cli.command else {
            anyhow::bail!("expected generate subcommand");
        };
        assert_eq!(args.prompt, "ceramic mug");
        assert_eq!(args.quality, QualityTier::R4k);
        assert_eq!(args.model, ModelTier::Pro);
        assert_eq!(args.bg.as_str(), "#ffffff");
        Ok(())
    }

    #[test]
    fn unknown_quality_is_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["mockup-rs", "generate", "x", "--quality", "16K"]).is_err());
    }

    #[test]
    fn toggle_accepts_on_off() -> anyhow::Result<()> {
        assert!(parse_toggle("ON")?);
        assert!(!parse_toggle("off")?);
        assert!(parse_toggle("maybe").is_err());
        Ok(())
    }

    #[test]
    fn chat_lines_drive_the_studio() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let config = StudioConfig::new(temp.path());
        let mut studio = MockupStudio::open(&config, Box::new(DryrunBackend));
        let out = temp.path().join("out");

        for line in ["/quality 2K", "/aspect 16:9", "/preset minimal", "/generate"] {
            handle_intent(&mut studio, &parse_intent(line), &out)?;
        }
        assert_eq!(studio.state().history.len(), 1);
        assert!(handle_intent(&mut studio, &parse_intent("/refine on"), &out).is_err());

        handle_intent(&mut studio, &parse_intent("/download"), &out)?;
        let saved: Vec<_> = std::fs::read_dir(&out)?.collect::<Result<_, _>>()?;
        assert_eq!(saved.len(), 1);
        Ok(())
    }

    #[test]
    fn long_prompts_are_shortened_for_listing() {
        assert_eq!(summarize_prompt("  ", 10), "(reference only)");
        assert_eq!(summarize_prompt("abcdefghijkl", 4), "abcd…");
    }
}
