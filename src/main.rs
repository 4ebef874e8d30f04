use anyhow::{Context, Result};
use clap::Parser;
use ecobear::cli::{init_tracing, BotArgs};
use ecobear::sessions::DEFAULT_SESSION;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

const BANNER: &str = r#"
    ==========================================
       🌳 Forest Guardian Bear AI v2.0 🐻
    Type 'help' for commands
    Type 'exit' to quit
    ==========================================
"#;

#[derive(Debug, Parser)]
#[command(name = "ecobear", version, about = "Chat with the Forest Guardian Bear")]
struct Cli {
    #[command(flatten)]
    bot: BotArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // Keep the chat readable unless asked for more
    init_tracing(cli.bot.verbose, "ecobear=warn");

    println!("{}", BANNER);

    let bot = match cli.bot.build_bot() {
        Ok(bot) => bot,
        Err(e) => {
            eprintln!("💥 Startup failed: {}", e);
            eprintln!("Checklist:");
            eprintln!("1. {} contains {}", cli.bot.env_file.display(), cli.bot.api_key_env);
            eprintln!("2. The network is reachable");
            eprintln!("3. Run the program again (or pass --offline)");
            return Err(e).context("failed to start the bear");
        }
    };

    println!("🐻 I'm Bear Guardian, protector of the forest! How can I help you today?");

    let mut editor = DefaultEditor::new()?;
    let history = history_path();
    if let Some(path) = &history {
        let _ = editor.load_history(path);
    }

    loop {
        match editor.readline("\nYou: ") {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(input);

                if input.eq_ignore_ascii_case("exit") {
                    println!("🐻 Remember to visit the forest often! Goodbye~");
                    break;
                }

                let reply = bot.process_query(DEFAULT_SESSION, input).await?;
                println!("\nBear: {}", reply.text);
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("\n🐻💤 Detected you're leaving... remember to turn off lights to save energy!");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    if let Some(path) = &history {
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        let _ = editor.save_history(path);
    }
    Ok(())
}

fn history_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".ecobear").join("history.txt"))
}
