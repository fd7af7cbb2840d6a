//! chatgraph binary: run the walkthrough graphs or chat with the tool-calling agent.

use clap::{Parser, Subcommand};
use chatgraph::ToolChoiceMode;
use chatgraph_cli::{format_message, run_chat_with_options, run_counter, run_route, RunOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "chatgraph")]
#[command(about = "State-graph walkthroughs and a tool-calling chat agent")]
struct Cli {
    /// Log node enter/exit and graph steps (debug level unless RUST_LOG is set).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// START -> increment -> END over an overwrite counter.
    Counter {
        #[arg(long, default_value_t = 0)]
        start: i64,
    },
    /// START -> check -> (on_true | on_false) -> END, routed on --flag.
    Route {
        #[arg(long)]
        flag: bool,
    },
    /// Chat with the model; it can call add, multiply and divide.
    Chat {
        /// User message (also accepted as trailing positional words)
        #[arg(short, long, value_name = "TEXT")]
        message: Option<String>,

        /// Conversation thread; persists history between runs.
        #[arg(long = "thread", value_name = "ID")]
        thread_id: Option<String>,

        /// SQLite file for persisted threads (default: DB_PATH or memory.db).
        #[arg(long = "db", value_name = "PATH")]
        db_path: Option<String>,

        /// Print model tokens as they arrive.
        #[arg(long)]
        stream: bool,

        #[arg(long, value_name = "TEXT")]
        system: Option<String>,

        #[arg(long)]
        temperature: Option<f32>,

        /// auto, none or required.
        #[arg(long, value_name = "MODE")]
        tool_choice: Option<ToolChoiceMode>,

        #[arg(long, value_name = "STEPS")]
        recursion_limit: Option<usize>,

        #[arg(trailing_var_arg = true)]
        rest: Vec<String>,
    },
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn get_message(message: Option<String>, rest: &[String]) -> String {
    if let Some(m) = message {
        return m;
    }
    if rest.is_empty() {
        return "What is 21 * 2?".to_string();
    }
    rest.join(" ").trim().to_string()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Counter { start } => {
            let state = run_counter(start).await?;
            println!("counter = {}", state.get("counter").cloned().unwrap_or_default());
        }
        Command::Route { flag } => {
            let state = run_route(flag).await?;
            println!("path = {}", state.get("path").cloned().unwrap_or_default());
            println!("result = {}", state.get("result").cloned().unwrap_or_default());
        }
        Command::Chat {
            message,
            thread_id,
            db_path,
            stream,
            system,
            temperature,
            tool_choice,
            recursion_limit,
            rest,
        } => {
            let input = get_message(message, &rest);
            println!("User: {}", input);
            println!("---");

            let options = RunOptions {
                temperature,
                tool_choice,
                thread_id,
                db_path,
                system_prompt: system,
                recursion_limit,
                stream,
                verbose: cli.verbose,
            };
            let state = match run_chat_with_options(&input, &options).await {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("error: {}", e);
                    std::process::exit(1);
                }
            };
            let messages = state.messages()?;
            if messages.is_empty() {
                eprintln!("no messages");
                std::process::exit(1);
            }
            for m in &messages {
                println!("{}", format_message(m));
            }
        }
    }

    Ok(())
}
