use clap::{Parser, Subcommand};
use lib::chat::ChatSession;
use lib::client::GatewayClient;
use lib::conversation::{Message, MessageKind};

#[derive(Parser)]
#[command(name = "komorebi")]
#[command(about = "Komorebi CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config.json.
    Init {
        /// Config file path (default: KOMOREBI_CONFIG_PATH or ~/.komorebi/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the gateway (HTTP completion and image endpoints). Needs GROQ_API_KEY or completion.apiKey.
    Gateway {
        /// Config file path (default: KOMOREBI_CONFIG_PATH or ~/.komorebi/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 15160)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Chat with Komorebi via the gateway (interactive). `/image <prompt>` asks for an image, `/prompt <text>` sets the system prompt.
    Chat {
        /// Config file path (default: KOMOREBI_CONFIG_PATH or ~/.komorebi/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Gateway base URL (default: http://<gateway.bind>:<gateway.port>)
        #[arg(long, value_name = "URL")]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("komorebi {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Gateway { config, port }) => {
            if let Err(e) = run_gateway(config, port).await {
                log::error!("gateway failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Chat { config, url }) => {
            if let Err(e) = run_chat(config, url).await {
                log::error!("chat failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(lib::config::default_config_path);
    let dir = lib::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_gateway(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, _path) = lib::config::load_config(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    log::info!("starting gateway on {}:{}", config.gateway.bind, config.gateway.port);
    lib::gateway::run_gateway(config).await
}

fn print_reply(message: &Message) {
    match message.kind {
        MessageKind::Text => println!("< {}", message.text.trim()),
        MessageKind::Image => println!("< [image] {}", message.text.trim()),
    }
}

async fn run_chat(
    config_path: Option<std::path::PathBuf>,
    url: Option<String>,
) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let (config, _) = lib::config::load_config(config_path)?;
    let base_url = url.unwrap_or_else(|| {
        format!("http://{}:{}", config.gateway.bind.trim(), config.gateway.port)
    });
    log::info!("chatting via gateway at {}", base_url);
    let mut session =
        ChatSession::with_window(GatewayClient::new(base_url), config.conversation.window);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    println!("Say hello to Komorebi! (/exit to quit)");

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        match repl_action(input) {
            ReplAction::Skip => continue,
            ReplAction::Exit => break,
            ReplAction::SetPrompt(prompt) => {
                session.set_system_prompt(prompt);
                if prompt.is_empty() {
                    println!("(system prompt reset to default)");
                } else {
                    println!("(system prompt set)");
                }
                continue;
            }
            ReplAction::Send { hint } => {
                if let Some(cmd) = hint {
                    println!("(tip: {} <prompt> asks for an image)", cmd);
                }
            }
        }

        session.set_input(input);
        let pending = match session.begin_input() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };
        eprintln!("  Komorebi is typing...");
        let outcome = session.dispatch(&pending).await;
        print_reply(session.finish(outcome));
    }

    Ok(())
}

/// What the REPL does with one trimmed input line.
#[derive(Debug, PartialEq, Eq)]
enum ReplAction<'a> {
    Skip,
    Exit,
    SetPrompt(&'a str),
    /// Send the line as a message; `hint` names a command the line is a prefix of.
    Send { hint: Option<&'static str> },
}

fn repl_action(input: &str) -> ReplAction<'_> {
    if input.is_empty() {
        return ReplAction::Skip;
    }
    if input.eq_ignore_ascii_case("/exit") || input.eq_ignore_ascii_case("/quit") {
        return ReplAction::Exit;
    }
    if let Some(rest) = strip_prefix_ignore_case(input, "/prompt") {
        return ReplAction::SetPrompt(rest.trim());
    }
    ReplAction::Send {
        hint: lib::command::suggest_command(input),
    }
}

fn strip_prefix_ignore_case<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    let head = input.get(..prefix.len())?;
    let rest = &input[prefix.len()..];
    if head.eq_ignore_ascii_case(prefix) && (rest.is_empty() || rest.starts_with(char::is_whitespace)) {
        Some(rest)
    } else {
        None
    }
}
