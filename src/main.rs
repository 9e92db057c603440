use crossterm::style::Stylize;
use pm_dash::api::{ApiClient, HealthResponse};
use pm_dash::completer::DashboardCompleter;
use pm_dash::config::{Config, API_URL_ENV};
use pm_dash::dashboard::{Command, Outcome, Session, COMMANDS};
use pm_dash::table_display::{display_results, display_rows};
use pm_dash::utils::app_paths::AppPaths;
use reedline::{
    default_emacs_keybindings, ColumnarMenu, DefaultPrompt, DefaultPromptSegment, Emacs,
    FileBackedHistory, KeyCode, KeyModifiers, MenuBuilder, Reedline, ReedlineEvent, ReedlineMenu,
    Signal,
};
use std::io;

fn print_help() {
    println!("{}", "pm-dash - Predictive maintenance dashboard".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  pm-dash [--api-url <URL>]");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}  - Backend base URL (or set {})", "--api-url <URL>".green(), API_URL_ENV);
    println!("  {}    - Initialize configuration with wizard", "--init-config".green());
    println!("  {} - Generate config file with defaults", "--generate-config".green());
    println!();
    println!("{}", "Commands:".yellow());
    for (name, args, help) in COMMANDS {
        let synopsis = if args.is_empty() {
            name.to_string()
        } else {
            format!("{} {}", name, args)
        };
        println!("  {} - {}", format!("{:<32}", synopsis).green(), help);
    }
    println!();
}

fn print_health(health: &HealthResponse) {
    let status = if health.is_ok() {
        health.status.clone().green()
    } else {
        health.status.clone().red()
    };
    println!("Backend status: {}", status);
    for (key, value) in &health.details {
        println!("  {}: {}", key, value);
    }
}

fn render(session: &Session, outcome: Outcome) -> bool {
    let display = &session.config().display;
    match outcome {
        Outcome::Rows => display_rows(session.state()),
        Outcome::Results { model_version } => {
            display_results(&model_version, session.state().results(), display)
        }
        Outcome::Health(health) => print_health(&health),
        Outcome::Message(message) => println!("{}", message.green()),
        Outcome::Logs(entries) => {
            for entry in entries {
                println!("{}", entry.format_for_display());
            }
        }
        Outcome::Help => print_help(),
        Outcome::Clear => print!("{esc}[2J{esc}[1;1H", esc = 27 as char),
        Outcome::Quit => return false,
    }
    true
}

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    if args.contains(&"--init-config".to_string()) {
        match Config::init_wizard() {
            Ok(_) => {
                println!("\nConfiguration initialized successfully!");
                return Ok(());
            }
            Err(e) => {
                eprintln!("Error initializing config: {}", e);
                std::process::exit(1);
            }
        }
    }

    if args.contains(&"--generate-config".to_string()) {
        match Config::get_config_path() {
            Ok(path) => {
                if let Some(parent) = path.parent() {
                    if let Err(e) = std::fs::create_dir_all(parent) {
                        eprintln!("Error creating config directory: {}", e);
                        std::process::exit(1);
                    }
                }
                if let Err(e) = std::fs::write(&path, Config::create_default_with_comments()) {
                    eprintln!("Error writing config file: {}", e);
                    std::process::exit(1);
                }
                println!("Configuration file created at: {:?}", path);
                return Ok(());
            }
            Err(e) => {
                eprintln!("Error determining config path: {}", e);
                std::process::exit(1);
            }
        }
    }

    pm_dash::utils::logging::init_tracing_with_dual_logging();
    if let Some(dual_logger) = pm_dash::utils::dual_logging::get_dual_logger() {
        eprintln!("Logs: {}", dual_logger.log_path().display());
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format!("Config error, using defaults: {}", e).yellow());
            Config::default()
        }
    };

    let cli_url = args
        .iter()
        .position(|arg| arg == "--api-url")
        .and_then(|pos| args.get(pos + 1))
        .map(|s| s.as_str());

    let Some(api_url) = config.resolve_base_url(cli_url) else {
        eprintln!(
            "{}",
            format!(
                "No backend URL configured. Use --api-url, set {} or run --init-config.",
                API_URL_ENV
            )
            .red()
        );
        std::process::exit(2);
    };

    let client = match ApiClient::new(&config.client_config(api_url)) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            std::process::exit(2);
        }
    };

    println!("{}", format!("Connected to API: {}", client.base_url()).cyan());

    let mut session = Session::new(client, config);

    let completion_menu = Box::new(
        ColumnarMenu::default()
            .with_name("command_completion")
            .with_columns(1)
            .with_column_width(None)
            .with_column_padding(2),
    );

    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::Menu("command_completion".to_string()),
    );

    let mut line_editor = Reedline::create()
        .with_completer(Box::new(DashboardCompleter::new(session.feature_names())))
        .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    let behavior = &session.config().behavior;
    if behavior.enable_history {
        if let Ok(history_file) = AppPaths::history_file() {
            match FileBackedHistory::with_file(behavior.max_history_entries, history_file) {
                Ok(history) => line_editor = line_editor.with_history(Box::new(history)),
                Err(e) => eprintln!("{}", format!("History disabled: {}", e).yellow()),
            }
        }
    }

    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("pm".to_string()),
        DefaultPromptSegment::Empty,
    );

    // Load features up front; a failure leaves the shell usable
    match session.execute(Command::Features) {
        Ok(outcome) => {
            render(&session, outcome);
        }
        Err(e) => {
            tracing::error!(target: "shell", "Loading features failed: {}", e);
            eprintln!("{}", format!("Could not load /features: {}", e).red());
        }
    }
    println!("{}", "Type \\help for commands.".dark_grey());

    loop {
        let sig = line_editor.read_line(&prompt)?;
        match sig {
            Signal::Success(buffer) => {
                let trimmed = buffer.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let command = match Command::parse(trimmed) {
                    Ok(command) => command,
                    Err(e) => {
                        eprintln!("{}", format!("Error: {}", e).red());
                        continue;
                    }
                };

                match session.execute(command) {
                    Ok(outcome) => {
                        if !render(&session, outcome) {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(target: "shell", "{}", e);
                        eprintln!("{}", format!("Error: {}", e).red());
                    }
                }
            }
            Signal::CtrlD | Signal::CtrlC => break,
        }
    }

    println!("\nGoodbye!");
    Ok(())
}
