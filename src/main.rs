//! termline demo - interactive line editor REPL
//!
//! Reads lines with full editing (history, completion, hints) and echoes
//! them back. Useful for exercising the library by hand.
//!
//! ```text
//! termline               # basic REPL
//! termline --multiline   # wrap long lines over rows
//! termline --mask        # echo '*' instead of typed characters
//! termline --keycodes    # print byte values of pressed keys
//! ```

use std::env;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use termline::{EditorConfig, Hint, Session, Status, Tty};

/// Command line options for the demo.
#[derive(Default)]
struct Options {
    multi_line: bool,
    mask: bool,
    /// Debugging: print raw key codes instead of editing.
    keycodes: bool,
}

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    eprintln!("termline {}", VERSION);
}

fn print_help() {
    eprintln!("termline {} - interactive line editor demo", VERSION);
    eprintln!();
    eprintln!("Usage: termline [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -m, --multiline       Multi-line editing (wrap over rows)");
    eprintln!("      --mask            Mask typed characters with '*'");
    eprintln!("  -k, --keycodes        Print key codes (debug), 'quit' to exit");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("REPL commands:");
    eprintln!("  /historylen <n>       Set the history length");
    eprintln!("  /mask, /unmask        Toggle masked input");
    eprintln!();
    eprintln!("Configuration: ~/.termline/config.toml");
    eprintln!("History file:  ~/.termline/history");
}

fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = env::args().collect();
    let mut options = Options::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-m" | "--multiline" => {
                options.multi_line = true;
            }
            "--mask" => {
                options.mask = true;
            }
            "-k" | "--keycodes" => {
                options.keycodes = true;
            }
            arg => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
        }
        i += 1;
    }

    Ok(options)
}

/// Log to a file; the terminal itself belongs to the editor.
fn init_logging() {
    let Some(home) = dirs_home() else { return };
    let dir = home.join(".termline");
    let _ = std::fs::create_dir_all(&dir);
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("termline.log"))
        .ok();
    if let Some(file) = log_file {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn dirs_home() -> Option<std::path::PathBuf> {
    env::var_os("HOME").map(std::path::PathBuf::from)
}

/// Echo the decimal and hex value of every pressed key until "quit" is typed.
fn run_keycodes() -> anyhow::Result<()> {
    eprintln!("Press keys to see their codes. Type 'quit' to exit.");
    let mut tty = Tty::new(-1, -1);
    tty.enable_raw_mode()?;
    let mut quit = [b' '; 4];
    loop {
        let Some(c) = tty.read_byte()? else { break };
        quit.rotate_left(1);
        quit[3] = c;
        if &quit == b"quit" {
            break;
        }
        let printable = if c.is_ascii_graphic() { c as char } else { '?' };
        let line = format!("'{}' {:02} (0x{:02x})\r\n", printable, c, c);
        tty.write_all(line.as_bytes())?;
    }
    tty.disable_raw_mode()?;
    Ok(())
}

fn demo_completions(line: &str) -> Vec<String> {
    if line.starts_with('h') {
        vec!["hello".to_string(), "hello there".to_string()]
    } else {
        Vec::new()
    }
}

fn demo_hint(line: &str) -> Option<Hint> {
    if line.eq_ignore_ascii_case("hello") {
        Some(Hint {
            text: " World".to_string(),
            color: Some(35),
            bold: false,
        })
    } else {
        None
    }
}

fn run_repl(options: Options) -> anyhow::Result<()> {
    let mut config = EditorConfig::load();
    let history_path = config.history_path();

    let mut session = Session::with_config(-1, -1, env::var("TERM").ok().as_deref(), &config);
    session.set_completion_callback(Box::new(demo_completions));
    session.set_hints_callback(Box::new(demo_hint));
    if options.multi_line {
        session.set_multi_line(true);
    }
    if options.mask {
        session.set_mask_mode(true);
    }

    if let Some(path) = &history_path {
        if session.load_history(path).is_ok() {
            info!("loaded history from {}", path.display());
        }
    }

    loop {
        match session.read_line("termline> ")? {
            Status::Line(line) => {
                if let Some(rest) = line.strip_prefix("/historylen") {
                    match rest.trim().parse::<usize>() {
                        Ok(n) => {
                            if let Err(e) = session.set_history_max_len(n) {
                                eprintln!("{e}");
                            }
                        }
                        Err(_) => eprintln!("usage: /historylen <n>"),
                    }
                } else if line == "/mask" || line == "/unmask" {
                    let on = line == "/mask";
                    session.set_mask_mode(on);
                    config.mask_mode = on;
                    if let Err(e) = config.save() {
                        eprintln!("could not save config: {e}");
                    }
                } else if line.starts_with('/') {
                    eprintln!("Unrecognized command: {}", line);
                } else if !line.is_empty() {
                    println!("echo: '{}'", line);
                    session.add_history(&line);
                    if let Some(path) = &history_path {
                        if let Err(e) = session.save_history(path) {
                            eprintln!("could not save history: {e}");
                        }
                    }
                }
            }
            Status::Interrupted => {
                info!("interrupted");
                break;
            }
            Status::EndOfInput => break,
            Status::Pending => unreachable!("read_line never returns Pending"),
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let options = match parse_args() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    init_logging();
    info!("termline {} starting", VERSION);

    if options.keycodes {
        run_keycodes()
    } else {
        run_repl(options)
    }
}
