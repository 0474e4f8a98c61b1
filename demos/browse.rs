use std::env;
use std::process;
use std::sync::Arc;

use netstore::error::Result;
use netstore::{
    BrowserHandle, BrowserState, ClientConfig, DirectorySaver, Notice, PendingFile, StorageClient,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: cargo run --example browse -- [--url API_URL] [--proxy PROXY] [--out DIR]";

const HELP: &str = "\
Commands:
  ls                 list the current directory
  pwd                print the current location
  cd <name|..|/path> change directory
  mkdir <name>       create a directory here
  put <local file>   upload a local file here
  rm <name>          remove a file or empty directory
  get <name>         download a file
  quit               exit";

fn usage_and_exit() -> ! {
    eprintln!("{USAGE}");
    process::exit(1);
}

struct ArgParser {
    args: Vec<String>,
}

impl ArgParser {
    fn new() -> Self {
        let args: Vec<String> = env::args().skip(1).collect();

        if args.iter().any(|a| a == "--help" || a == "-h") {
            println!("{USAGE}\n\n{HELP}");
            process::exit(0);
        }

        Self { args }
    }

    fn take_value(&mut self, name: &str) -> Option<String> {
        let i = self.args.iter().position(|a| a == name)?;
        let value = self.args.get(i + 1).cloned();
        if value.is_none() {
            usage_and_exit();
        }
        self.args.drain(i..=i + 1);
        value
    }
}

fn print_listing(state: &BrowserState) {
    if let Some(err) = state.refresh_error() {
        eprintln!("(listing may be stale: {})", err);
    }
    let listing = state.listing();
    if listing.is_empty() {
        println!("  (empty)");
        return;
    }
    for entry in listing.entries() {
        let marker = if entry.is_directory() { "/" } else { "" };
        println!("  {}{}", entry.name, marker);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut parser = ArgParser::new();
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = parser.take_value("--url") {
        config.api_url = url;
    }
    if let Some(proxy) = parser.take_value("--proxy") {
        config.proxy = Some(proxy);
    }
    if let Some(out) = parser.take_value("--out") {
        config.download_dir = out.into();
    }
    if !parser.args.is_empty() {
        usage_and_exit();
    }

    let client = StorageClient::from_config(&config)?;
    let saver = DirectorySaver::new(client.clone(), &config.download_dir).with_progress(true);
    let notices = |notice: &Notice| eprintln!("! {}", notice);
    let browser = BrowserHandle::spawn(Arc::new(client), Arc::new(notices), Arc::new(saver));

    println!("Connected to {}", config.api_url);
    println!("{HELP}");
    let state = browser.settle().await?;
    println!("{}:", state.location());
    print_listing(&state);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let state = browser.snapshot().await?;
        let mut busy = Vec::new();
        if !state.can_create_directory() {
            busy.push("mkdir");
        }
        if !state.can_upload() {
            busy.push("put");
        }
        if busy.is_empty() {
            eprint!("{}> ", state.location());
        } else {
            eprint!("{} [busy: {}]> ", state.location(), busy.join(", "));
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        let (cmd, arg) = match line.split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (line, ""),
        };

        let result = match (cmd, arg) {
            ("", _) => continue,
            ("quit" | "exit", _) => break,
            ("help", _) => {
                println!("{HELP}");
                continue;
            }
            ("pwd", _) => {
                println!("{}", state.location());
                continue;
            }
            ("ls", _) => browser.refresh().await,
            ("cd", "..") => browser.navigate_to_parent().await,
            ("cd", target) if target.starts_with('/') => browser.navigate_to(target).await,
            ("cd", name) if !name.is_empty() => match state.listing().find(name) {
                Some(entry) if entry.is_directory() => browser.activate(entry).await,
                _ => {
                    eprintln!("No such directory: {}", name);
                    continue;
                }
            },
            ("mkdir", _) if !state.can_create_directory() => {
                eprintln!("A directory is still being created");
                continue;
            }
            ("put", _) if !state.can_upload() => {
                eprintln!("An upload is still in progress");
                continue;
            }
            ("mkdir", name) if !name.is_empty() => browser.mkdir(name).await,
            ("put", local) if !local.is_empty() => match PendingFile::from_path(local).await {
                Ok(file) => browser.upload(file).await,
                Err(e) => {
                    eprintln!("Cannot read {}: {}", local, e);
                    continue;
                }
            },
            ("rm" | "get", name) if !name.is_empty() => match state.listing().find(name) {
                Some(entry) if cmd == "rm" => browser.remove(entry).await,
                Some(entry) if entry.is_file() => browser.download(entry).await,
                Some(_) => {
                    eprintln!("Not a file: {}", name);
                    continue;
                }
                None => {
                    eprintln!("No such entry: {}", name);
                    continue;
                }
            },
            _ => {
                eprintln!("Unknown command: {}", line);
                continue;
            }
        };

        if let Err(e) = result {
            eprintln!("Error: {}", e);
            continue;
        }

        // Mutations finish in the background; the prompt shows them as busy.
        if cmd == "mkdir" || cmd == "put" {
            println!("Submitted; the listing refreshes when it completes");
            continue;
        }

        let state = browser.settle().await?;
        if cmd != "get" {
            println!("{}:", state.location());
            print_listing(&state);
        } else {
            println!("Saved into {}", config.download_dir.display());
        }
    }

    browser.shutdown().await;
    Ok(())
}
