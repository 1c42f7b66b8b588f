use std::io::Write;
use std::sync::Arc;

use chrono::DateTime;
use clap::{Parser, Subcommand};

use ghfs_remote::{Config, Entry, GithubClient, GithubFs, ReadFilesystem, RepoRef};

#[derive(Parser)]
#[command(
    name = "ghfs-remote",
    about = "Browse a GitHub repository as a read-only filesystem"
)]
struct Cli {
    /// Repository in owner/repo or owner/repo@revision format
    repo: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report whether a path is a file, a directory, or missing
    Exists {
        path: String,
    },

    /// Print a file's contents
    Cat {
        path: String,
    },

    /// Show size, modification time and mime type of a file
    Stat {
        path: String,
    },

    /// List a directory
    Ls {
        #[arg(default_value = "")]
        path: String,

        /// Include everything below the directory
        #[arg(short, long)]
        recursive: bool,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        if e.to_string().contains("HTTP 403") {
            eprintln!();
            eprintln!("Hint: set GITHUB_TOKEN to raise the API rate limit");
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let repo: RepoRef = cli
        .repo
        .parse()
        .map_err(|e| format!("Invalid repo format: {}", e))?;

    let config = Config::load()?;
    let client = Arc::new(GithubClient::new(&config));
    let fs = GithubFs::with_services(repo, client);

    match cli.command {
        Commands::Exists { path } => cmd_exists(&fs, &path),
        Commands::Cat { path } => cmd_cat(&fs, &path),
        Commands::Stat { path } => cmd_stat(&fs, &path),
        Commands::Ls { path, recursive } => cmd_ls(&fs, &path, recursive),
    }
}

fn cmd_exists(fs: &GithubFs, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let kind = if fs.file_exists(path)? {
        "file"
    } else if fs.directory_exists(path)? {
        "directory"
    } else {
        "missing"
    };
    println!("{}", kind);
    Ok(())
}

fn cmd_cat(fs: &GithubFs, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut stream = fs.read_stream(path)?;
    let mut stdout = std::io::stdout().lock();
    std::io::copy(&mut stream, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

fn cmd_stat(fs: &GithubFs, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let entry = fs.last_modified(path)?;

    println!("  Path:      {}", entry.path);
    println!(
        "  Size:      {}",
        entry
            .size
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!(
        "  Modified:  {}",
        format_timestamp(entry.last_modified.unwrap_or(0))
    );
    println!(
        "  Mime type: {}",
        if entry.mime_type.is_empty() {
            "-"
        } else {
            entry.mime_type.as_str()
        }
    );

    Ok(())
}

fn cmd_ls(fs: &GithubFs, path: &str, recursive: bool) -> Result<(), Box<dyn std::error::Error>> {
    for entry in fs.list_contents(path, recursive)? {
        match entry {
            Entry::File(file) => println!("f {}", file.path),
            Entry::Directory(dir) => println!("d {}/", dir.path),
        }
    }
    Ok(())
}

fn format_timestamp(secs: i64) -> String {
    if secs == 0 {
        return "unknown".to_string();
    }
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| secs.to_string())
}
