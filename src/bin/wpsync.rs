//! CLI binary for wp-vault-sync.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `SyncConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wp_vault_sync::pipeline::markup::{block_counts, parse_block_markup};
use wp_vault_sync::{
    download_post, download_recent, preview_file, publish_file, resolve_download_dir,
    DownloadReport, ProgressCallback, PublishAction, SyncConfig, SyncProgressCallback, WpClient,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the batch, one log line per post.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// Spinner until `on_download_start` tells us how many posts there are.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Fetching");
        bar.set_message("Contacting site…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl SyncProgressCallback for CliProgressCallback {
    fn on_download_start(&self, total_posts: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} posts  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_posts as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Saving");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Downloading {total_posts} posts…"))
        ));
    }

    fn on_post_saved(&self, post_id: u64, path: &Path) {
        self.bar.println(format!(
            "  {} Post {:>6}  {}",
            green("✓"),
            post_id,
            dim(&path.display().to_string()),
        ));
        self.bar.inc(1);
    }

    fn on_post_error(&self, post_id: u64, error: &str) {
        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar
            .println(format!("  {} Post {:>6}  {}", red("✗"), post_id, red(&msg)));
        self.bar.inc(1);
    }

    fn on_download_complete(&self, _total_posts: usize, _saved_count: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Publish a note (creates a draft when the header has no wp_id)
  wpsync --site https://blog.example.com --user editor publish vault/hello.md

  # Publish and record the new wp_id in the note
  wpsync publish --write-back vault/hello.md

  # Show the block markup without contacting the site
  wpsync publish --dry-run vault/hello.md

  # Download one post by id into OldPosts/ of the first mounted vault
  wpsync --vault /mnt/d/Vault --vault ~/Vault download 1234

  # Download the five most recent posts
  wpsync download --count 5

FRONT MATTER:
  wp_id        remote post id; present ⇒ update, absent ⇒ create
  title        default: the file name
  slug         default: the slugified title
  status       draft | publish | pending | private | future
               default: draft on create, publish on update
  description  SEO description; default: start of the body
  categories   a name or a list of names (created when missing)
  tags         a name or a list of names (created when missing)

ENVIRONMENT VARIABLES:
  WPSYNC_SITE           WordPress site URL
  WPSYNC_USER           WordPress user name
  WPSYNC_APP_PASSWORD   Application password for that user
  RUST_LOG              Override the log filter (e.g. wp_vault_sync=debug)

Failures reported by the site are printed and do not change the exit code.
Unreadable files and malformed front matter exit with status 1.
"#;

/// Sync a markdown vault with a WordPress site.
#[derive(Parser, Debug)]
#[command(
    name = "wpsync",
    version,
    about = "Publish markdown notes to WordPress and download posts back",
    long_about = "Publish markdown notes with a YAML header to a WordPress site as \
block-editor posts, and download existing posts back into the vault as markdown.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// WordPress site URL, e.g. https://blog.example.com.
    #[arg(long, global = true, env = "WPSYNC_SITE")]
    site: Option<String>,

    /// WordPress user name.
    #[arg(long, global = true, env = "WPSYNC_USER", default_value = "")]
    user: String,

    /// Application password for the user.
    #[arg(
        long,
        global = true,
        env = "WPSYNC_APP_PASSWORD",
        hide_env_values = true,
        default_value = ""
    )]
    app_password: String,

    /// Vault root to probe; repeat for several, first match wins.
    #[arg(long = "vault", global = true, value_name = "DIR")]
    vaults: Vec<PathBuf>,

    /// Post meta key that receives the SEO description.
    #[arg(long, global = true, env = "WPSYNC_SEO_META_KEY")]
    seo_meta_key: Option<String>,

    /// URL substring that marks a link or iframe as a video; repeatable.
    #[arg(long = "video-pattern", global = true, value_name = "PATTERN")]
    video_patterns: Vec<String>,

    /// Disable progress bar.
    #[arg(long, global = true, env = "WPSYNC_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "WPSYNC_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "WPSYNC_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Publish one markdown document.
    Publish {
        /// Markdown file with an optional YAML header.
        file: PathBuf,

        /// Rewrite the file afterwards with wp_id and uploaded image URLs.
        #[arg(long)]
        write_back: bool,

        /// Convert and print the block markup without contacting the site.
        #[arg(long)]
        dry_run: bool,
    },
    /// Download posts into the vault.
    Download {
        /// Id of the post to download; omit to fetch the most recent ones.
        post_id: Option<u64>,

        /// How many recent posts to fetch when no id is given.
        #[arg(short = 'n', long, default_value_t = 1,
              value_parser = clap::value_parser!(u64).range(1..=100))]
        count: u64,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The download bar replaces INFO-level logs; publishing has no bar.
    let is_download = matches!(cli.command, Command::Download { .. });
    let show_progress = is_download && !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn SyncProgressCallback>)
    } else {
        None
    };

    match &cli.command {
        Command::Publish {
            file,
            write_back,
            dry_run,
        } => {
            let config = build_config(&cli, *write_back, 1, progress_cb)?;
            if *dry_run {
                run_preview(file, &config, cli.quiet)
            } else {
                run_publish(file, &config, cli.quiet).await
            }
        }
        Command::Download { post_id, count } => {
            let config = build_config(&cli, false, *count as usize, progress_cb)?;
            run_download(*post_id, &config, cli.quiet).await
        }
    }
}

/// Map CLI args to `SyncConfig`.
fn build_config(
    cli: &Cli,
    write_back: bool,
    download_count: usize,
    progress: Option<ProgressCallback>,
) -> Result<SyncConfig> {
    let mut builder = SyncConfig::builder()
        .credentials(&cli.user, &cli.app_password)
        .vault_candidates(cli.vaults.clone())
        .download_count(download_count)
        .write_back(write_back);

    if let Some(ref site) = cli.site {
        builder = builder.site_url(site);
    }
    if let Some(ref key) = cli.seo_meta_key {
        builder = builder.seo_meta_key(key);
    }
    if !cli.video_patterns.is_empty() {
        builder = builder.video_patterns(cli.video_patterns.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn run_preview(file: &Path, config: &SyncConfig, quiet: bool) -> Result<()> {
    let preview = preview_file(file, config)
        .with_context(|| format!("Failed to convert {}", file.display()))?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(preview.content.as_bytes())
        .context("Failed to write to stdout")?;
    if !preview.content.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }

    if !quiet {
        let counts = block_counts(&parse_block_markup(&preview.content));
        let summary = counts
            .iter()
            .map(|(name, n)| format!("{name}×{n}"))
            .collect::<Vec<_>>()
            .join(" ");
        eprintln!(
            "{} {}  {}  {}",
            cyan("◆"),
            bold(&preview.title),
            dim(&format!("/{}  {}", preview.slug, preview.status)),
            dim(&summary),
        );
        if !preview.pending_images.is_empty() {
            eprintln!(
                "   {} local images would be uploaded: {}",
                preview.pending_images.len(),
                preview.pending_images.join(", ")
            );
        }
    }
    Ok(())
}

async fn run_publish(file: &Path, config: &SyncConfig, quiet: bool) -> Result<()> {
    let client = WpClient::new(config).context("Cannot create the WordPress client")?;
    let outcome = publish_file(file, &client, config)
        .await
        .with_context(|| format!("Failed to publish {}", file.display()))?;

    if quiet {
        return Ok(());
    }
    match outcome.post_id {
        Some(id) => {
            let verb = match outcome.action {
                PublishAction::Created => "Created",
                PublishAction::Updated => "Updated",
            };
            eprintln!(
                "{} {} post {}  {}  {}",
                green("✔"),
                verb,
                bold(&id.to_string()),
                outcome.title,
                dim(&format!("{} blocks, {}", outcome.block_count, outcome.status)),
            );
            if let Some(ref link) = outcome.link {
                eprintln!("   {}", cyan(link));
            }
            if !outcome.uploaded_media.is_empty() {
                eprintln!("   {} images uploaded", outcome.uploaded_media.len());
            }
            if outcome.written_back {
                eprintln!("   wp_id written to {}", dim(&file.display().to_string()));
            }
        }
        None => eprintln!(
            "{} The site did not accept '{}'; see the log above",
            red("✘"),
            outcome.title
        ),
    }
    Ok(())
}

async fn run_download(post_id: Option<u64>, config: &SyncConfig, quiet: bool) -> Result<()> {
    let client = WpClient::new(config).context("Cannot create the WordPress client")?;
    let dir = resolve_download_dir(&config.vault_candidates)
        .context("Cannot prepare the download directory")?;

    let report: DownloadReport = match post_id {
        Some(id) => download_post(&client, id, &dir, config).await?,
        None => download_recent(&client, config.download_count, &dir, config).await?,
    };

    if quiet {
        return Ok(());
    }
    if report.fetched == 0 {
        eprintln!("{} Nothing downloaded; see the log above", red("✘"));
    } else if report.failed == 0 {
        eprintln!(
            "{} {} posts saved to {}",
            green("✔"),
            bold(&report.saved.len().to_string()),
            dir.display()
        );
    } else {
        eprintln!(
            "{} {}/{} posts saved  ({} failed)",
            cyan("⚠"),
            bold(&report.saved.len().to_string()),
            report.fetched,
            red(&report.failed.to_string()),
        );
    }
    Ok(())
}
