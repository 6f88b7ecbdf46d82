//! `tribute` command-line driver.
//!
//! Reads memorial pages and exercises the engagement tracker against the
//! configured backend (REST when `TRIBUTE_BACKEND_URL` is set, the local
//! SQLite database otherwise).

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::debug;
use tribute_client::memorial::{ImageUpload, MemorialLookup, PhotoDraft, StoryDraft, VideoDraft};
use tribute_client::{ClientConfig, ToggleOutcome, Tribute};
use tribute_shared::format::{
    format_lifespan, format_long_date, format_timestamp, initials, slugify,
};
use tribute_shared::models::Memorial;
use tribute_shared::video::{youtube_embed_url, youtube_thumbnail_url};
use tribute_shared::StoryId;

#[derive(Parser, Debug)]
#[command(name = "tribute")]
#[command(about = "Memorial pages and anonymous story engagement")]
struct Cli {
    /// Directory of the local database (overrides TRIBUTE_DATA_DIR)
    #[arg(long, value_name = "PATH", global = true)]
    data_dir: Option<PathBuf>,

    /// Hosted backend URL (overrides TRIBUTE_BACKEND_URL)
    #[arg(long, value_name = "URL", global = true)]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List public memorials, newest first
    Memorials {
        /// Only memorials whose name, birth place or bio contains this text
        #[arg(long)]
        search: Option<String>,
    },

    /// Show a public memorial, by slug or by name
    Memorial { slug: String },

    /// List the stories of a memorial with like and comment counts
    Stories { slug: String },

    /// Like count of a story and whether this device liked it
    Engagement { story: String },

    /// Re-read like and comment counts of a story
    Refresh { story: String },

    /// Like or unlike a story from this device
    Like { story: String },

    /// List the comments of a story
    Comments { story: String },

    /// Comment on a story
    Comment {
        story: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        content: String,
    },

    /// Share a story on a memorial
    SubmitStory {
        slug: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        content: String,
        /// Date of the remembered event, YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, value_name = "PATH")]
        author_image: Option<PathBuf>,
        /// Story image, repeatable
        #[arg(long = "image", value_name = "PATH")]
        images: Vec<PathBuf>,
    },

    /// List the photo gallery
    Photos { slug: String },

    /// Add a photo to the gallery
    AddPhoto {
        slug: String,
        file: PathBuf,
        #[arg(long)]
        alt: Option<String>,
        #[arg(long)]
        caption: Option<String>,
    },

    /// List the video gallery
    Videos { slug: String },

    /// Add a video link to the gallery
    AddVideo {
        slug: String,
        url: String,
        #[arg(long)]
        title: Option<String>,
    },

    /// Print this device's anonymous identity
    DeviceId,
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

async fn read_image(path: &Path) -> Result<ImageUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();
    Ok(ImageUpload::new(file_name, content_type_for(path), bytes))
}

/// Accepts a slug or a display name; a name is retried as its slug.
async fn require_memorial(client: &Tribute, slug: &str) -> Result<Memorial> {
    let mut lookup = client.pages().load_memorial(slug).await;
    let derived = slugify(slug);
    if matches!(lookup, MemorialLookup::NotFound) && !derived.is_empty() && derived != slug.trim() {
        debug!(slug, derived = %derived, "Retrying lookup by derived slug");
        lookup = client.pages().load_memorial(&derived).await;
    }
    match lookup {
        MemorialLookup::Found(memorial) => Ok(memorial),
        MemorialLookup::NotFound => bail!("Memorial tidak ditemukan: {slug}"),
        MemorialLookup::Failed => bail!("Gagal memuat memorial {slug}"),
    }
}

fn print_memorial(memorial: &Memorial) {
    println!("{}", memorial.name);
    if let Some(span) = format_lifespan(memorial.birth_date, memorial.death_date) {
        println!("  {span}");
    }
    if let Some(place) = &memorial.birth_place {
        match memorial.birth_date {
            Some(date) => println!("  Lahir di {place}, {}", format_long_date(date)),
            None => println!("  Lahir di {place}"),
        }
    }
    if let Some(quote) = &memorial.quote {
        match &memorial.quote_author {
            Some(author) => println!("  \"{quote}\" - {author}"),
            None => println!("  \"{quote}\""),
        }
    }
    if let Some(bio) = &memorial.bio {
        println!("\n{bio}");
    }
    if let Some(likes) = memorial.likes.as_ref().filter(|l| !l.is_empty()) {
        println!("\nYang disukai: {}", likes.join(", "));
    }
    if let Some(dislikes) = memorial.dislikes.as_ref().filter(|l| !l.is_empty()) {
        println!("Yang tidak disukai: {}", dislikes.join(", "));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tribute_client::init_tracing();
    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    if let Some(url) = cli.backend_url {
        config.backend_url = Some(url);
    }
    debug!(?config, "Loaded configuration");

    let offset = config.utc_offset();
    let client = Tribute::open(config)
        .await
        .context("Failed to open client")?;

    match cli.command {
        Command::Memorials { search } => {
            let memorials = client
                .pages()
                .explore(search.as_deref().unwrap_or_default())
                .await;
            if memorials.is_empty() {
                println!("Tidak ada memorial yang ditemukan.");
            }
            for memorial in memorials {
                let span = format_lifespan(memorial.birth_date, memorial.death_date)
                    .map(|s| format!(" ({s})"))
                    .unwrap_or_default();
                println!(
                    "[{}] {}{span}  /{}",
                    initials(&memorial.name),
                    memorial.name,
                    memorial.slug
                );
            }
        }

        Command::Memorial { slug } => {
            let memorial = require_memorial(&client, &slug).await?;
            print_memorial(&memorial);
        }

        Command::Stories { slug } => {
            let memorial = require_memorial(&client, &slug).await?;
            let cards = client.pages().load_stories(&memorial).await;
            if cards.is_empty() {
                println!("Belum ada cerita yang dibagikan.");
            }
            for card in cards {
                let liked = if client.reconciler().is_liked(&card.story.id) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "[{}] {} - {} ({} suka{liked}, {} komentar)",
                    card.story.id, card.display_date, card.story.author, card.likes, card.comments
                );
            }
        }

        Command::Engagement { story } => {
            let story = StoryId::new(&story);
            let engagement = client.reconciler().load_engagement(&story).await;
            println!(
                "{} suka{}",
                engagement.count,
                if engagement.is_liked { " (disukai)" } else { "" }
            );
        }

        Command::Refresh { story } => {
            let counts = client.reconciler().refresh(&StoryId::new(&story)).await;
            println!("{} suka, {} komentar", counts.likes, counts.comments);
        }

        Command::Like { story } => {
            let story = StoryId::new(&story);
            client.reconciler().load_engagement(&story).await;
            match client.reconciler().toggle_like(&story).await? {
                ToggleOutcome::Toggled(engagement) => println!(
                    "{} ({} suka)",
                    if engagement.is_liked { "Disukai" } else { "Batal suka" },
                    engagement.count
                ),
                ToggleOutcome::Busy => println!("Sedang diproses"),
            }
        }

        Command::Comments { story } => {
            let mut thread = client.comment_thread(StoryId::new(&story));
            thread.load().await;
            if thread.load_failed() {
                bail!("Gagal memuat komentar");
            }
            if thread.comments().is_empty() {
                println!("Belum ada komentar.");
            }
            for comment in thread.comments() {
                println!(
                    "{} ({})\n  {}",
                    comment.author,
                    format_timestamp(comment.created_at, offset),
                    comment.content
                );
            }
        }

        Command::Comment {
            story,
            author,
            content,
        } => {
            let mut thread = client.comment_thread(StoryId::new(&story));
            let comment = thread.submit_comment(&author, &content).await?;
            println!("Komentar {} terkirim", comment.id);
        }

        Command::SubmitStory {
            slug,
            author,
            content,
            date,
            author_image,
            images,
        } => {
            let memorial = require_memorial(&client, &slug).await?;
            let author_image = match author_image {
                Some(path) => Some(read_image(&path).await?),
                None => None,
            };
            let mut story_images = Vec::with_capacity(images.len());
            for path in &images {
                story_images.push(read_image(path).await?);
            }

            let draft = StoryDraft {
                author,
                content,
                story_date: date,
                author_image,
                story_images,
            };
            let mut timeline = client.pages().load_stories(&memorial).await;
            let card = client
                .pages()
                .submit_story(&memorial, &draft, &mut timeline)
                .await?;
            let position = timeline
                .iter()
                .position(|c| c.story.id == card.story.id)
                .map_or(0, |i| i + 1);
            println!(
                "Cerita {} diterbitkan ({}), urutan {position} dari {}",
                card.story.id,
                card.display_date,
                timeline.len()
            );
        }

        Command::Photos { slug } => {
            let memorial = require_memorial(&client, &slug).await?;
            for photo in client.pages().photos(&memorial).await {
                println!(
                    "{} {}{}",
                    photo.src,
                    photo.alt.as_deref().unwrap_or_default(),
                    photo
                        .caption
                        .map(|c| format!(" - {c}"))
                        .unwrap_or_default()
                );
            }
        }

        Command::AddPhoto {
            slug,
            file,
            alt,
            caption,
        } => {
            let memorial = require_memorial(&client, &slug).await?;
            let draft = PhotoDraft {
                file: read_image(&file).await?,
                alt,
                caption,
            };
            let photo = client.pages().add_photo(&memorial, &draft).await?;
            println!("Foto ditambahkan: {}", photo.src);
        }

        Command::Videos { slug } => {
            let memorial = require_memorial(&client, &slug).await?;
            for video in client.pages().videos(&memorial).await {
                let link = youtube_embed_url(&video.url).unwrap_or_else(|| video.url.clone());
                println!("{} {}", video.title.as_deref().unwrap_or_default(), link);
                if let Some(thumbnail) = youtube_thumbnail_url(&video.url) {
                    println!("  {thumbnail}");
                }
            }
        }

        Command::AddVideo { slug, url, title } => {
            let memorial = require_memorial(&client, &slug).await?;
            let video = client
                .pages()
                .add_video(&memorial, &VideoDraft { url, title })
                .await?;
            println!("Video ditambahkan: {}", video.url);
        }

        Command::DeviceId => println!("{}", client.device_id()),
    }

    Ok(())
}
