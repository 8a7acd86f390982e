use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use scripture_reader::chapter::cache::ChapterCache;
use scripture_reader::chapter::source::{BollsClient, DEFAULT_BOLLS_URL};
use scripture_reader::chapter::storage::FileStorage;
use scripture_reader::chapter::translation::{SUPPORTED_TRANSLATIONS, TranslationSettings};
use scripture_reader::definition::types::WordDefinition;
use scripture_reader::reference::books::{book_name, format_verse_ref};
use scripture_reader::search::types::SearchResponse;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reader", about = "Read chapters, search and look up words")]
struct Cli {
    /// Base URL of the scripture server.
    #[arg(long, env = "READER_API_URL", default_value = "http://127.0.0.1:3000")]
    api_url: String,

    /// Directory holding cached chapters and preferences.
    #[arg(long, env = "READER_CACHE_DIR", default_value = ".reader-cache")]
    cache_dir: PathBuf,

    #[arg(long, env = "BOLLS_BASE_URL", default_value = DEFAULT_BOLLS_URL)]
    bolls_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print one chapter, from the local cache when possible.
    Chapter {
        translation: String,
        book: u32,
        chapter: u32,
        /// Always fetch from the remote API.
        #[arg(long)]
        no_cache: bool,
    },
    /// Search by reference ("ин 3:16") or text.
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Look up a word in the context of a verse.
    Word {
        word: String,
        verse_ref: String,
        context: Option<String>,
    },
    /// Inspect or clean the chapter cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Show or change the preferred translation.
    Translation {
        code: Option<String>,
        #[arg(long)]
        url_param: Option<String>,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    Stats,
    Clear,
    ClearExpired,
}

struct Reader {
    api_url: String,
    http: reqwest::Client,
    cache: ChapterCache,
    translations: TranslationSettings,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let storage = Arc::new(
        FileStorage::open(&cli.cache_dir)
            .with_context(|| format!("cannot open cache dir {}", cli.cache_dir.display()))?,
    );
    let reader = Reader {
        api_url: normalize_url(&cli.api_url),
        http: reqwest::Client::new(),
        cache: ChapterCache::new(storage.clone(), Arc::new(BollsClient::new(&cli.bolls_url))),
        translations: TranslationSettings::new(storage),
    };

    match cli.command {
        Command::Chapter {
            translation,
            book,
            chapter,
            no_cache,
        } => reader.chapter(&translation, book, chapter, no_cache).await,
        Command::Search { query } => reader.search(&query.join(" ")).await,
        Command::Word {
            word,
            verse_ref,
            context,
        } => reader.word(&word, &verse_ref, context.as_deref()).await,
        Command::Cache { action } => reader.cache(action),
        Command::Translation { code, url_param } => {
            reader.translation(code.as_deref(), url_param.as_deref())
        }
    }
}

fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let normalized = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };
    normalized.trim_end_matches('/').to_string()
}

/// Turns a non-success response into an error carrying the server's message.
async fn expect_success(resp: reqwest::Response) -> anyhow::Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.json::<Value>().await.unwrap_or(Value::Null);
    let message = body["message"]
        .as_str()
        .or_else(|| body["error"].as_str())
        .unwrap_or("no details");
    bail!("server returned {}: {}", status, message)
}

impl Reader {
    async fn chapter(
        &self,
        translation: &str,
        book: u32,
        chapter: u32,
        no_cache: bool,
    ) -> anyhow::Result<()> {
        let (verses, stale) = if no_cache {
            let verses = self.cache.get_chapter(translation, book, chapter, false).await?;
            (verses, false)
        } else {
            let read = self.cache.get_chapter_or_stale(translation, book, chapter).await?;
            (read.verses, read.stale)
        };

        if verses.is_empty() {
            let name = book_name(book)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Book {}", book));
            bail!("{} {} has no verses in {}", name, chapter, translation);
        }
        if stale {
            println!("(offline: showing an out-of-date cached copy)");
        }
        for verse in verses {
            println!("{:>3} {}", verse.verse, verse.text);
        }
        Ok(())
    }

    async fn search(&self, query: &str) -> anyhow::Result<()> {
        let resp = self
            .http
            .get(format!(
                "{}/api/search?q={}",
                self.api_url,
                urlencoding::encode(query)
            ))
            .send()
            .await
            .context("search request failed")?;
        let response: SearchResponse = expect_success(resp).await?.json().await?;

        if let Some(message) = &response.message {
            println!("{}", message);
        }
        for hit in &response.results {
            let text = hit.highlight.as_deref().unwrap_or(&hit.verse.text);
            println!(
                "{}  {}",
                format_verse_ref(hit.verse.book, hit.verse.chapter, hit.verse.verse),
                text
            );
        }
        if let Some(total) = response.total
            && total > response.results.len()
        {
            println!("... {} of {} shown", response.results.len(), total);
        }
        Ok(())
    }

    async fn word(
        &self,
        word: &str,
        verse_ref: &str,
        context: Option<&str>,
    ) -> anyhow::Result<()> {
        let body = json!({
            "word": word,
            "verseRef": verse_ref,
            "verseContext": context.unwrap_or_default(),
        });
        let resp = self
            .http
            .post(format!("{}/api/word", self.api_url))
            .json(&body)
            .send()
            .await
            .context("word request failed")?;
        let definition: WordDefinition = expect_success(resp).await?.json().await?;

        let original = &definition.greek_hebrew;
        println!("{} ({})", definition.word, definition.verse_ref);
        println!(
            "  {} [{}] {}  root: {}",
            original.word, original.transliteration, original.strongs_number, original.root
        );
        println!("  literally: {}", original.literal_meaning);
        println!();
        println!("{}", definition.explanations.basic);
        println!();
        println!("{}", definition.explanations.intermediate);
        Ok(())
    }

    fn cache(&self, action: CacheAction) -> anyhow::Result<()> {
        match action {
            CacheAction::Stats => {
                let stats = self.cache.get_stats();
                println!("{}", serde_json::to_string_pretty(&stats)?);
            }
            CacheAction::Clear => println!("Removed {} chapters", self.cache.clear_all()),
            CacheAction::ClearExpired => {
                println!("Removed {} expired chapters", self.cache.clear_expired())
            }
        }
        Ok(())
    }

    fn translation(&self, code: Option<&str>, url_param: Option<&str>) -> anyhow::Result<()> {
        if let Some(code) = code {
            let Some(translation) = self.translations.switch(code, &self.cache) else {
                let supported: Vec<_> = SUPPORTED_TRANSLATIONS.iter().map(|t| t.code).collect();
                bail!(
                    "unsupported translation {:?} (supported: {})",
                    code,
                    supported.join(", ")
                );
            };
            println!("Translation set to {}", translation.name);
            return Ok(());
        }

        let current = self.translations.current(url_param);
        for translation in SUPPORTED_TRANSLATIONS.iter() {
            let marker = if translation.code == current.code { "*" } else { " " };
            println!("{} {:<5} {}", marker, translation.code, translation.name);
        }
        Ok(())
    }
}
