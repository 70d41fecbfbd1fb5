use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

use book_tower::app::state::Shelf;
use book_tower::app::{SessionEvent, TowerController};
use book_tower::catalog::{CatalogLookup, SearchQuery, StaticCatalog};
use book_tower::config::TowerConfig;
use book_tower::domain::palette::{ColorPicker, PalettePicker, RandomRgbPicker};
use book_tower::domain::tower::{StackOrder, TowerLayout};
use book_tower::recommend::{
    DEFAULT_RECOMMENDATIONS, RecommendRequest, Recommender, StaticRecommender,
};
use book_tower::ui::TowerRenderer;

#[derive(Parser)]
#[command(name = "book-tower")]
#[command(about = "Stack the books you've read into a tower picture")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON file with tower settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print the placed books of a shelf file as JSON
    Layout {
        /// JSON array of {title, pages, color}
        books: PathBuf,
        #[command(flatten)]
        tower: TowerArgs,
    },
    /// Render a shelf file to PNG
    Render {
        books: PathBuf,
        /// Output image
        #[arg(short, long, default_value = "tower.png")]
        output: PathBuf,
        #[command(flatten)]
        tower: TowerArgs,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// List catalog candidates for a title
    Search {
        /// JSON catalog file
        catalog: PathBuf,
        title: String,
        #[arg(long)]
        author: Option<String>,
    },
    /// Suggest books for a keyword from a reading list
    Recommend {
        /// JSON array of {title, author, reason, keywords}
        library: PathBuf,
        keyword: String,
        /// Number of books to suggest
        #[arg(long, default_value_t = DEFAULT_RECOMMENDATIONS)]
        count: usize,
    },
    /// Interactive session reading commands from stdin
    Session {
        catalog: PathBuf,
        /// Image rewritten after every command
        #[arg(short, long, default_value = "tower.png")]
        output: PathBuf,
        #[command(flatten)]
        tower: TowerArgs,
        #[command(flatten)]
        render: RenderArgs,
    },
}

#[derive(Args)]
struct TowerArgs {
    /// Put the most recently added book at the bottom
    #[arg(long)]
    newest_at_bottom: bool,

    /// Assign colors from the whole RGB range instead of the palette
    #[arg(long)]
    random_rgb: bool,

    /// Seed for color assignment
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct RenderArgs {
    /// TrueType/OpenType font used for spine labels
    #[arg(long)]
    font: Option<PathBuf>,

    /// Pixels per layout unit. Overrides the config value.
    #[arg(long)]
    scale: Option<f32>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(if cli.debug { "debug" } else { "info" })
            }),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let config = match &cli.config {
        Some(path) => TowerConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TowerConfig::default(),
    };

    match cli.command {
        Command::Layout { books, tower } => {
            let config = apply_tower_args(config, &tower);
            let shelf = load_shelf(&books, &config, &tower)?;
            let layout = TowerLayout::compute(shelf.books(), &config);
            println!("{}", serde_json::to_string_pretty(&layout)?);
        }
        Command::Render {
            books,
            output,
            tower,
            render,
        } => {
            let config = apply_render_args(apply_tower_args(config, &tower), &render);
            let shelf = load_shelf(&books, &config, &tower)?;
            let renderer = build_renderer(&render)?;
            let layout = TowerLayout::compute(shelf.books(), &config);
            draw(&renderer, &layout, &config, &output)?;
        }
        Command::Search {
            catalog,
            title,
            author,
        } => {
            let catalog = StaticCatalog::load(&catalog);
            let mut query = SearchQuery::new(title);
            if let Some(author) = author {
                query = query.with_author(author);
            }
            let hits = catalog.search(&query);
            if hits.is_empty() {
                println!("No books found for '{}'", query.to_query_string());
            }
            for (position, hit) in hits.iter().enumerate() {
                println!("{}. {}", position + 1, describe(hit));
            }
        }
        Command::Recommend {
            library,
            keyword,
            count,
        } => match RecommendRequest::new(&keyword) {
            Ok(request) => {
                let request = request.with_count(count);
                let picks = StaticRecommender::load(&library).recommend(&request);
                if picks.is_empty() {
                    println!("No recommendations for '{}'", request.keyword());
                }
                for (position, book) in picks.iter().enumerate() {
                    println!("{}", describe_recommendation(position, book));
                }
            }
            Err(err) => {
                warn!(%err, "recommendation skipped");
                println!("{err}");
            }
        },
        Command::Session {
            catalog,
            output,
            tower,
            render,
        } => {
            let config = apply_render_args(apply_tower_args(config, &tower), &render);
            let renderer = build_renderer(&render)?;
            let picker = build_picker(&config, &tower);
            let controller = TowerController::new(StaticCatalog::load(&catalog), picker, config);
            run_session(controller, &renderer, &output)?;
        }
    }

    Ok(())
}

fn apply_tower_args(mut config: TowerConfig, args: &TowerArgs) -> TowerConfig {
    if args.newest_at_bottom {
        config.order = StackOrder::Reverse;
    }
    config.sanitized()
}

fn apply_render_args(mut config: TowerConfig, args: &RenderArgs) -> TowerConfig {
    if let Some(scale) = args.scale {
        config.pixels_per_unit = scale;
    }
    config.sanitized()
}

fn build_picker(config: &TowerConfig, args: &TowerArgs) -> Box<dyn ColorPicker> {
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if args.random_rgb {
        Box::new(RandomRgbPicker::new(rng))
    } else {
        Box::new(PalettePicker::new(config.palette_colors(), rng))
    }
}

fn build_renderer(args: &RenderArgs) -> Result<TowerRenderer> {
    match &args.font {
        Some(path) => Ok(TowerRenderer::new().with_font_file(path)?),
        None => {
            warn!("No --font given, spines will be drawn without labels");
            Ok(TowerRenderer::new())
        }
    }
}

fn load_shelf(path: &Path, config: &TowerConfig, args: &TowerArgs) -> Result<Shelf> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read shelf file {}", path.display()))?;
    let mut picker = build_picker(config, args);
    let shelf = Shelf::from_json_str(&json, &mut picker)
        .with_context(|| format!("Invalid shelf file {}", path.display()))?;
    info!(books = shelf.len(), "loaded shelf");
    Ok(shelf)
}

fn draw(renderer: &TowerRenderer, layout: &TowerLayout, config: &TowerConfig, output: &Path) -> Result<()> {
    if renderer.render_to_file(layout, config.pixels_per_unit, output)? {
        info!(
            books = layout.len(),
            path = %output.display(),
            "wrote tower image"
        );
    } else {
        info!(path = %output.display(), "Shelf is empty, no image kept");
    }
    Ok(())
}

fn describe(book: &book_tower::catalog::CandidateBook) -> String {
    let mut line = format!("{} / {}", book.title, book.author);
    if !book.publisher.is_empty() {
        line.push_str(&format!(" / {}", book.publisher));
    }
    if let Some(pages) = book.pages {
        line.push_str(&format!(" ({pages} pages)"));
    }
    line
}

fn describe_recommendation(position: usize, book: &book_tower::recommend::Recommendation) -> String {
    if book.author.is_empty() {
        format!("{}. {}: {}", position + 1, book.title, book.reason)
    } else {
        format!("{}. {} / {}: {}", position + 1, book.title, book.author, book.reason)
    }
}

/// Parses one session command line
///
/// `search <title> [| <author>]`, `pick <n>` (1-based), `reset`, `show`.
fn parse_command(line: &str) -> Option<SessionEvent> {
    let line = line.trim();
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));

    match verb {
        "search" => {
            let (title, author) = rest.split_once('|').unwrap_or((rest, ""));
            Some(SessionEvent::Search(SearchQuery::new(title.trim()).with_author(author.trim())))
        }
        "pick" => rest
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .map(SessionEvent::Pick),
        "reset" => Some(SessionEvent::Reset),
        "show" => Some(SessionEvent::Refresh),
        _ => None,
    }
}

fn run_session<C: CatalogLookup>(
    mut controller: TowerController<C, Box<dyn ColorPicker>>,
    renderer: &TowerRenderer,
    output: &Path,
) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout, "Commands: search <title> [| author], pick <n>, reset, show, quit")?;

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read command")?;
        if matches!(line.trim(), "quit" | "exit") {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let Some(event) = parse_command(&line) else {
            writeln!(stdout, "Unknown command: {}", line.trim())?;
            continue;
        };

        match controller.handle(event) {
            Ok(layout) => draw(renderer, &layout, controller.config(), output)?,
            Err(err) => writeln!(stdout, "{err}")?,
        }

        let candidates = controller.candidates();
        for (position, candidate) in candidates.iter().enumerate() {
            writeln!(stdout, "{}. {}", position + 1, describe(candidate))?;
        }
        writeln!(stdout, "Shelf: {} book(s)", controller.shelf().len())?;
    }

    Ok(())
}
