use clap::{Args, Parser, Subcommand};
use futures::StreamExt;
use photomagic::{
    logger::{self, LogLevel, LoggerConfig},
    models::{AgeGroup, ArtStyle, Character, CoverStyle, Ethnicity, ImageData, StickerStyle, Theme},
    pipeline::{progress::TICK_INTERVAL, BatchEvent, BatchPipeline, ImagePipeline, ProgressTicker},
    puzzle::{PuzzleSource, DEFAULT_GRID_SIZE},
    shell::{AppView, FunZoneTab, Navigation, Shell, FEATURE_CARDS},
    store::{credential::mask_key, AuthService, CredentialStore, FileStore, KeyValueStore, SystemClock, UsageLimiter},
    wizard::{coloring::DEFAULT_PAGE_COUNT, download_name, Wizard},
    ColoringBook, Config, FeatureKind, GeminiClient, PhotoMagic, PuzzleGame, StickerMaker, StoryCreator,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(name = "photomagic", version, about = "Turn a child's photo into magical pictures, storybooks and puzzles")]
struct Cli {
    /// Enable debug logging. Env: PMK_DEBUG
    #[arg(long, env = "PMK_DEBUG")]
    debug: bool,

    /// Emit logs as JSON lines. Env: PMK_LOG_JSON
    #[arg(long, env = "PMK_LOG_JSON")]
    json_logs: bool,

    /// Also append logs to this file.
    #[arg(long)]
    log_file: Option<String>,

    /// Overrides PMK_STORE_PATH.
    #[arg(long)]
    store: Option<PathBuf>,

    /// Where generated pictures are saved.
    #[arg(long, short, default_value = "magic-out")]
    out_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the Gemini API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
    /// Create a local account and sign in
    Signup {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Whoami,
    /// Today's generation count against the daily limit
    Usage,
    /// Put your child in a scene with a favourite character
    Photo(PhotoArgs),
    /// Write and illustrate a storybook
    Story(StoryArgs),
    /// Draw a coloring book with a cover
    Coloring(ColoringArgs),
    /// Make an avatar sticker
    Sticker(StickerArgs),
    /// Play the sliding picture puzzle
    Puzzle(PuzzleArgs),
    /// Show the studio's sections and which ones are unlocked
    Views,
}

#[derive(Subcommand, Debug)]
enum KeyAction {
    /// Save a key, probing the API first unless --no-validate is given
    Set {
        key: String,
        #[arg(long)]
        no_validate: bool,
    },
    Clear,
    Show,
    /// Probe the API with a key (the saved one by default) without saving it
    Validate { key: Option<String> },
}

#[derive(Args, Debug)]
struct PhotoArgs {
    photo: PathBuf,
    #[arg(long, default_value = "christmas")]
    theme: Theme,
    #[arg(long, default_value = "santa")]
    character: Character,
    #[arg(long, default_value = "classic")]
    ethnicity: Ethnicity,
    #[arg(long, default_value = "realistic")]
    style: ArtStyle,
    #[arg(long, default_value = "")]
    notes: String,
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct StoryArgs {
    photo: PathBuf,
    #[arg(long)]
    name: String,
    #[arg(long)]
    theme: String,
    #[arg(long, default_value = "preschool")]
    age: AgeGroup,
    /// Outfit and hair notes
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    skin_tone: String,
    #[arg(long, default_value = "colorful")]
    cover: CoverStyle,
}

#[derive(Args, Debug)]
struct ColoringArgs {
    photo: PathBuf,
    #[arg(long)]
    theme: String,
    #[arg(long, default_value = "")]
    name: String,
    #[arg(long, default_value = "preschool")]
    age: AgeGroup,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value_t = DEFAULT_PAGE_COUNT)]
    pages: usize,
}

#[derive(Args, Debug)]
struct StickerArgs {
    photo: Option<PathBuf>,
    #[arg(long, default_value = "3d-avatar")]
    style: StickerStyle,
    #[arg(long, default_value = "")]
    theme: String,
    #[arg(long, default_value = "")]
    notes: String,
}

#[derive(Args, Debug)]
struct PuzzleArgs {
    /// Picture to slice up; the sample picture is used when omitted
    image: Option<PathBuf>,
    #[arg(long, default_value_t = DEFAULT_GRID_SIZE)]
    size: usize,
    /// Comma-separated tile positions (1-based) to click instead of reading stdin
    #[arg(long)]
    moves: Option<String>,
    #[arg(long)]
    seed: Option<u64>,
}

struct Studio {
    config: Config,
    store: Arc<dyn KeyValueStore>,
    credentials: CredentialStore,
    client: Arc<GeminiClient>,
    out_dir: PathBuf,
}

impl Studio {
    fn open(config: Config, out_dir: PathBuf) -> CliResult<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.store_path)?);
        let credentials =
            CredentialStore::new(store.clone()).with_fallback(config.default_api_key.clone());
        let client = Arc::new(GeminiClient::new(&config.gemini)?);
        Ok(Self {
            config,
            store,
            credentials,
            client,
            out_dir,
        })
    }

    fn usage(&self) -> Option<UsageLimiter> {
        self.config
            .daily_limit
            .map(|limit| UsageLimiter::new(self.store.clone(), Arc::new(SystemClock), limit))
    }

    fn pipeline(&self) -> ImagePipeline {
        let pipeline = ImagePipeline::new(self.client.clone(), self.credentials.clone());
        match self.usage() {
            Some(usage) => pipeline.with_usage_limit(usage),
            None => pipeline,
        }
    }

    /// Opens `view` through the shell, refusing when no key is configured.
    fn enter(&self, view: AppView) -> CliResult<()> {
        let mut shell = Shell::new(self.credentials.clone());
        Self::opened(shell.navigate(view))
    }

    fn enter_fun_zone(&self, tab: FunZoneTab) -> CliResult<()> {
        let mut shell = Shell::new(self.credentials.clone());
        Self::opened(shell.open_fun_zone(tab))
    }

    fn opened(navigation: Navigation) -> CliResult<()> {
        match navigation {
            Navigation::Opened(_) => Ok(()),
            Navigation::SettingsRequired(view) => {
                eprintln!("🔒 {} needs a Gemini API key. Run `photomagic key set <KEY>` first.", view);
                Err(photomagic::MagicError::MissingCredential.into())
            }
        }
    }

    fn save(&self, image: &ImageData, name: &str) -> CliResult<PathBuf> {
        std::fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(name);
        image.save(&path)?;
        println!("💾 Saved {}", path.display());
        Ok(path)
    }
}

/// Shows a simulated progress bar while `fut` runs.
async fn with_progress<F: Future>(label: &str, fut: F) -> F::Output {
    let mut ticker = ProgressTicker::new();
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    tokio::pin!(fut);
    loop {
        tokio::select! {
            out = &mut fut => {
                eprintln!("\r{} {:>3}%", label, ticker.finish());
                return out;
            }
            _ = interval.tick() => {
                eprint!("\r{} {:>3}%", label, ticker.tick());
                let _ = std::io::stderr().flush();
            }
        }
    }
}

/// Prints batch events as they arrive and cancels the batch on Ctrl-C.
fn watch_batch(batch: BatchPipeline) -> (BatchPipeline, tokio::task::JoinHandle<()>) {
    let (batch, mut events) = batch.with_events();
    let cancel = batch.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n✋ Stopping after the current page...");
            cancel.cancel();
        }
    });
    let printer = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            match event {
                BatchEvent::PageStarted { position, total, label, .. } => {
                    println!("[{}/{}] {}", position, total, label)
                }
                BatchEvent::PageDone { index } => log::debug!("Page {} done", index),
                BatchEvent::PageSkipped { index } => println!("Page {} already drawn, skipping", index),
                BatchEvent::Failed { message, .. } => println!("😢 {}", message),
                BatchEvent::Cancelled { index } => println!("Stopped before page {}", index),
                BatchEvent::Finished { generated } => println!("✨ {} pictures ready", generated),
            }
        }
    });
    (batch, printer)
}

fn report_failure<W: Wizard>(wizard: &W, error: photomagic::MagicError) -> Box<dyn std::error::Error> {
    if let Some(message) = wizard.error() {
        eprintln!("😢 {}", message);
    }
    error.into()
}

async fn run_key(studio: &Studio, action: KeyAction) -> CliResult<()> {
    match action {
        KeyAction::Set { key, no_validate } => {
            if no_validate {
                studio.credentials.set(&key)?;
            } else if !studio
                .credentials
                .save_validated(studio.client.as_ref(), &key)
                .await?
            {
                return Err("That key was rejected by the API; nothing was saved".into());
            }
            println!("🔑 Key saved. Every section is unlocked!");
        }
        KeyAction::Clear => {
            studio.credentials.clear()?;
            println!("Key removed.");
        }
        KeyAction::Show => match studio.credentials.get()? {
            Some(key) => println!("{}", mask_key(&key)),
            None => println!("No key configured."),
        },
        KeyAction::Validate { key } => {
            let key = match key {
                Some(key) => key,
                None => studio.credentials.require()?,
            };
            if studio.credentials.validate(studio.client.as_ref(), &key).await {
                println!("✅ Key works");
            } else {
                return Err("Key was rejected".into());
            }
        }
    }
    Ok(())
}

async fn run_photo(studio: &Studio, args: PhotoArgs) -> CliResult<()> {
    studio.enter(AppView::PhotoMagic)?;
    let mut wizard = PhotoMagic::new();
    wizard.upload(ImageData::from_file(&args.photo)?)?;
    wizard.select_theme(args.theme)?;
    wizard.settings.character = args.character;
    wizard.settings.ethnicity = args.ethnicity;
    wizard.settings.style = args.style;
    wizard.settings.custom_notes = args.notes;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let pipeline = studio.pipeline();
    let outcome = with_progress("🪄 Mixing the magic", wizard.generate(&pipeline, &mut rng)).await;
    let image = match outcome {
        Ok(image) => image.clone(),
        Err(e) => return Err(report_failure(&wizard, e)),
    };
    studio.save(&image, &download_name(FeatureKind::Photo, 0))?;
    Ok(())
}

async fn run_story(studio: &Studio, args: StoryArgs) -> CliResult<()> {
    studio.enter(AppView::StoryCreator)?;
    let mut wizard = StoryCreator::new();
    wizard.upload(ImageData::from_file(&args.photo)?)?;
    wizard.settings.child_name = args.name;
    wizard.settings.theme = args.theme;
    wizard.settings.age_group = args.age;
    wizard.settings.child_description = args.description;
    wizard.settings.skin_tone = args.skin_tone;
    wizard.settings.cover_style = args.cover;

    let (batch, printer) = watch_batch(BatchPipeline::new(studio.pipeline()));
    let outcome = wizard.generate(&batch).await;
    drop(batch);
    printer.await?;

    for (i, page) in wizard.pages().iter().enumerate() {
        println!("\n📖 Page {}\n{}", i + 1, page.text);
        if let Some(image) = &page.image {
            studio.save(image, &download_name(FeatureKind::Story, i))?;
        }
    }
    if !wizard.pages().is_empty() {
        std::fs::create_dir_all(&studio.out_dir)?;
        let path = studio.out_dir.join("story.json");
        std::fs::write(&path, serde_json::to_string_pretty(wizard.pages())?)?;
        println!("💾 Saved {}", path.display());
    }
    outcome.map_err(|e| report_failure(&wizard, e))
}

async fn run_coloring(studio: &Studio, args: ColoringArgs) -> CliResult<()> {
    studio.enter(AppView::ColoringBook)?;
    let mut wizard = ColoringBook::new();
    wizard.upload(ImageData::from_file(&args.photo)?)?;
    wizard.settings.theme = args.theme;
    wizard.settings.child_name = args.name;
    wizard.settings.age_group = args.age;
    wizard.settings.child_description = args.description;
    wizard.settings.page_count = args.pages;

    let (batch, printer) = watch_batch(BatchPipeline::new(studio.pipeline()));
    let outcome = wizard.generate(&batch).await;
    drop(batch);
    printer.await?;

    match outcome {
        Ok(()) => {
            for (i, page) in wizard.pages().iter().enumerate() {
                studio.save(page, &ColoringBook::download_name(i))?;
            }
            Ok(())
        }
        Err(e) => {
            for (i, page) in wizard.partial_pages().iter().enumerate() {
                if let Some(page) = page {
                    studio.save(page, &ColoringBook::download_name(i))?;
                }
            }
            Err(report_failure(&wizard, e))
        }
    }
}

async fn run_sticker(studio: &Studio, args: StickerArgs) -> CliResult<()> {
    studio.enter_fun_zone(FunZoneTab::Stickers)?;
    let mut maker = StickerMaker::new();
    if let Some(path) = &args.photo {
        maker.set_photo(ImageData::from_file(path)?)?;
    }
    maker.style = args.style;
    maker.theme = args.theme;
    maker.appearance_notes = args.notes;

    let pipeline = studio.pipeline();
    let outcome = with_progress("🎨 Printing your sticker", maker.generate(&pipeline)).await;
    let image = match outcome {
        Ok(image) => image.clone(),
        Err(e) => return Err(report_failure(&maker, e)),
    };
    studio.save(&image, &StickerMaker::download_name())?;
    Ok(())
}

fn parse_position(raw: &str, cells: usize) -> Option<usize> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|p| (1..=cells).contains(p))
        .map(|p| p - 1)
}

fn announce_if_solved(game: &PuzzleGame) -> bool {
    match game.puzzle() {
        Some(puzzle) if puzzle.is_solved() => {
            println!("🎉 You did it in {} moves!", puzzle.moves());
            true
        }
        _ => false,
    }
}

async fn run_puzzle(studio: &Studio, args: PuzzleArgs) -> CliResult<()> {
    studio.enter_fun_zone(FunZoneTab::Puzzle)?;
    let source = match &args.image {
        Some(path) => PuzzleSource::Upload(ImageData::from_file(path)?),
        None => PuzzleSource::sample(),
    };
    log::debug!("Puzzle store at {}", studio.config.store_path.display());
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut game = PuzzleGame::new().with_size(args.size);
    game.start(source, &mut rng)?;
    let cells = args.size * args.size;
    let board = |game: &PuzzleGame| game.puzzle().map(|p| p.render()).unwrap_or_default();
    println!("{}\n", board(&game));

    if let Some(moves) = &args.moves {
        for raw in moves.split(',') {
            match parse_position(raw, cells) {
                Some(index) => {
                    game.click(index);
                }
                None => eprintln!("Skipping '{}'", raw.trim()),
            }
            if announce_if_solved(&game) {
                break;
            }
        }
        println!("{}", board(&game));
        return Ok(());
    }

    println!("Type a tile position (1-{}) to slide it, `s` to reshuffle, `q` to quit.", cells);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "q" => break,
            "s" => {
                game.shuffle(&mut rng);
            }
            raw => match parse_position(raw, cells) {
                Some(index) if game.click(index) => {}
                _ => println!("That tile can't move."),
            },
        }
        println!("{}\n", board(&game));
        if announce_if_solved(&game) {
            println!("Press `s` for a new game or `q` to quit.");
        }
    }
    Ok(())
}

fn run_views(studio: &Studio) {
    let shell = Shell::new(studio.credentials.clone());
    println!("{}\n", shell.render_nav());
    for card in FEATURE_CARDS {
        println!("{} {} - {}", card.icon, card.title, card.description);
    }
}

fn print_usage(studio: &Studio) -> CliResult<()> {
    match studio.usage() {
        Some(usage) => println!(
            "{} of {} creations used today ({} left)",
            usage.used_today()?,
            usage.limit(),
            usage.remaining()?
        ),
        None => println!("No daily limit configured."),
    }
    Ok(())
}

fn logger_config(cli: &Cli) -> LoggerConfig {
    let mut config = if cli.debug {
        LoggerConfig::development()
    } else {
        LoggerConfig::new().with_level(LogLevel::Warn)
    };
    config = config.with_json_output(cli.json_logs);
    if let Some(path) = &cli.log_file {
        config = config.with_file_output(path);
    }
    config
}

fn ensure_parent(path: &Path) -> CliResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let cli = Cli::parse();
    logger::init_with_config(logger_config(&cli))?;
    if !dotenv_loaded {
        log::debug!("No .env file found, using system environment variables");
    }

    let mut config = Config::from_env();
    if let Some(path) = &cli.store {
        config = config.with_store_path(path.clone());
    }
    ensure_parent(&config.store_path)?;
    logger::log_config_info(&config);

    let studio = Studio::open(config, cli.out_dir.clone())?;
    let auth = AuthService::new(studio.store.clone());

    match cli.command {
        Command::Key { action } => run_key(&studio, action).await?,
        Command::Signup { name, email, password } => {
            let user = auth.signup(&name, &email, &password)?;
            println!("👋 Welcome, {}!", if user.name.is_empty() { &user.email } else { &user.name });
        }
        Command::Login { email, password } => {
            let user = auth.login(&email, &password)?;
            println!("👋 Welcome back, {}!", user.email);
        }
        Command::Logout => {
            auth.logout()?;
            println!("Signed out.");
        }
        Command::Whoami => match auth.current_user()? {
            Some(user) => println!("{} <{}>", user.name, user.email),
            None => println!("Not signed in."),
        },
        Command::Usage => print_usage(&studio)?,
        Command::Photo(args) => run_photo(&studio, args).await?,
        Command::Story(args) => run_story(&studio, args).await?,
        Command::Coloring(args) => run_coloring(&studio, args).await?,
        Command::Sticker(args) => run_sticker(&studio, args).await?,
        Command::Puzzle(args) => run_puzzle(&studio, args).await?,
        Command::Views => run_views(&studio),
    }
    Ok(())
}
