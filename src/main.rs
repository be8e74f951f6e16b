use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use lineup::apis::EventQuery;
use lineup::app::ports::EventsApiPort;
use lineup::app::{display, GetEventsUseCase, PreferencesStore};
use lineup::config::AppConfig;
use lineup::constants::{DEFAULT_IMAGE_RATIO, DEFAULT_MIN_IMAGE_WIDTH};
use lineup::controllers::{
    AppController, DiscoverCategory, DiscoverController, DiscoverSettings, EventListController,
    FilterController, SavedController, SearchController,
};
use lineup::domain::{
    DistanceUnit, Event, GeoPoint, LocationPreference, Resource, SortOption, SortType,
};
use lineup::infra::{HttpEventsApi, SqliteDatabase, SqliteKeyValueStore, SqliteSavedEventsStore};
use lineup::logging;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Parser)]
#[command(name = "lineup")]
#[command(about = "Browse, filter and save live events from the terminal")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./lineup.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show distances in kilometers instead of miles
    #[arg(long, global = true)]
    km: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the discover feeds
    Discover,
    /// List events matching the stored filters
    List {
        #[arg(long)]
        keyword: Option<String>,
        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Show one event
    Event { id: String },
    /// Save an event
    Save { id: String },
    /// Remove a saved event
    Unsave { id: String },
    /// Show saved events
    Saved,
    /// Inspect or change filter preferences
    Filter {
        #[command(subcommand)]
        command: FilterCommand,
    },
    /// Search events by keyword and remember the query
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Show recent searches
    History {
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Subcommand)]
enum FilterCommand {
    /// Print the current selections
    Show,
    /// Select a segment by name (e.g. "Music")
    Segment { name: String },
    /// Add a genre of the selected segment
    Genre { name: String },
    /// Add a subgenre of the selected genres
    Subgenre { name: String },
    /// Reset segment, genres and subgenres
    Clear,
    /// Sort by relevance, date, distance or name
    Sort {
        option: SortOption,
        #[arg(long)]
        desc: bool,
    },
    /// Search radius; "none" removes it
    Radius { value: String },
    /// Location used for geo search and distances
    Location {
        latitude: f64,
        longitude: f64,
        #[arg(long)]
        label: Option<String>,
    },
}

struct Services {
    config: AppConfig,
    preferences: Arc<PreferencesStore>,
    saved_store: Arc<SqliteSavedEventsStore>,
    app: AppController,
}

impl Services {
    fn open(config: AppConfig) -> anyhow::Result<Self> {
        let db = SqliteDatabase::open(&config.storage.database_path).with_context(|| {
            format!(
                "opening database {}",
                config.storage.database_path.display()
            )
        })?;
        let preferences = Arc::new(PreferencesStore::new(Arc::new(SqliteKeyValueStore::new(
            db.clone(),
        ))));
        let saved_store = Arc::new(SqliteSavedEventsStore::new(db)?);
        let app = AppController::new(saved_store.clone(), preferences.clone());
        Ok(Self {
            config,
            preferences,
            saved_store,
            app,
        })
    }

    fn use_case(&self) -> anyhow::Result<GetEventsUseCase> {
        self.config.require_api_key()?;
        let api: Arc<dyn EventsApiPort> = Arc::new(HttpEventsApi::new(&self.config.api)?);
        Ok(GetEventsUseCase::new(api))
    }

    async fn origin(&self) -> Option<GeoPoint> {
        self.preferences
            .location()
            .await
            .ok()
            .flatten()
            .map(|l| l.point)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    logging::init_logging(&config.logging);
    debug!(base_url = %config.api.base_url, db = %config.storage.database_path.display(), "Loaded config");

    let services = Services::open(config)?;
    services.app.load_saved_event_ids().await?;
    let unit = if cli.km {
        DistanceUnit::Kilometers
    } else {
        DistanceUnit::Miles
    };

    match cli.command {
        Commands::Discover => run_discover(&services, unit).await?,
        Commands::List { keyword, pages } => run_list(&services, keyword, pages, unit).await?,
        Commands::Event { id } => {
            let event = fetch_event(&services, &id).await?;
            services.app.set_current_event(event);
            if let Some(event) = services.app.state().get().current_event {
                print_event_details(&event, services.origin().await, unit);
            }
        }
        Commands::Save { id } => {
            let event = fetch_event(&services, &id).await?;
            services.app.change_event_saved(&event, true).await?;
            println!("⭐ Saved {}", event.name);
        }
        Commands::Unsave { id } => {
            if !services.app.saved_event_ids().contains(&id) {
                println!("{} is not saved", id);
                return Ok(());
            }
            let event = Event {
                id: id.clone(),
                ..Default::default()
            };
            services.app.change_event_saved(&event, false).await?;
            println!("🗑️  Removed {}", id);
        }
        Commands::Saved => run_saved(&services, unit).await,
        Commands::Filter { command } => run_filter(&services, command).await?,
        Commands::Search { query, pages } => {
            let search = SearchController::new(services.preferences.clone());
            search.update_search_query(&query);
            match search.submit_search().await {
                Some(keyword) => run_list(&services, Some(keyword), pages, unit).await?,
                None => bail!("search query is empty"),
            }
        }
        Commands::History { clear } => {
            let search = SearchController::new(services.preferences.clone());
            if clear {
                search.clear_history().await;
                println!("Search history cleared");
            } else {
                search.load_history().await;
                for (i, query) in search.state().get().search_history.iter().enumerate() {
                    println!("{:>2}. {}", i + 1, query);
                }
            }
        }
    }

    Ok(())
}

async fn run_discover(services: &Services, unit: DistanceUnit) -> anyhow::Result<()> {
    let controller = DiscoverController::new(
        services.use_case()?,
        services.preferences.clone(),
        DiscoverSettings {
            page_size: services.config.paging.discover_page_size,
            near_you_radius: services.config.discover.near_you_radius.clone(),
            request_delay: Duration::from_millis(services.config.discover.request_delay_ms),
        },
    );
    controller.load_all().await;
    controller.update_events_saved(&services.app.saved_event_ids());

    let origin = services.origin().await;
    let state = controller.state().get();
    for category in DiscoverCategory::ALL {
        println!("\n📅 {}", category);
        print_resource(state.category(category), origin, unit);
    }
    Ok(())
}

async fn run_list(
    services: &Services,
    keyword: Option<String>,
    pages: u32,
    unit: DistanceUnit,
) -> anyhow::Result<()> {
    let filters = services.preferences.filter_preferences().await?;
    let mut query = EventQuery::from_filters(&filters);
    query.geo_point = services.preferences.geo_point().await?;
    query.keyword = keyword;

    let controller = EventListController::new(
        services.use_case()?,
        services.config.paging.list_page_size,
    );
    controller.get_events(false, query);
    controller
        .state()
        .wait_for(|s| !s.pagination.is_loading_more)
        .await;

    for _ in 1..pages.max(1) {
        if !controller.load_more_events() {
            break;
        }
        controller
            .state()
            .wait_for(|s| !s.pagination.is_loading_more)
            .await;
    }
    controller.update_events_saved(&services.app.saved_event_ids());

    let state = controller.state().get();
    info!(
        "Loaded through page {} of {:?}",
        state.pagination.page, state.pagination.total_pages
    );
    print_resource(&state.events, services.origin().await, unit);
    if state.pagination.can_load_more {
        println!("\n… more results available (--pages {})", state.pagination.page + 2);
    }
    Ok(())
}

async fn run_saved(services: &Services, unit: DistanceUnit) {
    let controller = SavedController::new(services.saved_store.clone());
    controller.observe_saved_events();
    let state = controller
        .state()
        .wait_for(|s| s.events.is_terminal())
        .await;
    if state.events.is_empty() {
        println!("No saved events");
        return;
    }
    print_resource(&state.events, services.origin().await, unit);
}

async fn run_filter(services: &Services, command: FilterCommand) -> anyhow::Result<()> {
    let controller = FilterController::new(services.use_case()?, services.preferences.clone());
    match command {
        FilterCommand::Show => {}
        FilterCommand::Segment { name } => {
            controller.load().await;
            controller.on_segment_selected(&name).await;
        }
        FilterCommand::Genre { name } => {
            controller.load().await;
            controller.on_genre_selected(&name).await;
        }
        FilterCommand::Subgenre { name } => {
            controller.load().await;
            controller.on_subgenre_selected(&name).await;
        }
        FilterCommand::Clear => controller.clear_segment_preferences().await,
        FilterCommand::Sort { option, desc } => {
            controller.on_sort_option_selected(option).await;
            let sort_type = if desc { SortType::Desc } else { SortType::Asc };
            services.preferences.save_sort_type(sort_type).await?;
        }
        FilterCommand::Radius { value } => {
            if value.eq_ignore_ascii_case("none") {
                services.preferences.remove_radius().await?;
            } else {
                services.preferences.save_radius(&value).await?;
            }
            controller.set_preferences_updated(true);
        }
        FilterCommand::Location {
            latitude,
            longitude,
            label,
        } => {
            controller
                .update_location(LocationPreference {
                    point: GeoPoint::new(latitude, longitude),
                    label,
                })
                .await;
            services.app.on_location_changed();
        }
    }

    if controller.state().get().preferences_updated {
        services.app.on_filters_updated().await;
    }

    controller.load().await;
    let state = controller.state().get();
    if let Some(err) = &state.catalog_error {
        error!("Classification catalog unavailable: {}", err);
    }
    let filters = services.preferences.filter_preferences().await?;
    println!("🎛️  Filters");
    println!("   Segment:   {}", state.current_segment.as_deref().unwrap_or("-"));
    println!("   Genres:    {}", join_or_dash(&state.current_genres));
    println!("   Subgenres: {}", join_or_dash(&state.current_subgenres));
    println!("   Sort:      {}", filters.sort().unwrap_or_else(|| "-".to_string()));
    println!("   Radius:    {}", filters.radius.as_deref().unwrap_or("-"));
    if let Some(location) = services.preferences.location().await? {
        println!(
            "   Location:  {} ({:.4}, {:.4})",
            location.label.as_deref().unwrap_or("-"),
            location.point.latitude,
            location.point.longitude
        );
    }
    if !state.genre_options.is_empty() {
        let names: Vec<String> = state.genre_options.iter().map(|g| g.name.clone()).collect();
        println!("   Available genres: {}", names.join(", "));
    }
    Ok(())
}

async fn fetch_event(services: &Services, id: &str) -> anyhow::Result<Event> {
    let use_case = services.use_case()?;
    let stream = use_case.event_details(id);
    futures::pin_mut!(stream);
    let mut last = Resource::Loading;
    while let Some(resource) = stream.next().await {
        last = resource;
    }
    match last {
        Resource::Success { data, .. } => Ok(data),
        Resource::Error { message, .. } => bail!(message),
        Resource::Loading => bail!("no response for event {}", id),
    }
}

fn print_resource(resource: &Resource<Vec<Event>>, origin: Option<GeoPoint>, unit: DistanceUnit) {
    match resource {
        Resource::Loading => println!("   …"),
        Resource::Error { message, .. } => println!("   ❌ {}", message),
        Resource::Success { data, .. } if data.is_empty() => println!("   No events found"),
        Resource::Success { data, .. } => {
            for event in data {
                print_event_line(event, origin, unit);
            }
        }
    }
}

fn print_event_line(event: &Event, origin: Option<GeoPoint>, unit: DistanceUnit) {
    let star = if event.saved { "⭐" } else { "  " };
    println!(
        "{} {} [{}]\n     {} · {}",
        star,
        event.name,
        event.id,
        display::format_start_date(event.dates.as_ref()),
        display::format_distance(origin, event.coordinates(), unit)
    );
}

fn print_event_details(event: &Event, origin: Option<GeoPoint>, unit: DistanceUnit) {
    print_event_line(event, origin, unit);
    println!("     {}", display::format_address(event));
    if let Some(price) = display::format_price_range(&event.price_ranges) {
        println!("     💵 {}", price);
    }
    if let Some(classification) = event.primary_classification() {
        let names: Vec<&str> = [
            &classification.segment,
            &classification.genre,
            &classification.subgenre,
        ]
        .into_iter()
        .flatten()
        .map(|item| item.name.as_str())
        .collect();
        println!("     🏷️  {}", names.join(" / "));
    }
    if let Some(url) = display::image_url(&event.images, DEFAULT_IMAGE_RATIO, DEFAULT_MIN_IMAGE_WIDTH) {
        println!("     🖼️  {}", url);
    }
    if let Some(url) = &event.url {
        println!("     🎟️  {}", url);
    }
    for text in [&event.description, &event.info, &event.please_note]
        .into_iter()
        .flatten()
    {
        println!("\n{}", text);
    }
}

fn join_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}
