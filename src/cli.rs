use clap::{Args, Parser, Subcommand};
use readsync::adapters::{
    ChannelLifecycle, ConsoleToasts, HttpNotificationService, KeepaliveOutbox, SignalLifecycle,
    TokioTimeProvider,
};
use readsync::config::{self, ClientConfig, ServerConfig};
use readsync::display::{self, Filter};
use readsync::observability;
use readsync::ports::{LifecycleEvent, TimeProvider};
use readsync::session::NotificationSession;
use readsync::state::AppState;
use readsync::types::{Category, NotificationId};
use readsync::view::{NotificationsView, ReadState, ViewOptions};

use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::path::PathBuf;

type ConsoleView = NotificationsView<
    HttpNotificationService,
    KeepaliveOutbox<HttpNotificationService>,
    TokioTimeProvider,
    ConsoleToasts,
>;

pub(crate) async fn run() -> i32 {
    let cli = Cli::parse();
    observability::init_tracing(&cli.log_level);

    match cli.command {
        Command::Serve(args) => run_serve(args).await,
        Command::List(args) => run_list(args).await,
        Command::Count(args) => run_count(args).await,
        Command::Read(args) => {
            run_action(&args.client, |view| async move {
                let id = NotificationId::from(args.id);
                view.mark_as_read(&id).await.map(|()| format!("marked {id} as read"))
            })
            .await
        }
        Command::ReadAll(args) => {
            run_action(&args, |view| async move {
                view.mark_all_as_read()
                    .await
                    .map(|()| "marked all notifications as read".to_string())
            })
            .await
        }
        Command::Delete(args) => {
            run_action(&args.client, |view| async move {
                let id = NotificationId::from(args.id);
                view.delete(&id).await.map(|()| format!("deleted {id}"))
            })
            .await
        }
        Command::DeleteAll(args) => {
            run_action(&args, |view| async move {
                view.delete_all()
                    .await
                    .map(|()| "deleted all notifications".to_string())
            })
            .await
        }
        Command::Browse(args) => run_browse(args).await,
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "readsync",
    version,
    about = "Notification read-state sync console"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "READSYNC_LOG_LEVEL",
        default_value = observability::DEFAULT_LOG_LEVEL
    )]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the in-memory reference backend.
    Serve(ServeArgs),
    /// Print the first page of notifications.
    List(ListArgs),
    /// Print the authoritative unread count.
    Count(ClientArgs),
    Read(IdArgs),
    ReadAll(ClientArgs),
    Delete(IdArgs),
    DeleteAll(ClientArgs),
    /// Open a view, report the given cards as seen, then leave it.
    Browse(BrowseArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(long, env = "READSYNC_ADDR", default_value = "127.0.0.1:3000")]
    addr: SocketAddr,
    #[arg(long, env = "READSYNC_SEED")]
    seed: Option<PathBuf>,
    #[arg(long, env = "READSYNC_SESSION_TOKEN")]
    session_token: Option<String>,
}

#[derive(Args, Debug)]
struct ClientArgs {
    #[arg(long, env = "READSYNC_BASE_URL", default_value = config::DEFAULT_BASE_URL)]
    base_url: String,
    #[arg(long, env = "READSYNC_SESSION_TOKEN")]
    session_token: Option<String>,
    #[arg(long, env = "READSYNC_LIST_LIMIT")]
    list_limit: Option<NonZeroUsize>,
    #[arg(long, env = "READSYNC_REFETCH_DELAY")]
    refetch_delay: Option<String>,
    #[arg(long, env = "READSYNC_VISIBILITY_THRESHOLD")]
    visibility_threshold: Option<f32>,
}

#[derive(Args, Debug)]
struct ListArgs {
    #[command(flatten)]
    client: ClientArgs,
    #[arg(long, conflicts_with = "category")]
    unread: bool,
    #[arg(long)]
    category: Option<Category>,
}

#[derive(Args, Debug)]
struct IdArgs {
    #[command(flatten)]
    client: ClientArgs,
    id: String,
}

#[derive(Args, Debug)]
struct BrowseArgs {
    #[command(flatten)]
    client: ClientArgs,
    #[arg(required = true)]
    ids: Vec<String>,
    /// Leave with an unload signal instead of a view teardown.
    #[arg(long, conflicts_with = "hold")]
    close: bool,
    /// Keep the view open until Ctrl-C.
    #[arg(long)]
    hold: bool,
}

fn resolve_client_config(args: &ClientArgs) -> Result<ClientConfig, String> {
    let defaults = ClientConfig::default();
    let base_url = config::validate_base_url(&args.base_url).map_err(|err| err.to_string())?;

    let session_token = match args.session_token.as_deref().map(str::trim) {
        Some("") => return Err("session token cannot be empty".to_string()),
        Some(token) => Some(token.to_string()),
        None => None,
    };

    let refetch_delay = match args.refetch_delay.as_deref() {
        Some(raw) => config::parse_duration(raw).map_err(|err| err.to_string())?,
        None => defaults.refetch_delay,
    };

    let visibility_threshold = match args.visibility_threshold {
        Some(threshold) => config::validate_threshold(threshold).map_err(|err| err.to_string())?,
        None => defaults.visibility_threshold,
    };

    Ok(ClientConfig {
        base_url,
        session_token,
        list_limit: args
            .list_limit
            .map(NonZeroUsize::get)
            .unwrap_or(defaults.list_limit),
        refetch_delay,
        visibility_threshold,
    })
}

fn resolve_server_config(args: ServeArgs) -> Result<ServerConfig, String> {
    if let Some(token) = args.session_token.as_deref()
        && token.trim().is_empty()
    {
        return Err("session token cannot be empty".to_string());
    }
    Ok(ServerConfig {
        addr: args.addr,
        seed: args.seed,
        session_token: args.session_token.map(|token| token.trim().to_string()),
    })
}

fn list_filter(args: &ListArgs) -> Filter {
    match (args.unread, args.category) {
        (true, _) => Filter::Unread,
        (false, Some(category)) => Filter::Category(category),
        (false, None) => Filter::All,
    }
}

/// Client-side wiring shared by every console command.
struct Console {
    view: ConsoleView,
    service: HttpNotificationService,
    outbox: KeepaliveOutbox<HttpNotificationService>,
}

impl Console {
    fn connect(args: &ClientArgs) -> Result<Self, String> {
        let config = resolve_client_config(args)?;
        let service = HttpNotificationService::new(&config)
            .map_err(|err| format!("failed to build http client: {err}"))?;
        let outbox = KeepaliveOutbox::new(service.clone());
        let view = NotificationsView::new(
            NotificationSession::new(),
            service.clone(),
            outbox.clone(),
            TokioTimeProvider,
            ConsoleToasts,
            ViewOptions::from(&config),
        );
        Ok(Self {
            view,
            service,
            outbox,
        })
    }

    /// Waits for durable deliveries and delayed refetches, then tears the
    /// session down.
    async fn finish(self) -> u64 {
        self.outbox.settle().await;
        self.view.coordinator().settle().await;
        let unread = self.view.unread_count();
        self.view.session().clone().dispose();
        unread
    }
}

fn connect_or_report(args: &ClientArgs) -> Option<Console> {
    match Console::connect(args) {
        Ok(console) => Some(console),
        Err(err) => {
            eprintln!("error: {err}");
            None
        }
    }
}

async fn run_serve(args: ServeArgs) -> i32 {
    let config = match resolve_server_config(args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return 2;
        }
    };

    let notifications = match config.seed.as_deref() {
        Some(path) => match config::load_seed(path) {
            Ok(notifications) => notifications,
            Err(err) => {
                eprintln!("error: {err}");
                return 2;
            }
        },
        None => readsync::backend::demo_notifications(TokioTimeProvider.now()),
    };
    tracing::info!(count = notifications.len(), "seeded notification store");

    let store = readsync::backend::InMemoryNotificationStore::with_notifications(notifications);
    let state = AppState::new(store, config.session_token.as_deref());
    println!("listening on http://{}", config.addr);
    match readsync::serve(config.addr, state).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: server failed: {err}");
            1
        }
    }
}

async fn run_list(args: ListArgs) -> i32 {
    let Some(console) = connect_or_report(&args.client) else {
        return 2;
    };
    if console.view.load().await.is_err() {
        console.finish().await;
        return 1;
    }

    let now = TokioTimeProvider.now();
    let notifications = console.view.notifications(list_filter(&args));
    for notification in &notifications {
        let pending = console.view.read_state(&notification.id) == Some(ReadState::PendingRead);
        println!("{}", display::render_line(notification, now, pending));
    }
    if notifications.is_empty() {
        println!("no notifications");
    }

    let unread = console.finish().await;
    println!("{unread} unread");
    0
}

async fn run_count(args: ClientArgs) -> i32 {
    let Some(console) = connect_or_report(&args) else {
        return 2;
    };
    let code = match console.service.fetch_unread_count().await {
        Ok(count) => {
            println!("{count}");
            0
        }
        Err(err) => {
            eprintln!("error: failed to fetch unread count: {err}");
            1
        }
    };
    console.finish().await;
    code
}

async fn run_action<F, Fut>(args: &ClientArgs, action: F) -> i32
where
    F: FnOnce(ConsoleView) -> Fut,
    Fut: Future<Output = Result<String, readsync::error::ServiceError>>,
{
    let Some(console) = connect_or_report(args) else {
        return 2;
    };
    let code = match action(console.view.clone()).await {
        Ok(message) => {
            println!("{message}");
            0
        }
        Err(_) => 1,
    };
    let unread = console.finish().await;
    if code == 0 {
        println!("{unread} unread");
    }
    code
}

async fn run_browse(args: BrowseArgs) -> i32 {
    let Some(console) = connect_or_report(&args.client) else {
        return 2;
    };
    if console.view.load().await.is_err() {
        console.finish().await;
        return 1;
    }

    for raw in &args.ids {
        let id = NotificationId::from(raw.as_str());
        let Some(notification) = console.view.session().cache().get(&id) else {
            eprintln!("warning: {id} is not in the loaded page");
            continue;
        };
        let mut tracker = console.view.tracker(&notification);
        if tracker.observe(1.0) {
            println!("seen {id}");
        } else {
            println!("{id} was already read");
        }
    }

    if args.hold {
        println!(
            "holding view open with {} pending; press Ctrl-C to leave",
            console.view.coordinator().pending().len()
        );
        console
            .view
            .run_lifecycle(&mut SignalLifecycle::default())
            .await;
    } else {
        let (events, mut source) = ChannelLifecycle::channel();
        let event = if args.close {
            LifecycleEvent::Unloading
        } else {
            LifecycleEvent::ViewTeardown
        };
        if events.send(event).is_err() {
            tracing::warn!(?event, "lifecycle channel closed early");
        }
        drop(events);
        console.view.run_lifecycle(&mut source).await;
    }

    let unread = console.finish().await;
    println!("{unread} unread");
    0
}
