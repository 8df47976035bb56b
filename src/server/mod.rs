//! Development server with live reload

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::DataLoader;
use crate::generator::Generator;
use crate::helpers::ARTICLE_PAGE;
use crate::{Site, SiteContext};

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Server state
struct ServerState {
    public_dir: PathBuf,
    context: RwLock<SiteContext>,
    generator: Generator,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

#[derive(Debug, Deserialize)]
struct ArticleQuery {
    id: Option<String>,
}

/// Start the development server
pub async fn start(site: Site, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    // Create broadcast channel for live reload notifications
    let (reload_tx, _) = broadcast::channel::<()>(16);

    let base_dir = site.base_dir.clone();
    let data_dir = site.data_dir.clone();
    let public_dir = site.public_dir.clone();
    let context = site.load_context();
    let generator = Generator::new()?;
    generator.generate(&context)?;

    let state = Arc::new(ServerState {
        public_dir,
        context: RwLock::new(context),
        generator,
        reload_tx,
        live_reload: watch,
    });

    let app = Router::new()
        .route("/__livereload", get(livereload_handler))
        .route(&format!("/{}", ARTICLE_PAGE), get(article_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let config_path = base_dir.join("_config.yml");
        let state = state.clone();

        // The debouncer delivers on a std channel, so the loop blocks
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(base_dir, data_dir, config_path, state) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Watch the data collections and the config, then reload and regenerate
fn watch_and_reload(
    base_dir: PathBuf,
    data_dir: PathBuf,
    config_path: PathBuf,
    state: Arc<ServerState>,
) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to avoid multiple rapid rebuilds
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    if data_dir.exists() {
        debouncer
            .watcher()
            .watch(&data_dir, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", data_dir);
    }

    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".DS_Store") && !path_str.ends_with('~')
                    })
                    .collect();

                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                }

                match reload(&base_dir, &state) {
                    Ok(()) => {
                        tracing::info!("Regenerated successfully");
                        // Nobody listening is fine
                        let _ = state.reload_tx.send(());
                    }
                    Err(e) => tracing::error!("Regeneration failed: {}", e),
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Re-read the config and data, regenerate, then swap in the new context.
///
/// A failed load leaves the served site and context untouched.
fn reload(base_dir: &Path, state: &ServerState) -> Result<()> {
    let site = Site::new(base_dir)?;
    let data = DataLoader::new(&site.config, &site.base_dir)
        .load()
        .map_err(|e| {
            tracing::error!("Error loading data, keeping the current site: {}", e);
            e
        })?;

    let context = SiteContext::new(site, data);
    state.generator.generate(&context)?;
    *state.context.blocking_write() = context;
    Ok(())
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// `article.html?id=`: rendered from the current context on every request
async fn article_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ArticleQuery>,
) -> Response {
    let context = state.context.read().await;
    let rendered = state
        .generator
        .render_article(&context, query.id.as_deref());
    html_response(&state, rendered)
}

/// Serve generated files, then deep links, then 404
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let path = request.uri().path().to_string();

    if let Some(file_path) = resolve_file(&state.public_dir, &path) {
        return serve_file(&state, file_path, request).await;
    }

    let context = state.context.read().await;
    if let Some(post) = context.resolve_deep_link(&path) {
        let rendered = state.generator.render_deep_link(&context, post);
        return html_response(&state, rendered);
    }

    tracing::debug!("Not found: {}", path);
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

/// Map a request path onto an existing file in the public directory
fn resolve_file(public_dir: &Path, path: &str) -> Option<PathBuf> {
    let clean_path = path.trim_start_matches('/');
    if clean_path.split('/').any(|part| part == "..") {
        return None;
    }

    let candidate = public_dir.join(clean_path);
    if candidate.is_dir() {
        let index = candidate.join("index.html");
        return index.exists().then_some(index);
    }
    if candidate.is_file() {
        return Some(candidate);
    }

    let with_html = public_dir.join(format!("{}.html", clean_path.trim_end_matches('/')));
    with_html.is_file().then_some(with_html)
}

async fn serve_file(state: &ServerState, file_path: PathBuf, request: Request<Body>) -> Response {
    let is_html = file_path
        .extension()
        .map(|ext| ext == "html" || ext == "htm")
        .unwrap_or(false);

    if is_html && state.live_reload {
        match tokio::fs::read_to_string(&file_path).await {
            Ok(content) => Html(inject_live_reload(&content)).into_response(),
            Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        }
    } else {
        let mut service = ServeDir::new(&state.public_dir).append_index_html_on_directories(true);
        match service.try_call(request).await {
            Ok(response) => response.into_response(),
            Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
        }
    }
}

fn html_response(state: &ServerState, rendered: Result<String>) -> Response {
    match rendered {
        Ok(html) if state.live_reload => Html(inject_live_reload(&html)).into_response(),
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Render failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replacen("</body>", LIVE_RELOAD_SCRIPT, 1)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_file() {
        let dir = TempDir::new().unwrap();
        let public = dir.path();
        fs::create_dir_all(public.join("article/kernel")).unwrap();
        fs::write(public.join("index.html"), "home").unwrap();
        fs::write(public.join("article/kernel/index.html"), "kernel").unwrap();
        fs::write(public.join("article.html"), "missing").unwrap();

        assert_eq!(resolve_file(public, "/"), Some(public.join("index.html")));
        assert_eq!(
            resolve_file(public, "/article/kernel/"),
            Some(public.join("article/kernel/index.html"))
        );
        assert_eq!(
            resolve_file(public, "/article"),
            None,
            "directory without index.html"
        );
        assert_eq!(resolve_file(public, "/writing-a-kernel/"), None);
        assert_eq!(resolve_file(public, "/../secret"), None);
    }

    fn write_posts(base: &Path, posts: &str) {
        let data = base.join("data");
        fs::create_dir_all(&data).unwrap();
        fs::write(data.join("posts.json"), posts).unwrap();
        fs::write(data.join("updates.json"), "[]").unwrap();
    }

    fn state_for(base: &Path) -> ServerState {
        let site = Site::new(base).unwrap();
        let public_dir = site.public_dir.clone();
        let context = site.load_context();
        let generator = Generator::new().unwrap();
        generator.generate(&context).unwrap();

        ServerState {
            public_dir,
            context: RwLock::new(context),
            generator,
            reload_tx: broadcast::channel(1).0,
            live_reload: true,
        }
    }

    const ONE_POST: &str = r#"[{"id": "p1", "title": "Kept Post", "date": "2024-02-01",
        "tag": "Rust", "content": "<h2>A</h2>"}]"#;

    #[test]
    fn test_reload_keeps_current_site_on_bad_data() {
        let dir = TempDir::new().unwrap();
        write_posts(dir.path(), ONE_POST);
        let state = state_for(dir.path());

        write_posts(dir.path(), "[{");
        assert!(reload(dir.path(), &state).is_err());

        assert_eq!(state.context.blocking_read().posts().len(), 1);
        let index = fs::read_to_string(dir.path().join("public/index.html")).unwrap();
        assert!(index.contains("Kept Post"));
    }

    #[test]
    fn test_reload_applies_new_data() {
        let dir = TempDir::new().unwrap();
        write_posts(dir.path(), ONE_POST);
        let state = state_for(dir.path());

        write_posts(dir.path(), &ONE_POST.replace("Kept Post", "Renamed Post"));
        reload(dir.path(), &state).unwrap();

        assert_eq!(state.context.blocking_read().posts()[0].title, "Renamed Post");
        let index = fs::read_to_string(dir.path().join("public/index.html")).unwrap();
        assert!(index.contains("Renamed Post"));
    }

    #[test]
    fn test_inject_live_reload() {
        let html = "<html><body><p>x</p></body></html>";
        let injected = inject_live_reload(html);
        assert!(injected.contains("/__livereload"));
        assert!(injected.ends_with("</body>\n</html>"));

        let bare = inject_live_reload("<p>x</p>");
        assert!(bare.starts_with("<p>x</p>"));
        assert!(bare.contains("/__livereload"));
    }
}
