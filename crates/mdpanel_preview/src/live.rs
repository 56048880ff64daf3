//! Browser page kept up to date over a websocket.

use crate::local::{content_type, VirtualHost};
use crate::message::Message;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Extension, Path as UrlPath};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use mdpanel_core::assemble::inject_into_head;
use mdpanel_core::assets::RETYPESET_SCRIPT;
use mdpanel_core::display::{diff_strategy, zoom_factor};
use mdpanel_core::{DiffStrategy, DisplayState, DisplaySurface, RenderResult, SurfaceError};
use parking_lot::RwLock;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const CLIENT_SCRIPT: &str = include_str!("../assets/client.js");

const WAITING_PAGE: &str =
    "<!DOCTYPE html><html><head><title>Markdown Panel</title></head><body><p>Waiting for the first render...</p></body></html>";

/// State shared between the surface and the HTTP handlers.
struct LiveShared {
    /// Current page, already rewritten for the virtual host.
    page: RwLock<String>,
    virtual_host: RwLock<VirtualHost>,
    zoom_level: AtomicU32,
    msg_tx: broadcast::Sender<Message>,
}

impl LiveShared {
    fn current_zoom(&self) -> Message {
        Message::Zoom {
            factor: zoom_factor(self.zoom_level.load(Ordering::Relaxed)),
        }
    }

    fn broadcast(&self, msg: Message) {
        // No connected page is fine, it fetches the latest state when it connects.
        let _ = self.msg_tx.send(msg);
    }
}

/// Serves the page on `GET /`, or upgrades to the websocket.
async fn ws_handler(
    ws: Option<WebSocketUpgrade>,
    Extension(shared): Extension<Arc<LiveShared>>,
) -> impl IntoResponse {
    if let Some(ws) = ws {
        ws.on_upgrade(|ws| async move { handle_websocket(ws, shared).await })
    } else {
        let page = shared.page.read().clone();
        (StatusCode::OK, Html(page)).into_response()
    }
}

async fn handle_websocket(mut socket: WebSocket, shared: Arc<LiveShared>) {
    let mut msg_rx = shared.msg_tx.subscribe();

    let mut next = Some(shared.current_zoom());
    loop {
        let msg = match next.take() {
            Some(msg) => msg,
            None => match msg_rx.recv().await {
                Ok(msg) => msg,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Page lagged behind, reloading");
                    Message::FullReload
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        };

        let Ok(text) = serde_json::to_string(&msg) else {
            break;
        };

        if socket.send(WsMessage::Text(text)).await.is_err() {
            break;
        }
    }

    let _ = socket.send(WsMessage::Close(None)).await;
}

/// Serves files of the document directory.
async fn local_file(
    UrlPath(path): UrlPath<String>,
    Extension(shared): Extension<Arc<LiveShared>>,
) -> Response {
    let Some(file) = shared.virtual_host.read().resolve(&path) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match tokio::fs::read(&file).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(&file))], bytes).into_response(),
        Err(err) => {
            tracing::debug!(?err, path = %file.display(), "Local file unavailable");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

#[derive(Debug, Clone)]
pub struct LiveSurfaceOptions {
    /// Port to listen on, `0` picks a free one.
    pub port: u16,
    pub open_browser: bool,
}

impl Default for LiveSurfaceOptions {
    fn default() -> Self {
        Self {
            port: 0,
            open_browser: true,
        }
    }
}

/// Display surface backed by a local HTTP server.
///
/// `GET /` serves the latest display page, the websocket on the same path
/// pushes patches, and `/local/*path` serves the document directory.
pub struct LiveSurface {
    options: LiveSurfaceOptions,
    shared: Arc<LiveShared>,
    state: Option<DisplayState>,
    addr: Option<SocketAddr>,
    server: Option<JoinHandle<()>>,
}

impl LiveSurface {
    pub fn new(options: LiveSurfaceOptions) -> Self {
        let (msg_tx, _) = broadcast::channel(16);
        Self {
            options,
            shared: Arc::new(LiveShared {
                page: RwLock::new(WAITING_PAGE.to_string()),
                virtual_host: RwLock::new(VirtualHost::default()),
                zoom_level: AtomicU32::new(100),
                msg_tx,
            }),
            state: None,
            addr: None,
            server: None,
        }
    }

    /// Address the server listens on, once initialized.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.addr
    }

    fn page_for(&self, result: &RenderResult, virtual_host: &VirtualHost) -> String {
        let line_map = serde_json::to_string(&result.line_map).unwrap_or_else(|_| "[]".into());
        let client = format!(
            "<script>window.__mdpanelLineMap = {line_map};\nwindow.__mdpanelRetypeset = function () {{ {RETYPESET_SCRIPT} }};</script>\n<script>{CLIENT_SCRIPT}</script>"
        );
        inject_into_head(&virtual_host.rewrite(&result.html_for_display), &client)
    }
}

impl DisplaySurface for LiveSurface {
    fn initialize(&mut self, zoom_level: u32) -> Result<(), SurfaceError> {
        self.shared.zoom_level.store(zoom_level, Ordering::Relaxed);
        if self.server.is_some() {
            return Ok(());
        }

        let std_listener = std::net::TcpListener::bind(("127.0.0.1", self.options.port))?;
        std_listener.set_nonblocking(true)?;
        let listener = tokio::net::TcpListener::from_std(std_listener)?;
        let addr = listener.local_addr()?;

        let app = Router::new()
            .route("/", get(ws_handler))
            .route("/local/*path", get(local_file))
            .layer(Extension(self.shared.clone()));

        tracing::debug!("Listening on {listener:?}");

        self.server.replace(tokio::spawn(async move {
            if let Err(err) = axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            {
                tracing::error!(?err, "Live display server stopped");
            }
        }));
        self.addr.replace(addr);

        if self.options.open_browser {
            webbrowser::open(&format!("http://{addr}"))
                .map_err(|err| SurfaceError::Browser(err.to_string()))?;
        }

        tracing::info!(%addr, "Live display surface ready");

        Ok(())
    }

    fn set_content(&mut self, result: &RenderResult) -> Result<DiffStrategy, SurfaceError> {
        if self.server.is_none() {
            return Err(SurfaceError::NotInitialized);
        }

        let next = DisplayState::from(result);
        let strategy = diff_strategy(self.state.as_ref(), &next);

        if strategy == DiffStrategy::FullReload {
            let virtual_host = VirtualHost::for_document(result.document_path.as_deref());
            tracing::debug!(root = ?virtual_host.root(), "Mapped document directory");
            *self.shared.virtual_host.write() = virtual_host;
        }

        let virtual_host = self.shared.virtual_host.read().clone();
        *self.shared.page.write() = self.page_for(result, &virtual_host);

        match strategy {
            DiffStrategy::FullReload => self.shared.broadcast(Message::FullReload),
            DiffStrategy::NoChange => {}
            patch => self.shared.broadcast(Message::Patch {
                body: patch
                    .patches_body()
                    .then(|| virtual_host.rewrite(&result.body_html)),
                css: patch.patches_style().then(|| result.style_css.clone()),
                line_map: result.line_map.clone(),
            }),
        }

        self.state.replace(next);

        Ok(strategy)
    }

    fn scroll_to_line(&mut self, line: usize) -> Result<(), SurfaceError> {
        self.shared.broadcast(Message::Scroll { line });
        Ok(())
    }

    fn screenshot(&mut self) -> Option<Vec<u8>> {
        None
    }

    fn set_zoom(&mut self, zoom_level: u32) -> Result<(), SurfaceError> {
        let previous = self.shared.zoom_level.swap(zoom_level, Ordering::Relaxed);
        if previous != zoom_level {
            self.shared.broadcast(self.shared.current_zoom());
        }
        Ok(())
    }

    fn engine_name(&self) -> &'static str {
        "live"
    }
}

impl Drop for LiveSurface {
    fn drop(&mut self) {
        if let Some(server) = self.server.take() {
            server.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdpanel_core::RenderPipeline;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn http_get(addr: SocketAddr, path: &str) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8_lossy(&response).into_owned()
    }

    fn surface() -> LiveSurface {
        LiveSurface::new(LiveSurfaceOptions {
            port: 0,
            open_browser: false,
        })
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_set_content_requires_initialize() {
        let result = RenderPipeline::default().render("x", None).unwrap();
        assert!(matches!(
            surface().set_content(&result),
            Err(SurfaceError::NotInitialized)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_serves_page_and_local_files() {
        let tmp = tempfile::tempdir().unwrap();
        let doc = tmp.path().join("readme.md");
        std::fs::write(&doc, "# Hello").unwrap();
        std::fs::write(tmp.path().join("pic.svg"), "<svg/>").unwrap();

        let mut surface = surface();
        surface.initialize(100).unwrap();
        let addr = surface.local_addr().unwrap();

        let pipeline = RenderPipeline::default();
        let first = pipeline.render("# Hello", Some(&doc)).unwrap();
        assert_eq!(surface.set_content(&first).unwrap(), DiffStrategy::FullReload);

        let page = http_get(addr, "/").await;
        assert!(page.starts_with("HTTP/1.1 200"));
        assert!(page.contains(r#"<base href="/local/">"#));
        assert!(page.contains("window.__mdpanelLineMap = [1];"));
        assert!(page.contains("window.__mdpanelRetypeset = function ()"));
        assert!(page.contains(r#"<h1 id="hello">Hello</h1>"#));

        let svg = http_get(addr, "/local/pic.svg").await;
        assert!(svg.starts_with("HTTP/1.1 200"));
        assert!(svg.contains("image/svg+xml"));
        assert!(svg.ends_with("<svg/>"));

        let missing = http_get(addr, "/local/nope.png").await;
        assert!(missing.starts_with("HTTP/1.1 404"));

        let second = pipeline.render("# Hello again", Some(&doc)).unwrap();
        assert_eq!(surface.set_content(&second).unwrap(), DiffStrategy::PatchBody);
        assert_eq!(surface.set_content(&second).unwrap(), DiffStrategy::NoChange);
        assert!(http_get(addr, "/").await.contains("Hello again"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_broadcasts_patches() {
        let mut surface = surface();
        surface.initialize(100).unwrap();
        let mut msg_rx = surface.shared.msg_tx.subscribe();

        let pipeline = RenderPipeline::default();
        surface.set_content(&pipeline.render("a", None).unwrap()).unwrap();
        assert_eq!(msg_rx.recv().await.unwrap(), Message::FullReload);

        surface.set_content(&pipeline.render("b", None).unwrap()).unwrap();
        match msg_rx.recv().await.unwrap() {
            Message::Patch { body, css, line_map } => {
                assert_eq!(body.as_deref(), Some("<p>b</p>\n"));
                assert_eq!(css, None);
                assert_eq!(line_map, vec![1]);
            }
            other => panic!("unexpected message {other:?}"),
        }

        surface.scroll_to_line(3).unwrap();
        assert_eq!(msg_rx.recv().await.unwrap(), Message::Scroll { line: 3 });

        surface.set_zoom(100).unwrap();
        surface.set_zoom(150).unwrap();
        assert_eq!(msg_rx.recv().await.unwrap(), Message::Zoom { factor: 1.5 });
    }
}
