//! Async facade over a synchronous [`PageHandle`].

use crate::dom::{ElementStyle, OverlayRemoval, ThemeDescriptor};
use crate::renderer::{Clip, OpenOptions, PageHandle, PageRenderer};
use crate::{Error, Result};
use log::{debug, warn};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;
use tokio::sync::oneshot;

enum Command {
    ButtonElements(oneshot::Sender<Result<Vec<ElementStyle>>>),
    QueryElementStyle(String, oneshot::Sender<Result<Option<ElementStyle>>>),
    ThemeDescriptor(oneshot::Sender<Result<Option<ThemeDescriptor>>>),
    MaskMedia(oneshot::Sender<Result<u32>>),
    RemoveOverlays(Vec<String>, String, f64, oneshot::Sender<Result<OverlayRemoval>>),
    ContentHeight(oneshot::Sender<Result<f64>>),
    Screenshot(Clip, oneshot::Sender<Result<Vec<u8>>>),
    Close(oneshot::Sender<Result<()>>),
}

/// A page driven from a dedicated worker thread.
///
/// The worker owns the backend page and executes commands sent from async
/// tasks, so backends do not need to be `Send` across awaits or async-aware.
/// The page is closed by [`Page::close`] or, failing that, when the last
/// handle is dropped.
pub struct Page {
    cmd_tx: Sender<Command>,
}

impl Page {
    /// Open `url` on `renderer` (spawns the worker thread that owns the page).
    pub async fn open<R: PageRenderer>(renderer: Arc<R>, url: &str, options: OpenOptions) -> Result<Self> {
        let url = url.to_string();
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx) = oneshot::channel::<Result<()>>();

        thread::spawn(move || {
            let page = match renderer.open(&url, &options) {
                Ok(p) => p,
                Err(err) => {
                    let _ = init_tx.send(Err(err));
                    return;
                }
            };
            let _ = init_tx.send(Ok(()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    Command::ButtonElements(resp) => {
                        let _ = resp.send(page.button_elements());
                    }
                    Command::QueryElementStyle(selector, resp) => {
                        let _ = resp.send(page.query_element_style(&selector));
                    }
                    Command::ThemeDescriptor(resp) => {
                        let _ = resp.send(page.theme_descriptor());
                    }
                    Command::MaskMedia(resp) => {
                        let _ = resp.send(page.mask_media());
                    }
                    Command::RemoveOverlays(selectors, z_index, min_height, resp) => {
                        let selectors: Vec<&str> = selectors.iter().map(String::as_str).collect();
                        let _ = resp.send(page.remove_overlays(&selectors, &z_index, min_height));
                    }
                    Command::ContentHeight(resp) => {
                        let _ = resp.send(page.content_height());
                    }
                    Command::Screenshot(clip, resp) => {
                        let _ = resp.send(page.screenshot(clip));
                    }
                    Command::Close(resp) => {
                        let _ = resp.send(page.close());
                        return;
                    }
                }
            }

            // All handles dropped without an explicit close
            debug!("page handle dropped, closing {}", url);
            if let Err(e) = page.close() {
                warn!("Failed to close page for {}: {}", url, e);
            }
        });

        init_rx
            .await
            .map_err(|e| Error::Other(format!("Page worker init canceled: {}", e)))??;

        Ok(Self { cmd_tx })
    }

    async fn request<T>(
        &self,
        what: &str,
        make: impl FnOnce(oneshot::Sender<Result<T>>) -> Command,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .map_err(|_| Error::Other(format!("{} failed: page worker has exited", what)))?;
        rx.await
            .map_err(|e| Error::Other(format!("{} canceled: {}", what, e)))?
    }

    pub async fn button_elements(&self) -> Result<Vec<ElementStyle>> {
        self.request("ButtonElements", Command::ButtonElements).await
    }

    pub async fn query_element_style(&self, selector: &str) -> Result<Option<ElementStyle>> {
        let selector = selector.to_string();
        self.request("QueryElementStyle", |tx| Command::QueryElementStyle(selector, tx))
            .await
    }

    pub async fn theme_descriptor(&self) -> Result<Option<ThemeDescriptor>> {
        self.request("ThemeDescriptor", Command::ThemeDescriptor).await
    }

    pub async fn mask_media(&self) -> Result<u32> {
        self.request("MaskMedia", Command::MaskMedia).await
    }

    pub async fn remove_overlays(&self, selectors: &[&str], z_index: &str, min_height: f64) -> Result<OverlayRemoval> {
        let selectors = selectors.iter().map(|s| s.to_string()).collect();
        let z_index = z_index.to_string();
        self.request("RemoveOverlays", |tx| {
            Command::RemoveOverlays(selectors, z_index, min_height, tx)
        })
        .await
    }

    pub async fn content_height(&self) -> Result<f64> {
        self.request("ContentHeight", Command::ContentHeight).await
    }

    pub async fn screenshot(&self, clip: Clip) -> Result<Vec<u8>> {
        self.request("Screenshot", |tx| Command::Screenshot(clip, tx)).await
    }

    /// Close the page and stop the worker.
    pub async fn close(self) -> Result<()> {
        self.request("Close", Command::Close).await
    }
}
