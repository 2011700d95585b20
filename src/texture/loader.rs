use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

use crate::error::{TextureError, report};
use crate::texture::TextureKind;

pub enum LoadCommand {
    Load { kind: TextureKind, path: PathBuf },
    Stop,
}

#[derive(Debug)]
pub struct DecodedImage {
    pub kind: TextureKind,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Debug)]
pub enum LoadResult {
    Loaded(DecodedImage),
    Failed { kind: TextureKind, error: String },
}

type Notify = Box<dyn Fn() + Send + 'static>;

/// Decodes texture images on a worker thread. Every finished request, success
/// or failure, is followed by a call to the notify callback.
pub struct TextureLoader {
    tx_cmd: Sender<LoadCommand>,
    rx_result: Receiver<LoadResult>,
    last_error: Arc<Mutex<Option<(TextureKind, String)>>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl TextureLoader {
    pub fn new(notify: impl Fn() + Send + 'static) -> Self {
        let (tx_cmd, rx_cmd) = channel::unbounded::<LoadCommand>();
        let (tx_result, rx_result) = channel::unbounded::<LoadResult>();
        let last_error = Arc::new(Mutex::new(None));
        let last_error_clone = Arc::clone(&last_error);
        let notify: Notify = Box::new(notify);

        let thread_handle = thread::Builder::new()
            .name("texture-loader".into())
            .spawn(move || loader_thread(rx_cmd, tx_result, last_error_clone, notify))
            .map_err(|e| warn!("could not spawn texture loader: {}", e))
            .ok();

        Self {
            tx_cmd,
            rx_result,
            last_error,
            thread_handle,
        }
    }

    pub fn load(&self, kind: TextureKind, path: impl Into<PathBuf>) -> Result<(), TextureError> {
        let path = path.into();
        debug!(%kind, path = %path.display(), "queueing texture load");
        self.tx_cmd
            .send(LoadCommand::Load { kind, path })
            .map_err(|_| TextureError::LoaderGone)
    }

    pub fn try_recv_result(&self) -> Option<LoadResult> {
        self.rx_result.try_recv().ok()
    }

    /// Most recent failure that has not been superseded by a successful load
    /// of the same map.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().as_ref().map(|(_, error)| error.clone())
    }

    pub fn stop(&self) {
        let _ = self.tx_cmd.send(LoadCommand::Stop);
    }
}

impl Drop for TextureLoader {
    fn drop(&mut self) {
        let _ = self.tx_cmd.send(LoadCommand::Stop);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

fn loader_thread(
    rx_cmd: Receiver<LoadCommand>,
    tx_result: Sender<LoadResult>,
    last_error: Arc<Mutex<Option<(TextureKind, String)>>>,
    notify: Notify,
) {
    loop {
        let cmd = match rx_cmd.recv() {
            Ok(c) => c,
            Err(_) => return,
        };

        match cmd {
            LoadCommand::Load { kind, path } => {
                let result = match decode_image(kind, &path) {
                    Ok(image) => {
                        info!(%kind, width = image.width, height = image.height, "texture loaded");
                        let mut slot = last_error.lock();
                        if slot.as_ref().is_some_and(|(failed, _)| *failed == kind) {
                            *slot = None;
                        }
                        LoadResult::Loaded(image)
                    }
                    Err(e) => {
                        let error = report(&e);
                        warn!("{}", error);
                        *last_error.lock() = Some((kind, error.clone()));
                        LoadResult::Failed { kind, error }
                    }
                };

                if tx_result.send(result).is_err() {
                    return;
                }
                notify();
            }
            LoadCommand::Stop => return,
        }
    }
}

/// Opens and decodes an image file into tightly packed RGBA8 rows, bottom row
/// first so that `v = 0` samples the bottom of the picture.
pub fn decode_image(kind: TextureKind, path: &Path) -> Result<DecodedImage, TextureError> {
    let image = image::open(path).map_err(|source| TextureError::Decode {
        kind,
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = image.flipv().to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(DecodedImage {
        kind,
        width,
        height,
        rgba: rgba.into_raw(),
    })
}
