use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use image::RgbaImage;
use tokio::runtime::Runtime;

use super::source::{decode, DirectorySource, ImageSource, DEFAULT_TEXTURE_ROOT};
use super::ticket::{LoadTicket, Outcome};
use super::TextureError;

/// Async workers reading texture bytes. Decoding uses the blocking pool.
const FETCH_WORKERS: usize = 2;
const MAX_DECODE_THREADS: usize = 4;

/// Where the default vault reads textures from.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    pub root: PathBuf,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_TEXTURE_ROOT),
        }
    }
}

/// Load state of one filename.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TextureStatus {
    Pending,
    Ready,
    Failed,
}

enum Entry<T> {
    Pending { waiters: Vec<flume::Sender<Outcome>> },
    Ready(T),
    Failed(String),
}

struct Fetched {
    generation: u64,
    name: String,
    result: Result<RgbaImage, TextureError>,
}

/// Filename → texture table.
///
/// `T` is whatever the upload callback of [`poll`](Self::poll) produces,
/// normally a `GpuTexture`. Fetches run on a small tokio runtime owned by
/// the vault, started on the first [`load`](Self::load).
pub struct TextureVault<T, S = DirectorySource> {
    source: Arc<S>,
    runtime: Option<Runtime>,
    entries: HashMap<String, Entry<T>>,
    generation: u64,
    tx: flume::Sender<Fetched>,
    rx: flume::Receiver<Fetched>,
}

impl<T> TextureVault<T, DirectorySource> {
    /// Vault reading from `config.root` on disk.
    pub fn from_config(config: &VaultConfig) -> Self {
        Self::new(DirectorySource::new(config.root.clone()))
    }
}

impl<T, S: ImageSource> TextureVault<T, S> {
    pub fn new(source: S) -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            source: Arc::new(source),
            runtime: None,
            entries: HashMap::new(),
            generation: 0,
            tx,
            rx,
        }
    }

    /// Resets the table to empty. Fetches still in flight are discarded when
    /// they finish, and their tickets resolve to `Discarded`.
    pub fn initialize(&mut self) {
        self.entries.clear();
        self.generation += 1;
        log::debug!("texture vault initialized (generation {})", self.generation);
    }

    /// Requests `name`. Only the first request for a filename fetches.
    pub fn load(&mut self, name: &str) -> LoadTicket {
        match self.entries.get_mut(name) {
            Some(Entry::Ready(_)) => return LoadTicket::resolved(name, Ok(())),
            Some(Entry::Failed(reason)) => {
                let err = TextureError::Failed {
                    name: name.to_string(),
                    reason: reason.clone(),
                };
                return LoadTicket::resolved(name, Err(err));
            }
            Some(Entry::Pending { waiters }) => {
                let (ticket, tx) = LoadTicket::new(name);
                waiters.push(tx);
                return ticket;
            }
            None => {}
        }

        let (ticket, waiter) = LoadTicket::new(name);
        log::info!("loading {name} start.");

        match self.spawn_fetch(name) {
            Ok(()) => {
                self.entries.insert(
                    name.to_string(),
                    Entry::Pending {
                        waiters: vec![waiter],
                    },
                );
            }
            Err(e) => {
                let reason = format!("could not start the texture fetch runtime: {e}");
                log::error!("loading {name} failed: {reason}");
                let _ = waiter.send(Err(TextureError::Failed {
                    name: name.to_string(),
                    reason: reason.clone(),
                }));
                self.entries.insert(name.to_string(), Entry::Failed(reason));
            }
        }
        ticket
    }

    fn runtime(&mut self) -> std::io::Result<&Runtime> {
        let runtime = match self.runtime.take() {
            Some(runtime) => runtime,
            None => {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(FETCH_WORKERS)
                    .max_blocking_threads(MAX_DECODE_THREADS)
                    .thread_name("texture-fetch")
                    .enable_all()
                    .build()?;
                log::debug!("texture fetch runtime started ({FETCH_WORKERS} workers)");
                runtime
            }
        };
        let runtime: &Runtime = self.runtime.insert(runtime);
        Ok(runtime)
    }

    fn spawn_fetch(&mut self, name: &str) -> std::io::Result<()> {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let generation = self.generation;
        let name = name.to_string();

        self.runtime()?.spawn(async move {
            let result = fetch(&*source, &name).await;
            // The vault may be gone; nothing to report to then.
            let _ = tx.send(Fetched {
                generation,
                name,
                result,
            });
        });
        Ok(())
    }

    /// Drains finished fetches without blocking, uploading each with
    /// `upload`. Returns how many entries were resolved.
    pub fn poll(&mut self, mut upload: impl FnMut(&str, RgbaImage) -> T) -> usize {
        let mut resolved = 0;
        while let Ok(fetched) = self.rx.try_recv() {
            if self.complete(fetched, &mut upload) {
                resolved += 1;
            }
        }
        resolved
    }

    fn complete(&mut self, fetched: Fetched, upload: &mut impl FnMut(&str, RgbaImage) -> T) -> bool {
        if fetched.generation != self.generation {
            log::debug!("dropping stale fetch of {}", fetched.name);
            return false;
        }
        let Some(entry) = self.entries.get_mut(&fetched.name) else {
            return false;
        };
        let Entry::Pending { waiters } = &mut *entry else {
            return false;
        };
        let waiters = std::mem::take(waiters);

        match fetched.result {
            Ok(image) => {
                let texture = upload(&fetched.name, image);
                *entry = Entry::Ready(texture);
                log::info!("loading {} done.", fetched.name);
                for w in waiters {
                    let _ = w.send(Ok(()));
                }
            }
            Err(err) => {
                let reason = format!("{:#}", anyhow::Error::from(err));
                log::error!("loading {} failed: {reason}", fetched.name);
                for w in waiters {
                    let _ = w.send(Err(TextureError::Failed {
                        name: fetched.name.clone(),
                        reason: reason.clone(),
                    }));
                }
                *entry = Entry::Failed(reason);
            }
        }
        true
    }

    /// The texture for `name`, once it has been uploaded.
    ///
    /// Misses report why and have no side effect.
    pub fn bind(&self, name: &str) -> Result<&T, TextureError> {
        match self.entries.get(name) {
            Some(Entry::Ready(texture)) => Ok(texture),
            Some(Entry::Pending { .. }) => Err(TextureError::Pending(name.to_string())),
            Some(Entry::Failed(reason)) => Err(TextureError::Failed {
                name: name.to_string(),
                reason: reason.clone(),
            }),
            None => Err(TextureError::NotRequested(name.to_string())),
        }
    }

    /// `None` when `name` was never requested.
    pub fn status(&self, name: &str) -> Option<TextureStatus> {
        self.entries.get(name).map(|entry| match entry {
            Entry::Pending { .. } => TextureStatus::Pending,
            Entry::Ready(_) => TextureStatus::Ready,
            Entry::Failed(_) => TextureStatus::Failed,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for TextureVault<T, DirectorySource> {
    fn default() -> Self {
        Self::from_config(&VaultConfig::default())
    }
}

impl<T, S> Drop for TextureVault<T, S> {
    fn drop(&mut self) {
        // Reads still in flight are abandoned; their results have nowhere to go.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Reads `name` from `source`, then decodes it off the async workers.
async fn fetch<S: ImageSource>(source: &S, name: &str) -> Result<RgbaImage, TextureError> {
    let bytes = source.read(name).await?;
    let owned = name.to_string();
    tokio::task::spawn_blocking(move || decode(&owned, &bytes))
        .await
        .map_err(|e| TextureError::Failed {
            name: name.to_string(),
            reason: format!("decode task did not finish: {e}"),
        })?
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    /// Serves a 4x2 PNG for every name, except `broken.png` (read error)
    /// and `junk.png` (undecodable bytes). Reads wait on `gate` when set.
    #[derive(Default)]
    struct MemorySource {
        calls: Arc<AtomicUsize>,
        gate: Option<flume::Receiver<()>>,
    }

    impl MemorySource {
        /// Source whose reads block until the returned sender is dropped.
        fn gated() -> (Self, flume::Sender<()>) {
            let (open, gate) = flume::bounded(0);
            let src = Self {
                gate: Some(gate),
                ..Self::default()
            };
            (src, open)
        }
    }

    impl ImageSource for MemorySource {
        async fn read(&self, name: &str) -> Result<Vec<u8>, TextureError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                let _ = gate.recv_async().await;
            }
            match name {
                "broken.png" => Err(TextureError::Io {
                    path: PathBuf::from(name),
                    source: std::io::Error::other("corrupt"),
                }),
                "junk.png" => Ok(b"not an image".to_vec()),
                _ => {
                    let mut bytes = Vec::new();
                    RgbaImage::new(4, 2)
                        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
                        .expect("encode test png");
                    Ok(bytes)
                }
            }
        }
    }

    type TestVault = TextureVault<(u32, u32), MemorySource>;

    /// Dimensions stand in for a GPU texture.
    fn dims(_: &str, image: RgbaImage) -> (u32, u32) {
        image.dimensions()
    }

    /// Waits up to `WAIT` for the first completion, then drains the rest.
    fn settle<T, S: ImageSource>(
        vault: &mut TextureVault<T, S>,
        mut upload: impl FnMut(&str, RgbaImage) -> T,
    ) -> usize {
        let mut resolved = 0;
        if let Ok(fetched) = vault.rx.recv_timeout(WAIT) {
            if vault.complete(fetched, &mut upload) {
                resolved += 1;
            }
        }
        resolved + vault.poll(upload)
    }

    #[test]
    fn bind_of_unrequested_name_misses_without_side_effect() {
        let vault = TestVault::new(MemorySource::default());
        assert!(matches!(vault.bind("a.png"), Err(TextureError::NotRequested(n)) if n == "a.png"));
        assert!(vault.is_empty());
        assert_eq!(vault.status("a.png"), None);
    }

    #[test]
    fn no_runtime_until_first_load() {
        let mut vault = TestVault::new(MemorySource::default());
        assert!(vault.runtime.is_none());
        vault.load("a.png");
        assert!(vault.runtime.is_some());
    }

    #[test]
    fn duplicate_load_fetches_once() {
        let (src, open) = MemorySource::gated();
        let calls = Arc::clone(&src.calls);
        let mut vault = TestVault::new(src);

        let mut first = vault.load("a.png");
        let second = vault.load("a.png");
        assert_eq!(vault.len(), 1);
        assert_eq!(vault.status("a.png"), Some(TextureStatus::Pending));
        assert!(matches!(vault.bind("a.png"), Err(TextureError::Pending(_))));
        assert!(first.try_outcome().is_none());

        drop(open);
        assert_eq!(settle(&mut vault, dims), 1);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(first.try_outcome(), Some(Ok(()))));
        assert!(second.wait().is_ok());
        assert_eq!(vault.bind("a.png").ok(), Some(&(4, 2)));
    }

    #[test]
    fn distinct_names_load_concurrently() {
        let mut vault = TestVault::new(MemorySource::default());
        for name in ["a.png", "b.png", "c.png"] {
            vault.load(name);
        }

        let mut resolved = 0;
        while resolved < 3 {
            let n = settle(&mut vault, dims);
            assert!(n > 0, "fetches stalled after {resolved}");
            resolved += n;
        }
        assert!(["a.png", "b.png", "c.png"]
            .iter()
            .all(|n| vault.status(n) == Some(TextureStatus::Ready)));
    }

    #[test]
    fn load_after_ready_resolves_immediately() {
        let mut vault = TestVault::new(MemorySource::default());
        vault.load("a.png");
        settle(&mut vault, dims);

        let mut again = vault.load("a.png");
        assert!(matches!(again.try_outcome(), Some(Ok(()))));
        assert_eq!(vault.poll(dims), 0);
    }

    #[test]
    fn failed_read_is_reported_to_bind_and_ticket() {
        let mut vault = TestVault::new(MemorySource::default());
        let ticket = vault.load("broken.png");
        settle(&mut vault, dims);

        assert_eq!(vault.status("broken.png"), Some(TextureStatus::Failed));
        assert!(matches!(vault.bind("broken.png"), Err(TextureError::Failed { .. })));
        let err = ticket.wait().unwrap_err();
        // The stored reason carries the whole cause chain.
        assert!(err.to_string().contains("failed to read broken.png: corrupt"), "{err}");

        // Failures are sticky: no refetch.
        let mut retry = vault.load("broken.png");
        assert!(matches!(retry.try_outcome(), Some(Err(TextureError::Failed { .. }))));
    }

    #[test]
    fn undecodable_bytes_fail_the_entry() {
        let mut vault = TestVault::new(MemorySource::default());
        let ticket = vault.load("junk.png");
        settle(&mut vault, dims);

        assert_eq!(vault.status("junk.png"), Some(TextureStatus::Failed));
        let err = ticket.wait().unwrap_err();
        assert!(err.to_string().contains("failed to decode `junk.png`"), "{err}");
    }

    #[test]
    fn initialize_discards_in_flight_fetches() {
        let (src, open) = MemorySource::gated();
        let mut vault = TestVault::new(src);

        let ticket = vault.load("a.png");
        vault.initialize();
        assert!(vault.is_empty());

        drop(open);
        assert_eq!(settle(&mut vault, dims), 0);
        assert!(matches!(vault.bind("a.png"), Err(TextureError::NotRequested(_))));
        assert!(matches!(ticket.wait(), Err(TextureError::Discarded(_))));
    }

    #[test]
    fn dropping_vault_with_fetch_in_flight_returns() {
        let (src, open) = MemorySource::gated();
        let mut vault = TestVault::new(src);
        let ticket = vault.load("a.png");

        drop(vault);
        assert!(matches!(ticket.wait(), Err(TextureError::Discarded(_))));
        drop(open);
    }

    #[test]
    fn upload_callback_sees_filename() {
        let mut vault: TextureVault<String, MemorySource> = TextureVault::new(MemorySource::default());
        vault.load("b.png");
        settle(&mut vault, |name, _| name.to_uppercase());
        assert_eq!(vault.bind("b.png").map(String::as_str).ok(), Some("B.PNG"));
    }

    #[test]
    fn ticket_can_be_awaited() {
        let mut vault = TestVault::new(MemorySource::default());
        let ticket = vault.load("a.png");
        settle(&mut vault, dims);
        assert!(pollster::block_on(ticket.wait_async()).is_ok());
    }

    #[test]
    fn directory_vault_reports_missing_file() {
        let config = VaultConfig {
            root: std::env::temp_dir().join("prism-vault-missing"),
        };
        let mut vault: TextureVault<(u32, u32)> = TextureVault::from_config(&config);
        let ticket = vault.load("nope.png");
        settle(&mut vault, dims);
        let err = ticket.wait().unwrap_err();
        assert!(err.to_string().contains("failed to read"), "{err}");
    }
}
