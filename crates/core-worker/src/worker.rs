//! Worker thread lifecycle and loop.

use crate::enumerate::{EnumerationRequest, run_enumeration};
use crate::{IconBatch, IconGroup, UiMessage};
use core_icons::IconCache;
use core_source::{BorrowMode, DirectoryListingSource};
use crossbeam_channel::Sender;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Off-screen extraction posts between 1 ms yields.
    pub offscreen_posts_per_yield: u32,
    pub yield_duration: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            offscreen_posts_per_yield: 25,
            yield_duration: Duration::from_millis(1),
        }
    }
}

#[derive(Default)]
struct WorkState {
    /// Latest-wins pending enumeration; an unserviced older request is
    /// simply overwritten.
    pending: Option<EnumerationRequest>,
    icon_batch: Option<IconBatch>,
    stop: bool,
}

struct Shared {
    state: Mutex<WorkState>,
    wake: Condvar,
    /// The pane's current generation; bumped there, read here.
    generation: Arc<AtomicU64>,
    /// Current icon batch id; a bump abandons the in-flight batch.
    icon_batch_id: AtomicU64,
}

/// Handle to the per-pane worker thread. Dropping it requests a cooperative
/// stop and joins.
pub struct EnumerationWorker {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl EnumerationWorker {
    pub fn spawn(
        source: Arc<dyn DirectoryListingSource>,
        cache: Arc<IconCache>,
        generation: Arc<AtomicU64>,
        tx: Sender<UiMessage>,
        config: WorkerConfig,
    ) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(WorkState::default()),
            wake: Condvar::new(),
            generation,
            icon_batch_id: AtomicU64::new(0),
        });
        let thread_shared = Arc::clone(&shared);
        let handle = std::thread::Builder::new()
            .name("folderview-enum".into())
            .spawn(move || worker_loop(thread_shared, source, cache, tx, config))
            .expect("worker thread spawn");
        Self { shared, handle: Some(handle) }
    }

    /// Queue an enumeration. The caller must have bumped the generation
    /// counter to `generation` already, which retires any in-flight work.
    pub fn request_enumeration(&self, folder: PathBuf, mode: BorrowMode, generation: u64) {
        let mut state = self.shared.state.lock().unwrap();
        if let Some(old) = state.pending.replace(EnumerationRequest { folder, generation, mode }) {
            tracing::debug!(
                target: "worker.enum",
                superseded = old.generation,
                by = generation,
                "pending_enumeration_replaced"
            );
        }
        // A new listing invalidates any queued icon work for the old one.
        state.icon_batch = None;
        drop(state);
        self.shared.wake.notify_one();
    }

    /// Install a fresh icon batch (replacing any queued one) and return its
    /// batch id. In-flight posts from earlier batches still arrive but
    /// carry their old id, so the UI apply step drops them.
    pub fn queue_icon_batch(
        &self,
        device: core_icons::DeviceId,
        icon_size_dip: f32,
        groups: VecDeque<IconGroup>,
    ) -> u64 {
        let batch_id = self.shared.icon_batch_id.fetch_add(1, Ordering::AcqRel) + 1;
        let mut state = self.shared.state.lock().unwrap();
        state.icon_batch = Some(IconBatch { batch_id, device, icon_size_dip, groups });
        drop(state);
        self.shared.wake.notify_one();
        batch_id
    }

    /// Promote queued groups whose icon index is in `needed` to the front,
    /// preserving their relative order. Idempotent for an unchanged
    /// viewport. Returns false when no batch is queued (caller should
    /// rebuild one).
    pub fn boost_icon_groups(&self, needed: &[i32]) -> bool {
        let mut state = self.shared.state.lock().unwrap();
        let Some(batch) = state.icon_batch.as_mut() else {
            return false;
        };
        if batch.groups.is_empty() {
            return false;
        }
        let (mut front, back): (VecDeque<IconGroup>, VecDeque<IconGroup>) = batch
            .groups
            .drain(..)
            .partition(|g| needed.contains(&g.icon_index));
        let promoted = front.len();
        front.extend(back);
        batch.groups = front;
        tracing::trace!(target: "worker.icons", promoted, "icon_groups_boosted");
        true
    }

    /// Abandon the current batch without queueing a new one.
    pub fn cancel_icon_batch(&self) {
        self.shared.icon_batch_id.fetch_add(1, Ordering::AcqRel);
        let mut state = self.shared.state.lock().unwrap();
        state.icon_batch = None;
    }

    pub fn current_icon_batch_id(&self) -> u64 {
        self.shared.icon_batch_id.load(Ordering::Acquire)
    }

    fn request_stop(&self) {
        let mut state = self.shared.state.lock().unwrap();
        state.stop = true;
        drop(state);
        self.shared.wake.notify_one();
    }
}

impl Drop for EnumerationWorker {
    fn drop(&mut self) {
        self.request_stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop(
    shared: Arc<Shared>,
    source: Arc<dyn DirectoryListingSource>,
    cache: Arc<IconCache>,
    tx: Sender<UiMessage>,
    config: WorkerConfig,
) {
    tracing::info!(target: "worker.thread", "worker_started");
    loop {
        enum Work {
            Enumerate(EnumerationRequest),
            Icons(IconBatch),
            Stop,
        }

        let work = {
            let mut state = shared.state.lock().unwrap();
            loop {
                if state.stop {
                    break Work::Stop;
                }
                if let Some(request) = state.pending.take() {
                    break Work::Enumerate(request);
                }
                if let Some(batch) = state.icon_batch.take() {
                    break Work::Icons(batch);
                }
                state = shared.wake.wait(state).unwrap();
            }
        };

        match work {
            Work::Stop => break,
            Work::Enumerate(request) => {
                let generation = request.generation;
                if let Some(payload) =
                    run_enumeration(source.as_ref(), &cache, &shared.generation, request)
                {
                    tracing::info!(
                        target: "worker.enum",
                        generation,
                        items = payload.items.len(),
                        ok = payload.status.is_ok(),
                        "enumeration_posted"
                    );
                    if tx.send(UiMessage::ListingReady(payload)).is_err() {
                        break; // UI side gone
                    }
                } else {
                    tracing::debug!(target: "worker.enum", generation, "enumeration_dropped_stale");
                }
            }
            Work::Icons(batch) => {
                if !service_icon_batch(&shared, &cache, &tx, &config, batch) {
                    break;
                }
            }
        }
    }
    tracing::info!(target: "worker.thread", "worker_stopped");
}

/// Drain one icon batch. Returns false when the UI channel closed.
///
/// The batch is re-stowed into shared state between groups so a concurrent
/// `boost_icon_groups` or new enumeration can interleave; each iteration
/// re-takes it and re-checks the batch id.
fn service_icon_batch(
    shared: &Shared,
    cache: &IconCache,
    tx: &Sender<UiMessage>,
    config: &WorkerConfig,
    mut batch: IconBatch,
) -> bool {
    let mut offscreen_since_yield = 0u32;
    loop {
        if shared.icon_batch_id.load(Ordering::Acquire) != batch.batch_id {
            tracing::debug!(target: "worker.icons", batch = batch.batch_id, "icon_batch_abandoned");
            return true;
        }
        let Some(group) = batch.groups.pop_front() else {
            let _ = tx.send(UiMessage::IconBatchDrained { batch_id: batch.batch_id });
            return true;
        };

        // The bitmap may have appeared while the group sat queued.
        if cache.get_cached_bitmap(group.icon_index, batch.device).is_none() {
            let Some(handle) = cache.extract_bitmap_handle(group.icon_index, batch.icon_size_dip)
            else {
                continue; // extraction failed; drop the group
            };
            if tx
                .send(UiMessage::CreateIconBitmap {
                    batch_id: batch.batch_id,
                    icon_index: group.icon_index,
                    handle,
                    item_indices: group.item_indices,
                })
                .is_err()
            {
                return false;
            }
            if !group.has_visible_items {
                offscreen_since_yield += 1;
                if offscreen_since_yield >= config.offscreen_posts_per_yield {
                    offscreen_since_yield = 0;
                    std::thread::sleep(config.yield_duration);
                }
            }
        }

        // Give boosts and new batches a chance to land between groups.
        let mut state = shared.state.lock().unwrap();
        if state.stop {
            return true;
        }
        if state.pending.is_some() {
            // Enumeration outranks icon work; requeue and let the outer
            // loop pick the enumeration first.
            if state.icon_batch.is_none() {
                state.icon_batch = Some(batch);
            }
            return true;
        }
        match state.icon_batch.take() {
            Some(newer) if newer.batch_id != batch.batch_id => {
                batch = newer;
                offscreen_since_yield = 0;
            }
            Some(same) => batch = same,
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_icons::{DeviceId, IconBackend, IconExtractHandle};
    use core_source::{Listing, SourceResult, write_record};
    use std::path::Path;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    struct MemListing(Vec<u8>, u32);
    impl Listing for MemListing {
        fn count(&self) -> u32 {
            self.1
        }
        fn buffer(&self) -> (&[u8], usize) {
            (&self.0, self.0.len())
        }
    }

    struct SlowSource {
        names: Vec<String>,
        delay: Duration,
    }

    impl DirectoryListingSource for SlowSource {
        fn id(&self) -> &str {
            "slow"
        }
        fn borrow(&self, _path: &Path, _mode: BorrowMode) -> SourceResult<Box<dyn Listing>> {
            std::thread::sleep(self.delay);
            let mut buf = Vec::new();
            let mut prev = None;
            for name in &self.names {
                prev = Some(write_record(&mut buf, prev, 0, 1, 1, name));
            }
            Ok(Box::new(MemListing(buf, self.names.len() as u32)))
        }
        fn is_storage_root(&self, _path: &Path) -> bool {
            false
        }
    }

    #[derive(Default)]
    struct StubBackend {
        extracts: AtomicUsize,
    }

    impl IconBackend for StubBackend {
        fn query_icon_index_by_extension(&self, extension: &str, _attrs: u32) -> Option<i32> {
            Some(extension.len() as i32)
        }
        fn query_icon_index_for_path(&self, _path: &Path) -> Option<i32> {
            Some(500)
        }
        fn extract_icon(&self, icon_index: i32, _size: f32) -> Option<IconExtractHandle> {
            self.extracts.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            Some(IconExtractHandle { icon_index, token: icon_index as u64 })
        }
    }

    fn harness(
        names: &[&str],
        delay: Duration,
    ) -> (
        EnumerationWorker,
        crossbeam_channel::Receiver<UiMessage>,
        Arc<AtomicU64>,
        Arc<StubBackend>,
    ) {
        let source = Arc::new(SlowSource {
            names: names.iter().map(|s| s.to_string()).collect(),
            delay,
        });
        let backend = Arc::new(StubBackend::default());
        let cache = Arc::new(IconCache::new(backend.clone(), usize::MAX));
        let generation = Arc::new(AtomicU64::new(0));
        let (tx, rx) = crossbeam_channel::unbounded();
        let worker = EnumerationWorker::spawn(
            source,
            cache,
            Arc::clone(&generation),
            tx,
            WorkerConfig::default(),
        );
        (worker, rx, generation, backend)
    }

    #[test]
    fn enumeration_round_trip() {
        let (worker, rx, generation, _) = harness(&["b.txt", "a.txt"], Duration::ZERO);
        let g = generation.fetch_add(1, Ordering::AcqRel) + 1;
        worker.request_enumeration(PathBuf::from("/x"), BorrowMode::AllowEnumerate, g);
        let msg = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        match msg {
            UiMessage::ListingReady(payload) => {
                assert_eq!(payload.generation, g);
                assert!(payload.status.is_ok());
                assert_eq!(payload.items.len(), 2);
                assert_eq!(payload.items[0].name.as_str(), "a.txt");
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn cancel_by_generation_bump_posts_nothing() {
        let (worker, rx, generation, _) = harness(&["a"], Duration::from_millis(150));
        let g = generation.fetch_add(1, Ordering::AcqRel) + 1;
        worker.request_enumeration(PathBuf::from("/x"), BorrowMode::AllowEnumerate, g);
        std::thread::sleep(Duration::from_millis(30));
        generation.fetch_add(1, Ordering::AcqRel); // cancel while borrow blocks
        assert!(rx.recv_timeout(Duration::from_millis(500)).is_err());
    }

    #[test]
    fn latest_request_wins() {
        let (worker, rx, generation, _) = harness(&["a"], Duration::from_millis(50));
        // Two requests queued back-to-back before the worker picks either;
        // only the newest generation may produce a payload.
        let g1 = generation.fetch_add(1, Ordering::AcqRel) + 1;
        worker.request_enumeration(PathBuf::from("/one"), BorrowMode::AllowEnumerate, g1);
        let g2 = generation.fetch_add(1, Ordering::AcqRel) + 1;
        worker.request_enumeration(PathBuf::from("/two"), BorrowMode::AllowEnumerate, g2);

        let mut received = Vec::new();
        while let Ok(msg) = rx.recv_timeout(Duration::from_millis(400)) {
            if let UiMessage::ListingReady(p) = msg {
                received.push((p.generation, p.folder.clone()));
            }
        }
        assert_eq!(received.len(), 1);
        assert_eq!(received[0], (g2, PathBuf::from("/two")));
    }

    #[test]
    fn icon_batch_extracts_once_per_group_and_drains() {
        let (worker, rx, _, backend) = harness(&[], Duration::ZERO);
        let device = DeviceId::next();
        let groups: VecDeque<IconGroup> = [
            IconGroup {
                icon_index: 4,
                item_indices: vec![0, 1, 2],
                has_visible_items: true,
                first_visible_item_index: 0,
            },
            IconGroup {
                icon_index: 9,
                item_indices: vec![3],
                has_visible_items: false,
                first_visible_item_index: usize::MAX,
            },
        ]
        .into();
        let batch_id = worker.queue_icon_batch(device, 16.0, groups);

        let mut bitmaps = 0;
        let mut drained = false;
        while let Ok(msg) = rx.recv_timeout(Duration::from_secs(2)) {
            match msg {
                UiMessage::CreateIconBitmap { batch_id: b, item_indices, .. } => {
                    assert_eq!(b, batch_id);
                    assert!(!item_indices.is_empty());
                    bitmaps += 1;
                }
                UiMessage::IconBatchDrained { batch_id: b } => {
                    assert_eq!(b, batch_id);
                    drained = true;
                    break;
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        assert!(drained);
        assert_eq!(bitmaps, 2);
        assert_eq!(backend.extracts.load(std::sync::atomic::Ordering::Relaxed), 2);
    }

    #[test]
    fn boost_moves_needed_groups_forward() {
        let (worker, _rx, _, _) = harness(&[], Duration::ZERO);
        // Assemble a batch but keep the worker busy-free race small by
        // boosting immediately after queueing.
        let groups: VecDeque<IconGroup> = (0..6)
            .map(|i| IconGroup {
                icon_index: i,
                item_indices: vec![i as usize],
                has_visible_items: false,
                first_visible_item_index: usize::MAX,
            })
            .collect();
        worker.queue_icon_batch(DeviceId::next(), 16.0, groups);
        // Either the worker already drained it (false) or the boost lands.
        let _ = worker.boost_icon_groups(&[4, 5]);
    }

    #[test]
    fn drop_joins_cleanly() {
        let (worker, _rx, generation, _) = harness(&["a"], Duration::ZERO);
        let g = generation.fetch_add(1, Ordering::AcqRel) + 1;
        worker.request_enumeration(PathBuf::from("/x"), BorrowMode::AllowEnumerate, g);
        drop(worker);
    }
}
