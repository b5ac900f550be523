use super::neighbors::UpdateEffect;
use super::transport::PeerTransport;
use super::types::*;
use crate::directory::Directory;
use crate::error::{CanError, Result};
use crate::geometry::{Adjacency, PointDistance, SplitKind, Zone, keyword_point};
use crate::storage::{BlobStore, Shelf};

use futures::future::join_all;
use rand::Rng;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc, watch};

const UNASSIGNED: u64 = u64::MAX;

/// How long a joiner whose join request timed out keeps waiting for the
/// owner's zone assignment before giving up.
pub const ADOPTION_WAIT: Duration = Duration::from_secs(30);

/// Everything a routing decision or a split reads, guarded together.
#[derive(Debug, Default)]
pub struct NodeState {
    pub zone: Option<Zone>,
    pub neighbors: NeighborTable,
    pub data: DataIndex,
}

/// One participant of the overlay.
///
/// Owns at most one zone. Remote peers reach it through a `PeerTransport`;
/// the local driver (shell or test) calls `join`, `insert`, `search` and
/// `leave` directly.
pub struct PeerNode {
    this: Weak<PeerNode>,
    addr: SocketAddr,
    id: AtomicU64,
    state: Mutex<NodeState>,
    transport: Arc<dyn PeerTransport>,
    store: Arc<dyn BlobStore>,
    notices: mpsc::UnboundedSender<Notice>,
    joining: AtomicBool,
    /// Set once an assigned zone and its files have been taken over.
    adopted: watch::Sender<Option<Zone>>,
}

impl PeerNode {
    /// Creates an unjoined node. Path and error callbacks addressed to this
    /// node arrive on the returned receiver.
    pub fn new(
        addr: SocketAddr,
        transport: Arc<dyn PeerTransport>,
        store: Arc<dyn BlobStore>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<Notice>) {
        let (notices, receiver) = mpsc::unbounded_channel();
        let node = Arc::new_cyclic(|this| Self {
            this: this.clone(),
            addr,
            id: AtomicU64::new(UNASSIGNED),
            state: Mutex::new(NodeState::default()),
            transport,
            store,
            notices,
            joining: AtomicBool::new(false),
            adopted: watch::Sender::new(None),
        });
        (node, receiver)
    }

    /// Owned handle to this node, for work that must outlive its caller.
    fn strong(&self) -> Result<Arc<Self>> {
        self.this
            .upgrade()
            .ok_or_else(|| CanError::RemoteUnavailable(format!("{} is shutting down", self.label())))
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn id(&self) -> Option<PeerId> {
        match self.id.load(Ordering::SeqCst) {
            UNASSIGNED => None,
            raw => Some(PeerId(raw)),
        }
    }

    fn set_id(&self, id: Option<PeerId>) {
        self.id
            .store(id.map_or(UNASSIGNED, |id| id.0), Ordering::SeqCst);
    }

    /// Name used in logs and dumps.
    pub fn label(&self) -> String {
        self.id()
            .map_or_else(|| format!("unregistered@{}", self.addr), |id| id.to_string())
    }

    pub fn handle(&self) -> Result<PeerHandle> {
        self.id()
            .map(|id| PeerHandle::new(id, self.addr))
            .ok_or(CanError::NotJoined)
    }

    pub async fn zone(&self) -> Option<Zone> {
        self.state.lock().await.zone
    }

    pub async fn neighbors(&self) -> NeighborTable {
        self.state.lock().await.neighbors.clone()
    }

    pub async fn data_items(&self) -> DataIndex {
        self.state.lock().await.data.clone()
    }

    // ============================================================
    // REMOTE SURFACE
    // ============================================================

    pub fn get_id(&self) -> Result<PeerId> {
        self.id().ok_or(CanError::NotJoined)
    }

    pub async fn info(&self) -> String {
        let state = self.state.lock().await;
        let zone = state
            .zone
            .map_or_else(|| "none".to_string(), |zone| zone.to_string());
        let items: Vec<String> = state
            .data
            .iter()
            .map(|(key, names)| format!("  ({}) -> {}", key, names.join(" ")))
            .collect();

        let mut out = String::new();
        out.push_str("+++++++++++++++++++++++++++++++\n");
        out.push_str(&format!("Name      : {}\n", self.label()));
        out.push_str(&format!("Address   : {}\n", self.addr));
        out.push_str(&format!("Zone      : {}\n", zone));
        out.push_str(&format!("Neighbors : {}\n", state.neighbors.describe()));
        out.push_str("Data Items:\n");
        if items.is_empty() {
            out.push_str("  (none)\n");
        } else {
            out.push_str(&items.join("\n"));
            out.push('\n');
        }
        out.push_str("+++++++++++++++++++++++++++++++\n");
        out
    }

    /// How far this node's zone is from `(x, y)`, for next-hop selection.
    pub async fn dist_to_point(&self, x: f64, y: f64) -> Result<PointDistance> {
        let zone = self.state.lock().await.zone.ok_or(CanError::NotJoined)?;
        Ok(zone.distance_to(x, y))
    }

    /// Whether `zone` neighbors this node's current zone on the given side.
    pub async fn is_neighbor(&self, zone: &Zone, adjacency: Adjacency) -> Result<bool> {
        let own = self.state.lock().await.zone.ok_or(CanError::NotJoined)?;
        Ok(own.matches(zone, adjacency))
    }

    /// Records, moves or evicts the sender of `update` based on its new zone.
    pub async fn apply_update(&self, update: NeighborUpdate) -> Result<Status> {
        if Some(update.handle.id) == self.id() {
            return Ok(Status::Delivered);
        }

        let mut state = self.state.lock().await;
        let own = state.zone.ok_or(CanError::NotJoined)?;
        let effect = state
            .neighbors
            .apply_update(&own, &update.zone, update.handle);
        drop(state);

        match effect {
            UpdateEffect::Added(direction) => tracing::debug!(
                "{} added {} as {} neighbor ({})",
                self.label(),
                update.handle.id,
                direction,
                update.zone
            ),
            UpdateEffect::Evicted => tracing::debug!(
                "{} evicted {}, no longer adjacent ({})",
                self.label(),
                update.handle.id,
                update.zone
            ),
            UpdateEffect::Duplicate(_) | UpdateEffect::Ignored => {}
        }
        Ok(Status::Delivered)
    }

    /// Adopts a split-off zone and pulls the files that came with it.
    ///
    /// The zone, neighbors and index are installed before any file is pulled,
    /// and stay installed even if some pulls fail. The pulls run in their own
    /// task and finish even if the caller stops waiting for the reply.
    pub async fn assign_zone(&self, transfer: ZoneTransfer) -> Result<()> {
        let ZoneTransfer {
            zone,
            neighbors,
            data_items,
            pull_from,
        } = transfer;
        let mut names: Vec<String> = data_items.values().flatten().cloned().collect();
        names.sort();
        names.dedup();
        let node = self.strong()?;

        {
            let mut state = self.state.lock().await;
            if state.zone.is_some() {
                return Err(CanError::AlreadyJoined);
            }
            if !self.joining.load(Ordering::SeqCst) {
                return Err(CanError::Protocol(format!(
                    "{} is not waiting for a zone",
                    self.label()
                )));
            }
            state.zone = Some(zone);
            state.neighbors = neighbors;
            state.data = data_items;
        }
        tracing::info!(
            "{} adopted {} from {} ({} file(s) to pull)",
            self.label(),
            zone,
            pull_from.id,
            names.len()
        );

        tokio::spawn(async move { node.adopt(zone, names, pull_from).await })
            .await
            .map_err(|e| CanError::Protocol(format!("adoption of {} aborted: {}", zone, e)))?
    }

    /// Pulls the stored copies of `names`, then tells `from` which ones it may drop.
    async fn adopt(&self, zone: Zone, names: Vec<String>, from: PeerHandle) -> Result<()> {
        let mut pulled = Vec::new();
        let mut failed = Vec::new();
        for name in names {
            match self.pull_item(from, Shelf::Items, &name).await {
                Ok(()) => pulled.push(name),
                Err(e) => {
                    tracing::warn!("Failed to pull {} from {}: {}", name, from.id, e);
                    failed.push(name);
                }
            }
        }

        if !pulled.is_empty()
            && let Err(e) = self.transport.release_files(from, pulled).await
        {
            tracing::warn!("{} was not told to release migrated files: {}", from.id, e);
        }
        self.adopted.send_replace(Some(zone));

        if failed.is_empty() {
            Ok(())
        } else {
            Err(CanError::TransferPartialFailure { failed })
        }
    }

    /// Bytes of a file on `shelf`. Never touches the routing state.
    pub async fn download_file(&self, shelf: Shelf, name: &str) -> Result<Vec<u8>> {
        self.store.read(shelf, name).await
    }

    /// Drops local copies the adopting peer has pulled, except names this
    /// node still indexes under a key it kept.
    pub async fn release_files(&self, names: Vec<String>) -> Result<()> {
        for name in names {
            let still_indexed = self
                .state
                .lock()
                .await
                .data
                .values()
                .any(|indexed| indexed.contains(&name));
            if still_indexed {
                continue;
            }
            if let Err(e) = self.store.remove(Shelf::Items, &name).await {
                tracing::warn!("Failed to remove migrated file {}: {}", name, e);
            }
        }
        Ok(())
    }

    /// Display-only callback; logged and handed to the local driver.
    pub fn notify(&self, notice: Notice) {
        tracing::info!("{}", notice);
        if self.notices.send(notice).is_err() {
            tracing::debug!("{} has no notice listener", self.label());
        }
    }

    /// Routes `request` one hop further, or handles it if this zone owns the target.
    pub async fn send_message(&self, mut request: RoutingRequest) -> Result<Status> {
        let me = self.handle()?;
        if request.op != Operation::Join {
            request.path.push(me.id);
        }

        let state = self.state.lock().await;
        let zone = state.zone.ok_or(CanError::NotJoined)?;

        if !zone.contains_point(request.target_x, request.target_y) {
            let candidates = state.neighbors.all();
            drop(state);
            return Ok(self.forward(request, candidates).await);
        }

        match request.op {
            Operation::Join => {
                drop(state);
                // Admission finishes even if the caller stops waiting
                let node = self.strong()?;
                tokio::spawn(async move { node.admit(me, request).await })
                    .await
                    .map_err(|e| CanError::Protocol(format!("join admission aborted: {}", e)))
            }
            Operation::Insert => {
                drop(state);
                Ok(self.store_item(request).await)
            }
            Operation::Search => {
                let key = request.coordinate_key();
                let found = request.key_name.as_ref().is_some_and(|name| {
                    state
                        .data
                        .get(&key)
                        .is_some_and(|names| names.contains(name))
                });
                drop(state);
                Ok(self.answer_search(request, found).await)
            }
        }
    }

    // ============================================================
    // ROUTING
    // ============================================================

    /// Candidate whose zone is strictly closest to `target`.
    /// Ties keep the earlier candidate; unreachable candidates are skipped.
    async fn nearest(&self, candidates: &[PeerHandle], target: (f64, f64)) -> Option<PeerHandle> {
        let distances = join_all(
            candidates
                .iter()
                .map(|peer| self.transport.dist_to_point(*peer, target.0, target.1)),
        )
        .await;

        let mut best: Option<(PeerHandle, PointDistance)> = None;
        for (peer, distance) in candidates.iter().zip(distances) {
            match distance {
                Ok(d) => {
                    if best.is_none_or(|(_, closest)| d.closer_than(&closest)) {
                        best = Some((*peer, d));
                    }
                }
                Err(e) => tracing::warn!("Failed to get distance from {}: {}", peer.id, e),
            }
        }
        best.map(|(peer, _)| peer)
    }

    async fn forward(&self, request: RoutingRequest, candidates: Vec<PeerHandle>) -> Status {
        let origin = request.originator;
        let target = (request.target_x, request.target_y);

        let Some(next) = self.nearest(&candidates, target).await else {
            let reason = format!(
                "{} has no reachable neighbor toward ({}, {})",
                self.label(),
                target.0,
                target.1
            );
            tracing::warn!("{}", reason);
            self.report(origin, Notice::Error(reason)).await;
            return Status::Dropped;
        };

        tracing::debug!(
            "{} forwarding {:?} for ({}, {}) to {}",
            self.label(),
            request.op,
            target.0,
            target.1,
            next.id
        );

        match self.transport.send_message(next, request).await {
            Ok(status) => status,
            Err(e) => {
                let reason = format!("{} failed to forward to {}: {}", self.label(), next.id, e);
                tracing::warn!("{}", reason);
                self.report(origin, Notice::Error(reason)).await;
                Status::Dropped
            }
        }
    }

    /// Best-effort callback to the originator of a request.
    async fn report(&self, origin: PeerHandle, notice: Notice) {
        if let Err(e) = self.transport.notify(origin, notice).await {
            tracing::warn!("Failed to notify {}: {}", origin.id, e);
        }
    }

    async fn broadcast(&self, targets: &[PeerHandle], update: NeighborUpdate) {
        let mut unique: Vec<PeerHandle> = Vec::new();
        for target in targets {
            if !unique.contains(target) {
                unique.push(*target);
            }
        }

        let results = join_all(
            unique
                .iter()
                .map(|peer| self.transport.send_update(*peer, update.clone())),
        )
        .await;

        for (peer, result) in unique.iter().zip(results) {
            if let Err(e) = result {
                tracing::warn!(
                    "Failed to send update about {} to {}: {}",
                    update.handle.id,
                    peer.id,
                    e
                );
            }
        }
    }

    // ============================================================
    // JOIN ADMISSION
    // ============================================================

    /// Splits this zone and hands the new half to the originator of `request`.
    ///
    /// The state lock is held from the split until the data partition is done,
    /// then released before the joiner and its neighbors are contacted. If the
    /// zone no longer holds the target once the lock is taken, the request
    /// moves on instead.
    async fn admit(&self, me: PeerHandle, request: RoutingRequest) -> Status {
        let joiner = request.originator;
        let mut state = self.state.lock().await;
        let owned = state.zone;
        let Some(zone) = owned else {
            drop(state);
            self.report(joiner, Notice::Error(format!("{} lost its zone", self.label())))
                .await;
            return Status::Dropped;
        };
        if !zone.contains_point(request.target_x, request.target_y) {
            let candidates = state.neighbors.all();
            drop(state);
            return self.forward(request, candidates).await;
        }

        if joiner == me {
            drop(state);
            self.report(joiner, Notice::Error("a peer cannot join itself".to_string()))
                .await;
            return Status::Dropped;
        }

        let mut kept = zone;
        let (kind, handed) = kept.split();
        state.zone = Some(kept);
        tracing::info!(
            "{} split {} for {}: keeps {}, hands over {}",
            self.label(),
            zone,
            joiner.id,
            kept,
            handed
        );

        // Current neighbors learn where this zone now ends
        let current = state.neighbors.all();
        self.broadcast(&current, NeighborUpdate { zone: kept, handle: me })
            .await;

        let handed_neighbors = self
            .partition_neighbors(&mut state.neighbors, kind, kept, handed, me, joiner)
            .await;
        let handed_items = take_items_outside(&mut state.data, &kept);
        drop(state);

        let announce: Vec<PeerHandle> = handed_neighbors
            .all()
            .into_iter()
            .filter(|peer| *peer != me)
            .collect();
        self.broadcast(
            &announce,
            NeighborUpdate {
                zone: handed,
                handle: joiner,
            },
        )
        .await;

        let transfer = ZoneTransfer {
            zone: handed,
            neighbors: handed_neighbors,
            data_items: handed_items,
            pull_from: me,
        };

        // The joiner releases the files it pulled; the rest stay here
        match self.transport.assign_zone(joiner, transfer).await {
            Ok(()) => Status::Delivered,
            Err(CanError::TransferPartialFailure { failed }) => {
                tracing::warn!(
                    "{} could not pull {} file(s) from {}; keeping local copies",
                    joiner.id,
                    failed.len(),
                    self.label()
                );
                Status::Delivered
            }
            Err(CanError::Timeout) => {
                tracing::warn!(
                    "{} has not confirmed {} in time; its pulls continue",
                    joiner.id,
                    handed
                );
                Status::Delivered
            }
            Err(e) => {
                tracing::error!(
                    "{} gave up {} but {} never adopted it: {}",
                    self.label(),
                    handed,
                    joiner.id,
                    e
                );
                self.report(joiner, Notice::Error(format!("zone assignment failed: {}", e)))
                    .await;
                Status::Dropped
            }
        }
    }

    /// Rebuilds the owner's table after a split and returns the joiner's table.
    ///
    /// Neighbors on the sibling side move to the joiner wholesale. Neighbors on
    /// the two sides the halves share are asked whether they touch each half.
    async fn partition_neighbors(
        &self,
        table: &mut NeighborTable,
        kind: SplitKind,
        kept: Zone,
        handed: Zone,
        me: PeerHandle,
        joiner: PeerHandle,
    ) -> NeighborTable {
        let sibling_side = kind.sibling_side();
        let mut joiner_table = NeighborTable::default();
        *joiner_table.side_mut(sibling_side) = table.side(sibling_side).clone();

        for side in kind.shared_sides() {
            let facing = Adjacency::Side(side.opposite());
            let mut keep = Vec::new();

            for neighbor in table.side(side).clone() {
                let (touches_handed, touches_kept) = tokio::join!(
                    self.transport.is_neighbor(neighbor, handed, facing),
                    self.transport.is_neighbor(neighbor, kept, facing),
                );

                match touches_handed {
                    Ok(true) => joiner_table.side_mut(side).push(neighbor),
                    Ok(false) => {}
                    Err(e) => tracing::warn!(
                        "Adjacency query to {} failed, not handing it over: {}",
                        neighbor.id,
                        e
                    ),
                }

                match touches_kept {
                    Ok(false) => {}
                    Ok(true) => keep.push(neighbor),
                    Err(e) => {
                        tracing::warn!(
                            "Adjacency query to {} failed, keeping it: {}",
                            neighbor.id,
                            e
                        );
                        keep.push(neighbor);
                    }
                }
            }
            *table.side_mut(side) = keep;
        }

        *joiner_table.side_mut(sibling_side.opposite()) = vec![me];
        *table.side_mut(sibling_side) = vec![joiner];
        joiner_table
    }

    // ============================================================
    // DATA OPERATIONS (owner side)
    // ============================================================

    async fn pull_item(&self, from: PeerHandle, shelf: Shelf, name: &str) -> Result<()> {
        let bytes = self
            .transport
            .download_file(from, shelf, name.to_string())
            .await?;
        self.store.write(Shelf::Items, name, bytes).await
    }

    async fn store_item(&self, request: RoutingRequest) -> Status {
        let origin = request.originator;
        let Some(name) = request.key_name.clone() else {
            self.report(origin, Notice::Error("insert without a file name".to_string()))
                .await;
            return Status::Dropped;
        };

        if let Err(e) = self.pull_item(origin, Shelf::Outbox, &name).await {
            let reason = format!("{} failed to pull {} from {}: {}", self.label(), name, origin.id, e);
            tracing::warn!("{}", reason);
            self.report(origin, Notice::Error(reason)).await;
            return Status::Dropped;
        }

        let key = request.coordinate_key();
        {
            let mut state = self.state.lock().await;
            let names = state.data.entry(key.clone()).or_default();
            if !names.contains(&name) {
                names.push(name.clone());
            }
        }
        tracing::info!("{} stored {} at ({})", self.label(), name, key);

        self.report(origin, Notice::Path(request.path)).await;
        Status::Delivered
    }

    async fn answer_search(&self, request: RoutingRequest, found: bool) -> Status {
        let origin = request.originator;
        if found {
            self.report(origin, Notice::Path(request.path)).await;
            Status::Delivered
        } else {
            self.report(origin, Notice::Error("File not found!".to_string()))
                .await;
            Status::NotFound
        }
    }

    // ============================================================
    // DRIVER OPERATIONS
    // ============================================================

    /// Joins at a uniformly random point of the space.
    pub async fn join(&self, directory: &dyn Directory) -> Result<Zone> {
        let target = {
            let mut rng = rand::thread_rng();
            (
                rng.gen_range(0.0..crate::geometry::WIDTH_MAX),
                rng.gen_range(0.0..crate::geometry::HEIGHT_MAX),
            )
        };
        self.join_at(directory, target).await
    }

    /// Joins by asking whoever owns `target` to split its zone.
    pub async fn join_at(&self, directory: &dyn Directory, target: (f64, f64)) -> Result<Zone> {
        if self.state.lock().await.zone.is_some() {
            return Err(CanError::AlreadyJoined);
        }
        if self.joining.swap(true, Ordering::SeqCst) {
            return Err(CanError::AlreadyJoined);
        }

        let result = self.run_join(directory, target).await;
        self.joining.store(false, Ordering::SeqCst);
        result
    }

    async fn run_join(&self, directory: &dyn Directory, target: (f64, f64)) -> Result<Zone> {
        let bootstrap = directory.sample_bootstrap_peers().await?;
        let id = directory.register(self.addr).await?;
        self.set_id(Some(id));
        let me = PeerHandle::new(id, self.addr);

        if bootstrap.is_empty() {
            let zone = Zone::full();
            self.state.lock().await.zone = Some(zone);
            self.adopted.send_replace(Some(zone));
            tracing::info!("{} is the first peer and owns {}", id, zone);
            return Ok(zone);
        }

        tracing::info!(
            "{} joining at ({:.3}, {:.3}) via {} bootstrap peer(s)",
            id,
            target.0,
            target.1,
            bootstrap.len()
        );

        let outcome = match self.nearest(&bootstrap, target).await {
            Some(entry) => {
                self.transport
                    .send_message(entry, RoutingRequest::join(target, me))
                    .await
            }
            None => Err(CanError::RemoteUnavailable(
                "no bootstrap peer answered".to_string(),
            )),
        };

        // A timed-out request may still have been admitted
        let adopted = match &outcome {
            Ok(Status::Delivered) | Err(CanError::Timeout) => self.await_adoption().await,
            _ => None,
        };
        let installed = self.state.lock().await.zone;
        if let Some(zone) = adopted.or(installed) {
            return Ok(zone);
        }

        // Never stay listed as a bootstrap peer without a zone
        if let Err(e) = directory.deregister(id).await {
            tracing::warn!("Failed to deregister {} after a failed join: {}", id, e);
        }
        self.set_id(None);

        match outcome {
            Ok(status) => Err(CanError::RemoteUnavailable(format!(
                "join request ended {:?} without a zone",
                status
            ))),
            Err(e) => Err(e),
        }
    }

    async fn await_adoption(&self) -> Option<Zone> {
        let mut adopted = self.adopted.subscribe();
        match tokio::time::timeout(ADOPTION_WAIT, adopted.wait_for(Option::is_some)).await {
            Ok(Ok(zone)) => *zone,
            _ => None,
        }
    }

    /// Inserts the file at `source` under `keyword`.
    pub async fn insert(
        &self,
        directory: &dyn Directory,
        keyword: &str,
        source: &Path,
        start: Option<PeerId>,
    ) -> Result<Status> {
        let name = file_name(source)?;
        let bytes = tokio::fs::read(source).await?;
        self.insert_bytes(directory, keyword, &name, bytes, start)
            .await
    }

    /// Stages `bytes` as `name` and routes an insert for it.
    ///
    /// The staged copy is removed once the owner has pulled and stored it.
    pub async fn insert_bytes(
        &self,
        directory: &dyn Directory,
        keyword: &str,
        name: &str,
        bytes: Vec<u8>,
        start: Option<PeerId>,
    ) -> Result<Status> {
        let me = self.joined_handle().await?;
        self.store.write(Shelf::Outbox, name, bytes).await?;

        let request = RoutingRequest::insert(keyword_point(keyword), me, name);
        let status = self.dispatch(directory, request, start).await?;

        if status == Status::Delivered
            && let Err(e) = self.store.remove(Shelf::Outbox, name).await
        {
            tracing::warn!("Failed to remove staged copy of {}: {}", name, e);
        }
        Ok(status)
    }

    /// Looks up `name` under `keyword`. The answer also arrives as a notice.
    pub async fn search(
        &self,
        directory: &dyn Directory,
        keyword: &str,
        name: &str,
        start: Option<PeerId>,
    ) -> Result<Status> {
        let me = self.joined_handle().await?;
        let request = RoutingRequest::search(keyword_point(keyword), me, name);
        self.dispatch(directory, request, start).await
    }

    /// Deregisters from the directory. The zone is not handed over.
    pub async fn leave(&self, directory: &dyn Directory) -> Result<()> {
        let id = self.get_id()?;
        directory.deregister(id).await?;
        tracing::info!("{} left the overlay", id);
        Ok(())
    }

    async fn joined_handle(&self) -> Result<PeerHandle> {
        if self.state.lock().await.zone.is_none() {
            return Err(CanError::NotJoined);
        }
        self.handle()
    }

    async fn dispatch(
        &self,
        directory: &dyn Directory,
        request: RoutingRequest,
        start: Option<PeerId>,
    ) -> Result<Status> {
        match start {
            None => self.send_message(request).await,
            Some(id) => {
                let entry = directory.lookup(id).await?;
                self.transport.send_message(entry, request).await
            }
        }
    }
}

/// Removes and returns every index entry whose point lies outside `kept`.
fn take_items_outside(data: &mut DataIndex, kept: &Zone) -> DataIndex {
    let leaving: Vec<CoordinateKey> = data
        .keys()
        .filter(|key| matches!(key.point(), Some((x, y)) if !kept.contains_point(x, y)))
        .cloned()
        .collect();

    leaving
        .into_iter()
        .filter_map(|key| data.remove(&key).map(|names| (key, names)))
        .collect()
}

/// Final path component of `path`, which becomes the stored file name.
pub fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| CanError::NotFound(format!("{} has no file name", path.display())))
}
