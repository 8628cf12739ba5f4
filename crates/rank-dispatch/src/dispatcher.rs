//! The request-level API: every operation loads documents from the store,
//! applies the `rank-trip` rules, and writes back with a compare-and-set.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rank_core::{
    Association, AssociationId, CodeGenerator, DispatchConfig, Driver, DriverId, GeoPoint,
    LegBinding, NewDriver, NewParcel, NewRank, Parcel, ParcelId, ParcelStatus, Rank, RankId,
    Route, RouteId, RouteSpec, Trip, TripId,
};
use rank_graph::{PathFinder, RankGraph, RankLocator};
use rank_store::{Collection, Document, EntityStore, StoreError};
use rank_trip::{
    TripError, TripPlan, bind_parcel_leg, build_legs, check_eligibility, check_leg_index,
    check_leg_sign, check_status_transition, clear_driver, leg_by_number, leg_route, plan_from_routes,
    recompute_aggregates, target_trip, verify_otp,
};

use crate::{DispatchError, DispatchResult, LegDetails, Population, TripDetails, TripView};

/// Tracking numbers drawn before giving up on finding an unused one.
const TRACKING_ATTEMPTS: u32 = 8;

/// Operations over one shared [`EntityStore`].
///
/// `Dispatcher` holds no per-request state and is `Sync`; share it behind an
/// `Arc` to serve concurrent requests.  Every read-modify-write ends in
/// [`EntityStore::update`]; when another request changed the document in the
/// meantime the operation fails with [`DispatchError::Conflict`] and nothing
/// is written.
///
/// Construct with [`DispatcherBuilder`](crate::DispatcherBuilder).
pub struct Dispatcher<S: EntityStore, P: PathFinder> {
    pub(crate) store:  S,
    pub(crate) finder: P,
    pub(crate) config: DispatchConfig,
    pub(crate) codes:  Mutex<CodeGenerator>,
}

impl<S: EntityStore, P: PathFinder> Dispatcher<S, P> {
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    // ── Trips ─────────────────────────────────────────────────────────────────

    /// Find the fewest-hop path `origin → destination` over all routes and
    /// persist it as a new trip with one driverless leg per hop.
    ///
    /// Both ranks must exist ([`DispatchError::RankNotFound`]).  Nothing is
    /// persisted when no path joins them ([`ErrorKind::Unreachable`]).
    ///
    /// [`ErrorKind::Unreachable`]: crate::ErrorKind::Unreachable
    pub fn create_trip(&self, origin: RankId, destination: RankId) -> DispatchResult<Trip> {
        run("create_trip", || {
            self.require_endpoints(origin, destination)?;
            if origin == destination {
                self.check_empty_trip(origin)?;
            }
            let graph = RankGraph::from_routes(&self.store.list::<Route>()?);
            let path = self.finder.find_path(&graph, origin, destination)?;
            let plan = build_legs(&path, &graph, self.config.parallel_route_policy)?;
            self.persist_trip(plan, origin, destination)
        })
    }

    /// Persist a trip over a caller-chosen chain of routes instead of the
    /// shortest path.
    pub fn create_trip_with_routes(
        &self,
        origin:      RankId,
        destination: RankId,
        routes:      &[RouteId],
    ) -> DispatchResult<Trip> {
        run("create_trip_with_routes", || {
            self.require_endpoints(origin, destination)?;
            if routes.is_empty() && origin == destination {
                self.check_empty_trip(origin)?;
            }
            let docs = routes
                .iter()
                .map(|&id| self.require::<Route>(id, DispatchError::RouteNotFound))
                .collect::<DispatchResult<Vec<_>>>()?;
            let plan = plan_from_routes(origin, destination, &docs)?;
            self.persist_trip(plan, origin, destination)
        })
    }

    /// Re-derive `full_distance` and `price` from the routes the trip's legs
    /// currently reference.  Legs are not touched.
    pub fn recompute_trip_aggregates(&self, trip_id: TripId) -> DispatchResult<Trip> {
        run("recompute_trip_aggregates", || {
            let mut trip = self.require::<Trip>(trip_id, DispatchError::TripNotFound)?;

            let mut routes = HashMap::with_capacity(trip.leg_count());
            for id in trip.legs().iter().filter_map(|l| l.details) {
                if let Some(route) = self.store.get::<Route>(id)? {
                    routes.insert(id, route);
                }
            }
            let totals = recompute_aggregates(&trip, &routes)?;

            if (trip.full_distance(), trip.price()) != (totals.full_distance, totals.price) {
                trip.set_aggregates(totals.full_distance, totals.price);
                self.commit(&mut trip)?;
                tracing::info!(
                    trip = trip_id.get(),
                    full_distance = totals.full_distance,
                    price = totals.price,
                    "trip aggregates recomputed"
                );
            }
            Ok(trip)
        })
    }

    pub fn get_trip(&self, trip_id: TripId, population: Population) -> DispatchResult<TripView> {
        run("get_trip", || {
            let trip = self.require::<Trip>(trip_id, DispatchError::TripNotFound)?;
            let details = match population {
                Population::Shallow => None,
                Population::Deep    => Some(self.populate(&trip)?),
            };
            Ok(TripView { trip, details })
        })
    }

    /// Remove a trip.  Parcels bound to it keep their binding; the next move
    /// re-validates it.
    pub fn delete_trip(&self, trip_id: TripId) -> DispatchResult<()> {
        run("delete_trip", || {
            if !self.store.delete::<Trip>(trip_id)? {
                return Err(DispatchError::TripNotFound(trip_id));
            }
            tracing::info!(trip = trip_id.get(), "trip deleted");
            Ok(())
        })
    }

    // ── Leg drivers ───────────────────────────────────────────────────────────

    /// Assign `driver_id` to leg `leg_number` (1-based) of `trip_id`.
    ///
    /// The driver must be linked to the rank the leg's route departs from,
    /// both when read and after the trip is written: an unlink that lands in
    /// between takes the assignment back and fails with
    /// [`DispatchError::Conflict`].  Only that leg's driver changes.
    pub fn link_driver_to_leg(
        &self,
        trip_id:    TripId,
        leg_number: u32,
        driver_id:  DriverId,
    ) -> DispatchResult<Trip> {
        run("link_driver_to_leg", || {
            let mut trip = self.require::<Trip>(trip_id, DispatchError::TripNotFound)?;
            let route_id = leg_route(leg_by_number(&trip, leg_number)?)?;
            let route = self.require::<Route>(route_id, DispatchError::RouteNotFound)?;
            let driver = self.require::<Driver>(driver_id, DispatchError::DriverNotFound)?;
            let previous = leg_by_number(&trip, leg_number)?.driver;

            rank_trip::assign_driver(&mut trip, leg_number, &driver, &route)?;
            self.commit(&mut trip)?;
            self.recheck_leg_driver(&mut trip, leg_number, previous, &driver, &route)?;

            tracing::info!(trip = trip_id.get(), leg = leg_number, driver = driver_id.get(), "driver linked to leg");
            Ok(trip)
        })
    }

    /// Clear the driver of leg `leg_number` (1-based) of `trip_id`.
    pub fn unlink_driver_from_leg(&self, trip_id: TripId, leg_number: u32) -> DispatchResult<Trip> {
        run("unlink_driver_from_leg", || {
            let mut trip = self.require::<Trip>(trip_id, DispatchError::TripNotFound)?;
            clear_driver(&mut trip, leg_number)?;
            self.commit(&mut trip)?;

            tracing::info!(trip = trip_id.get(), leg = leg_number, "driver unlinked from leg");
            Ok(trip)
        })
    }

    // ── Parcel movement ───────────────────────────────────────────────────────

    /// Move a parcel to leg `leg_index` (0-based) of `trip_id`, or of its
    /// current trip when `trip_id` is `None`.
    pub fn move_parcel_leg(
        &self,
        parcel_id: ParcelId,
        leg_index: i64,
        trip_id:   Option<TripId>,
    ) -> DispatchResult<Parcel> {
        run("move_parcel_leg", || {
            check_leg_sign(leg_index)?;
            let mut parcel = self.require::<Parcel>(parcel_id, DispatchError::ParcelNotFound)?;
            let target = target_trip(&parcel, trip_id)?;
            let trip = self.require::<Trip>(target, DispatchError::TripNotFound)?;

            bind_parcel_leg(&mut parcel, &trip, leg_index)?;
            self.commit(&mut parcel)?;

            tracing::info!(parcel = parcel_id.get(), trip = target.get(), leg_index, "parcel moved");
            Ok(parcel)
        })
    }

    // ── Rank graph editing ────────────────────────────────────────────────────

    pub fn create_rank(&self, new: NewRank) -> DispatchResult<Rank> {
        run("create_rank", || {
            require_text("rank name", &new.name)?;
            if let Some(p) = new.position.filter(|p| !p.is_valid()) {
                return Err(DispatchError::Validation(format!("invalid rank position {p}")));
            }
            let id = self.store.next_id::<Rank>()?;
            let rank = Rank::from_new(id, new);
            self.store.insert(&rank)?;

            tracing::info!(rank = id.get(), name = %rank.name, "rank created");
            Ok(rank)
        })
    }

    /// Add the directed route `from → to`, plus `to → from` when
    /// `auto_reverse_routes` is set and that edge does not exist yet.
    /// Returns the routes created.
    pub fn link_destination(&self, from: RankId, to: RankId, spec: RouteSpec) -> DispatchResult<Vec<Route>> {
        run("link_destination", || {
            if from == to {
                return Err(DispatchError::Validation(format!("{from} cannot be its own destination")));
            }
            self.require::<Rank>(from, DispatchError::RankNotFound)?;
            self.require::<Rank>(to, DispatchError::RankNotFound)?;
            if let Some(problem) = spec.problem() {
                return Err(DispatchError::Validation(problem));
            }
            if self.config.reject_parallel_routes && self.has_route(from, to)? {
                return Err(DispatchError::Validation(format!("a route from {from} to {to} already exists")));
            }

            let mut created = vec![self.insert_route(from, to, &spec)?];
            if self.config.auto_reverse_routes && !self.has_route(to, from)? {
                created.push(self.insert_route(to, from, &spec)?);
            }
            Ok(created)
        })
    }

    pub fn create_association(&self, name: &str) -> DispatchResult<Association> {
        run("create_association", || {
            require_text("association name", name)?;
            let id = self.store.next_id::<Association>()?;
            let association = Association { id, name: name.trim().to_owned(), version: 0 };
            self.store.insert(&association)?;

            tracing::info!(association = id.get(), name = %association.name, "association created");
            Ok(association)
        })
    }

    /// Record that `association_id` operates at `rank_id`.  Idempotent.
    pub fn link_association_to_rank(
        &self,
        rank_id:        RankId,
        association_id: AssociationId,
    ) -> DispatchResult<Rank> {
        run("link_association_to_rank", || {
            let mut rank = self.require::<Rank>(rank_id, DispatchError::RankNotFound)?;
            self.require::<Association>(association_id, DispatchError::AssociationNotFound)?;

            if rank.associations.insert(association_id) {
                self.commit(&mut rank)?;
                tracing::info!(rank = rank_id.get(), association = association_id.get(), "association linked to rank");
            }
            Ok(rank)
        })
    }

    // ── Drivers ───────────────────────────────────────────────────────────────

    pub fn register_driver(&self, new: NewDriver) -> DispatchResult<Driver> {
        run("register_driver", || {
            require_text("driver name", &new.name)?;
            require_text("driver phone", &new.phone)?;
            if let Some(association) = new.association {
                self.require::<Association>(association, DispatchError::AssociationNotFound)?;
            }
            let id = self.store.next_id::<Driver>()?;
            let driver = Driver::from_new(id, new);
            self.store.insert(&driver)?;

            tracing::info!(driver = id.get(), "driver registered");
            Ok(driver)
        })
    }

    /// Make `driver_id` eligible for legs departing `rank_id`.  Idempotent.
    pub fn link_driver_to_rank(&self, driver_id: DriverId, rank_id: RankId) -> DispatchResult<Driver> {
        run("link_driver_to_rank", || {
            let mut driver = self.require::<Driver>(driver_id, DispatchError::DriverNotFound)?;
            self.require::<Rank>(rank_id, DispatchError::RankNotFound)?;

            if driver.linked_ranks.insert(rank_id) {
                self.commit(&mut driver)?;
                tracing::info!(driver = driver_id.get(), rank = rank_id.get(), "driver linked to rank");
            }
            Ok(driver)
        })
    }

    /// Remove `rank_id` from the driver's eligibility set.  Idempotent; the
    /// rank itself need not exist any more.
    pub fn unlink_driver_from_rank(&self, driver_id: DriverId, rank_id: RankId) -> DispatchResult<Driver> {
        run("unlink_driver_from_rank", || {
            let mut driver = self.require::<Driver>(driver_id, DispatchError::DriverNotFound)?;

            if driver.linked_ranks.remove(&rank_id) {
                self.commit(&mut driver)?;
                tracing::info!(driver = driver_id.get(), rank = rank_id.get(), "driver unlinked from rank");
            }
            Ok(driver)
        })
    }

    // ── Parcel lifecycle ──────────────────────────────────────────────────────

    /// Create a parcel with a fresh tracking number and receiver OTP.
    ///
    /// A `trip` without a `leg_index` binds the parcel to the first leg.
    pub fn create_parcel(&self, new: NewParcel) -> DispatchResult<Parcel> {
        run("create_parcel", || {
            require_text("sender name", &new.sender.name)?;
            require_text("receiver name", &new.receiver.name)?;

            if let Some(leg_index) = new.leg_index {
                check_leg_sign(leg_index)?;
            }
            let binding = match (new.trip, new.leg_index) {
                (None, None)    => None,
                (None, Some(_)) => return Err(TripError::MissingTripContext.into()),
                (Some(trip_id), leg_index) => {
                    let trip = self.require::<Trip>(trip_id, DispatchError::TripNotFound)?;
                    let leg_index = check_leg_index(&trip, leg_index.unwrap_or(0))?;
                    Some(LegBinding { trip: trip_id, leg_index })
                }
            };

            let tracking_number = self.codes().tracking_number();
            let otp = self.codes().otp(self.config.otp_digits);
            let id = self.store.next_id::<Parcel>()?;
            let mut parcel = Parcel {
                id,
                tracking_number,
                otp,
                sender:   new.sender,
                receiver: new.receiver,
                package:  new.package,
                binding,
                status:   ParcelStatus::AwaitingPickup,
                version:  0,
            };
            self.insert_parcel(&mut parcel)?;

            tracing::info!(
                parcel = id.get(),
                tracking_number = %parcel.tracking_number,
                trip = ?parcel.trip().map(TripId::get),
                "parcel created"
            );
            Ok(parcel)
        })
    }

    /// Move a parcel forward in its lifecycle.  Setting the current status
    /// again is a no-op; `Received` requires [`verify_parcel_otp`](Self::verify_parcel_otp).
    pub fn update_parcel_status(&self, parcel_id: ParcelId, status: ParcelStatus) -> DispatchResult<Parcel> {
        run("update_parcel_status", || {
            let mut parcel = self.require::<Parcel>(parcel_id, DispatchError::ParcelNotFound)?;
            let from = parcel.status;
            if check_status_transition(from, status)? {
                parcel.status = status;
                self.commit(&mut parcel)?;
                tracing::info!(parcel = parcel_id.get(), from = from.as_str(), to = status.as_str(), "parcel status changed");
            }
            Ok(parcel)
        })
    }

    /// Confirm receipt of a delivered parcel with the receiver's OTP.
    pub fn verify_parcel_otp(&self, parcel_id: ParcelId, otp: &str) -> DispatchResult<Parcel> {
        run("verify_parcel_otp", || {
            let mut parcel = self.require::<Parcel>(parcel_id, DispatchError::ParcelNotFound)?;
            verify_otp(&parcel, otp)?;
            parcel.status = ParcelStatus::Received;
            self.commit(&mut parcel)?;

            tracing::info!(parcel = parcel_id.get(), "parcel received");
            Ok(parcel)
        })
    }

    pub fn find_parcel_by_tracking(&self, tracking_number: &str) -> DispatchResult<Parcel> {
        run("find_parcel_by_tracking", || {
            self.store
                .find::<Parcel, _>(|p| p.tracking_number == tracking_number)?
                .into_iter()
                .next()
                .ok_or_else(|| DispatchError::TrackingNumberNotFound(tracking_number.to_owned()))
        })
    }

    // ── Lookup ────────────────────────────────────────────────────────────────

    /// Up to `k` positioned ranks nearest to `position`, closest first.
    pub fn nearest_ranks(&self, position: GeoPoint, k: usize) -> DispatchResult<Vec<Rank>> {
        run("nearest_ranks", || {
            if !position.is_valid() {
                return Err(DispatchError::Validation(format!("invalid position {position}")));
            }
            let ranks = self.store.list::<Rank>()?;
            let locator = RankLocator::from_ranks(&ranks);
            // `list` is in ascending id order.
            Ok(locator
                .k_nearest(position, k)
                .into_iter()
                .filter_map(|id| ranks.binary_search_by_key(&id, |r| r.id).ok())
                .map(|i| ranks[i].clone())
                .collect())
        })
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn require<D: Document>(&self, id: D::Id, not_found: fn(D::Id) -> DispatchError) -> DispatchResult<D> {
        self.store.get::<D>(id)?.ok_or_else(|| not_found(id))
    }

    fn lookup<D: Document>(&self, id: Option<D::Id>) -> DispatchResult<Option<D>> {
        match id {
            Some(id) => Ok(self.store.get::<D>(id)?),
            None     => Ok(None),
        }
    }

    /// Compare-and-set `doc`; a refused update becomes `Conflict`.
    fn commit<D: Document>(&self, doc: &mut D) -> DispatchResult<()> {
        if self.store.update(doc)? {
            return Ok(());
        }
        let id: u64 = doc.id().into();
        tracing::warn!(collection = D::COLLECTION.as_str(), id, version = doc.version(), "update lost to a concurrent write");
        Err(DispatchError::Conflict { collection: D::COLLECTION, id })
    }

    fn codes(&self) -> MutexGuard<'_, CodeGenerator> {
        // The generator has no invariant a panic could break.
        self.codes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn require_endpoints(&self, origin: RankId, destination: RankId) -> DispatchResult<()> {
        self.require::<Rank>(origin, DispatchError::RankNotFound)?;
        if destination != origin {
            self.require::<Rank>(destination, DispatchError::RankNotFound)?;
        }
        Ok(())
    }

    fn check_empty_trip(&self, rank: RankId) -> DispatchResult<()> {
        if !self.config.allow_empty_trips {
            return Err(DispatchError::Validation(format!("origin and destination are both {rank}")));
        }
        Ok(())
    }

    /// Re-read the driver after the trip write.  When it changed and no longer
    /// departs from the route's rank, restore the leg's previous driver and
    /// report the driver as conflicting.
    fn recheck_leg_driver(
        &self,
        trip:       &mut Trip,
        leg_number: u32,
        previous:   Option<DriverId>,
        read:       &Driver,
        route:      &Route,
    ) -> DispatchResult<()> {
        let current = self.store.get::<Driver>(read.id)?;
        let eligible = current
            .as_ref()
            .is_some_and(|d| d.version == read.version || check_eligibility(d, route).is_ok());
        if eligible {
            return Ok(());
        }

        trip.set_leg_driver(leg_number, previous);
        self.commit(trip)?;
        tracing::warn!(
            trip = trip.id().get(),
            leg = leg_number,
            driver = read.id.get(),
            "driver lost eligibility during assignment; leg restored"
        );
        Err(DispatchError::Conflict { collection: Collection::Drivers, id: read.id.get() })
    }

    fn persist_trip(&self, plan: TripPlan, origin: RankId, destination: RankId) -> DispatchResult<Trip> {
        let id = self.store.next_id::<Trip>()?;
        let trip = plan.into_trip(id, origin, destination);
        self.store.insert(&trip)?;

        tracing::info!(
            trip = id.get(),
            origin = origin.get(),
            destination = destination.get(),
            legs = trip.leg_count(),
            full_distance = trip.full_distance(),
            price = trip.price(),
            "trip created"
        );
        Ok(trip)
    }

    fn has_route(&self, from: RankId, to: RankId) -> DispatchResult<bool> {
        Ok(!self.store.find::<Route, _>(|r| r.from_rank == from && r.to_rank == to)?.is_empty())
    }

    fn insert_route(&self, from: RankId, to: RankId, spec: &RouteSpec) -> DispatchResult<Route> {
        let id = self.store.next_id::<Route>()?;
        let route = Route::from_spec(id, from, to, spec);
        self.store.insert(&route)?;

        tracing::info!(route = id.get(), from = from.get(), to = to.get(), distance = route.distance, "route created");
        Ok(route)
    }

    /// Insert `parcel`, drawing a fresh tracking number each time the store
    /// reports the current one as taken.
    fn insert_parcel(&self, parcel: &mut Parcel) -> DispatchResult<()> {
        for attempt in 1..=TRACKING_ATTEMPTS {
            match self.store.insert(&*parcel) {
                Ok(()) => return Ok(()),
                Err(StoreError::DuplicateKey { .. }) => {
                    tracing::warn!(attempt, tracking_number = %parcel.tracking_number, "tracking number collision");
                    parcel.tracking_number = self.codes().tracking_number();
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(DispatchError::TrackingNumberExhausted(TRACKING_ATTEMPTS))
    }

    fn populate(&self, trip: &Trip) -> DispatchResult<TripDetails> {
        let legs = trip
            .legs()
            .iter()
            .map(|leg| {
                let route: Option<Route> = self.lookup(leg.details)?;
                let driver: Option<Driver> = self.lookup(leg.driver)?;
                Ok(LegDetails {
                    leg:         leg.leg,
                    from_rank:   self.lookup(route.as_ref().map(|r| r.from_rank))?,
                    to_rank:     self.lookup(route.as_ref().map(|r| r.to_rank))?,
                    association: self.lookup(driver.as_ref().and_then(|d| d.association))?,
                    route,
                    driver,
                })
            })
            .collect::<DispatchResult<Vec<_>>>()?;

        Ok(TripDetails {
            origin:      self.lookup(Some(trip.origin()))?,
            destination: self.lookup(Some(trip.destination()))?,
            legs,
        })
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Run one operation inside a span, logging a rejection with its kind.
fn run<T>(op: &'static str, f: impl FnOnce() -> DispatchResult<T>) -> DispatchResult<T> {
    let _span = tracing::debug_span!("dispatch", op).entered();
    f().inspect_err(|e| tracing::debug!(kind = e.kind().as_str(), error = %e, "request rejected"))
}

fn require_text(what: &str, value: &str) -> DispatchResult<()> {
    if value.trim().is_empty() {
        return Err(DispatchError::Validation(format!("{what} is required")));
    }
    Ok(())
}
