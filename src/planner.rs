//! End-to-end pipeline: cluster → allocate → sequence.
//!
//! Each load is sequenced with its own random generator derived from the
//! plan seed and the load id, so the result does not depend on how loads are
//! scheduled across threads. Sequence positions are written back into the
//! orders only after every load has finished.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::allocate::{AllocationConfig, CapacityAllocator};
use crate::cluster::{ClusterConfig, GeoClusterer};
use crate::error::Result;
use crate::models::{Cluster, Coordinate, Load, LoadId, Order, OrderId, Vehicle};
use crate::sequence::{LoadSequence, SequenceConfig, SequenceOptimizer};

/// Pipeline parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanConfig {
    /// Where every load starts and ends.
    pub depot: Coordinate,
    pub clustering: ClusterConfig,
    pub allocation: AllocationConfig,
    pub sequencing: SequenceConfig,
    /// Base seed for per-load sequencing generators.
    pub seed: u64,
}

impl PlanConfig {
    pub fn new(depot: Coordinate) -> Self {
        Self {
            depot,
            clustering: ClusterConfig::default(),
            allocation: AllocationConfig::default(),
            sequencing: SequenceConfig::default(),
            seed: 42,
        }
    }

    pub fn with_clustering(mut self, clustering: ClusterConfig) -> Self {
        self.clustering = clustering;
        self
    }

    pub fn with_allocation(mut self, allocation: AllocationConfig) -> Self {
        self.allocation = allocation;
        self
    }

    pub fn with_sequencing(mut self, sequencing: SequenceConfig) -> Self {
        self.sequencing = sequencing;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.clustering.validate()?;
        self.allocation.validate()?;
        self.sequencing.validate()
    }

    fn load_rng(&self, load: LoadId) -> StdRng {
        StdRng::seed_from_u64(self.seed ^ u64::from(load.0).wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}

/// Everything a planning run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanReport {
    pub clusters: Vec<Cluster>,
    /// Loads with orders in visiting order.
    pub loads: Vec<Load>,
    pub sequences: Vec<LoadSequence>,
    /// Orders no vehicle could take.
    pub unassigned: Vec<OrderId>,
    /// Orders without a coordinate.
    pub skipped: Vec<OrderId>,
    /// Sum of closed-tour lengths over all loads, in meters.
    pub total_distance: f64,
    /// Some load was sequenced only partially because of cancellation.
    pub cancelled: bool,
}

/// Runs the full planning pipeline.
///
/// # Examples
///
/// ```
/// use u_routeplan::models::{Coordinate, Order, OrderId, Vehicle, VehicleId};
/// use u_routeplan::planner::{PlanConfig, Planner};
/// use u_routeplan::sequence::SequenceConfig;
///
/// let depot = Coordinate::new(-23.0838, -47.1336).unwrap();
/// let mut orders: Vec<Order> = (0..8)
///     .map(|i| {
///         let coord = Coordinate::new(-23.05 - 0.01 * i as f64, -47.10 - 0.005 * i as f64).unwrap();
///         Order::new(OrderId(i), format!("Rua {i}"), 10.0, 1).with_coordinate(coord)
///     })
///     .collect();
/// let fleet = vec![Vehicle::new(VehicleId(0), "ABC1D23", 50.0, 20)];
///
/// let config = PlanConfig::new(depot).with_sequencing(SequenceConfig::fast());
/// let report = Planner::new(config).plan(&mut orders, &fleet, None).unwrap();
/// assert!(report.unassigned.is_empty());
/// assert!(orders.iter().all(|o| o.sequence().is_some()));
/// ```
pub struct Planner {
    config: PlanConfig,
}

impl Planner {
    pub fn new(config: PlanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    /// Clusters, allocates and sequences `orders` in place.
    ///
    /// `cancel` stops each load's sequencing between generations; the best
    /// tours found so far are still applied.
    ///
    /// # Errors
    ///
    /// Propagates the first error of any stage; see
    /// [`GeoClusterer::run`], [`CapacityAllocator::allocate`] and
    /// [`SequenceOptimizer::sequence_load`].
    pub fn plan(
        &self,
        orders: &mut [Order],
        fleet: &[Vehicle],
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<PlanReport> {
        self.config.validate()?;

        let clustered = GeoClusterer::run(orders, &self.config.clustering)?;
        let allocated = CapacityAllocator::allocate(orders, fleet, &self.config.allocation)?;

        let sequences = self.sequence_loads(orders, &allocated.loads, cancel)?;
        for seq in &sequences {
            seq.apply(orders);
        }

        let mut loads = allocated.loads;
        for (load, seq) in loads.iter_mut().zip(&sequences) {
            load.orders = seq.stops.clone();
        }

        let total_distance: f64 = sequences.iter().map(|s| s.length).sum();
        let cancelled = sequences.iter().any(|s| s.cancelled);
        info!(
            clusters = clustered.clusters.len(),
            loads = loads.len(),
            unassigned = allocated.unassigned.len(),
            skipped = clustered.skipped.len(),
            total_distance,
            cancelled,
            "plan finished"
        );

        Ok(PlanReport {
            clusters: clustered.clusters,
            loads,
            sequences,
            unassigned: allocated.unassigned,
            skipped: clustered.skipped,
            total_distance,
            cancelled,
        })
    }

    fn sequence_loads(
        &self,
        orders: &[Order],
        loads: &[Load],
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<Vec<LoadSequence>> {
        let sequence_one = |load: &Load| {
            let mut rng = self.config.load_rng(load.id);
            SequenceOptimizer::sequence_load(
                orders,
                load,
                self.config.depot,
                &self.config.sequencing,
                &mut rng,
                cancel.clone(),
            )
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            loads.par_iter().map(sequence_one).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            loads.iter().map(sequence_one).collect()
        }
    }
}
