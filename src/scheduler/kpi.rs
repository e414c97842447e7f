//! Schedule quality metrics (KPIs).
//!
//! Computes performance indicators from a decoded schedule and the number
//! of cores it was built for.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan (C_max) | Latest finish slot |
//! | Sum of starts | Σ start(a), the MILP objective |
//! | Busy slots | Occupied slots per core |
//! | Utilization | busy / makespan, per core and averaged over all cores |
//! | Idle slots | C · makespan − Σ busy |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use crate::models::Schedule;

/// Schedule performance indicators.
///
/// All time values are in slots.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleKpi {
    /// Makespan: latest finish slot.
    pub makespan: u32,
    /// Sum of actor start slots.
    pub sum_of_starts: u64,
    /// Occupied slots, indexed by core.
    pub busy_slots: Vec<u64>,
    /// Per-core utilization over the makespan (0.0..=1.0), indexed by core.
    pub utilization_by_core: Vec<f64>,
    /// Average utilization across all cores, unused ones included.
    pub avg_utilization: f64,
    /// Unoccupied core-slots within the makespan.
    pub idle_slots: u64,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule.
    ///
    /// Placements on cores `>= cores` are ignored; run
    /// [`verify_schedule`](crate::validation::verify_schedule) first if the
    /// schedule is untrusted.
    pub fn calculate(schedule: &Schedule, cores: usize) -> Self {
        let makespan = schedule.makespan();

        let mut busy_slots = vec![0u64; cores];
        for slot in schedule.slots.values() {
            if let Some(busy) = busy_slots.get_mut(slot.resource) {
                *busy += u64::from(slot.duration());
            }
        }

        let utilization_by_core: Vec<f64> = busy_slots
            .iter()
            .map(|&busy| {
                if makespan == 0 {
                    0.0
                } else {
                    busy as f64 / f64::from(makespan)
                }
            })
            .collect();

        let avg_utilization = if utilization_by_core.is_empty() {
            0.0
        } else {
            utilization_by_core.iter().sum::<f64>() / utilization_by_core.len() as f64
        };

        let capacity = cores as u64 * u64::from(makespan);
        let idle_slots = capacity.saturating_sub(busy_slots.iter().sum());

        Self {
            makespan,
            sum_of_starts: schedule.sum_of_starts(),
            busy_slots,
            utilization_by_core,
            avg_utilization,
            idle_slots,
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_makespan: u32, min_utilization: f64) -> bool {
        self.makespan <= max_makespan && self.avg_utilization >= min_utilization
    }
}
