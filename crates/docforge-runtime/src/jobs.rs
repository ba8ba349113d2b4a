//! In-memory job table with a capacity cap and a time-to-live.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use docforge_core::RetentionPolicy;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::types::{Job, JobSummary};

/// Owns every job known to the process.
pub struct JobStore {
    jobs: RwLock<HashMap<String, Job>>,
    max_jobs: usize,
    ttl: chrono::Duration,
}

impl JobStore {
    pub fn new(policy: &RetentionPolicy) -> Self {
        let ttl = chrono::Duration::from_std(policy.job_ttl)
            .unwrap_or_else(|_| chrono::Duration::days(365 * 100));
        Self {
            jobs: RwLock::new(HashMap::new()),
            max_jobs: policy.max_jobs.max(1),
            ttl,
        }
    }

    /// Insert a job, evicting the oldest finished jobs when at capacity.
    ///
    /// Returns the evicted jobs so their artifacts can be removed.
    pub fn insert(&self, job: Job) -> Vec<Job> {
        let mut jobs = self.jobs.write();
        let mut evicted = Vec::new();

        while jobs.len() >= self.max_jobs {
            let oldest = jobs
                .values()
                .filter(|j| j.status.is_terminal())
                .min_by_key(|j| j.updated_at)
                .map(|j| j.job_id.clone());
            match oldest {
                Some(id) => {
                    if let Some(old) = jobs.remove(&id) {
                        debug!("Evicted job {} to stay within capacity", id);
                        evicted.push(old);
                    }
                }
                None => {
                    warn!(
                        "Job table holds {} in-flight jobs; exceeding capacity of {}",
                        jobs.len(),
                        self.max_jobs
                    );
                    break;
                }
            }
        }

        jobs.insert(job.job_id.clone(), job);
        evicted
    }

    /// Snapshot of a job.
    pub fn get(&self, job_id: &str) -> Option<Job> {
        self.jobs.read().get(job_id).cloned()
    }

    /// Mutate a job in place, returning the updated snapshot.
    pub fn update(&self, job_id: &str, f: impl FnOnce(&mut Job)) -> Option<Job> {
        let mut jobs = self.jobs.write();
        let job = jobs.get_mut(job_id)?;
        f(job);
        Some(job.clone())
    }

    /// Remove finished jobs whose last update is older than the TTL.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> Vec<Job> {
        let mut jobs = self.jobs.write();
        let expired: Vec<String> = jobs
            .values()
            .filter(|j| j.status.is_terminal() && now - j.updated_at >= self.ttl)
            .map(|j| j.job_id.clone())
            .collect();

        expired
            .iter()
            .filter_map(|id| jobs.remove(id))
            .collect()
    }

    pub fn summary(&self) -> JobSummary {
        let jobs = self.jobs.read();
        let mut summary = JobSummary::default();
        for job in jobs.values() {
            summary.count(job.status);
        }
        summary
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
