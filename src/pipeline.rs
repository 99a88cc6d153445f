use std::time::Duration;

use tracing::{debug, error, info};

use crate::db::ContestStore;
use crate::error::Result;
use crate::fetcher::{select_rated_contests, StandingsSource};
use crate::normalizer::normalize;
use crate::rating::score_participants;
use crate::types::{Contest, ContestRecord};

/// How a single contest left the pipeline without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContestOutcome {
    /// A record with this id was already stored; nothing was fetched.
    AlreadyUploaded,
    Uploaded { participants: usize },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub skipped: usize,
    pub uploaded: usize,
    pub failed: usize,
}

/// Drives contests through check → fetch → normalize → score → upsert.
/// Strictly sequential; the store is only touched by one contest at a time.
pub struct Uploader<S, D> {
    source: S,
    store: D,
    division: String,
    upload_delay: Duration,
}

impl<S: StandingsSource, D: ContestStore> Uploader<S, D> {
    pub fn new(source: S, store: D, division: String, upload_delay: Duration) -> Self {
        Self { source, store, division, upload_delay }
    }

    pub fn store(&self) -> &D {
        &self.store
    }

    #[cfg(test)]
    fn source(&self) -> &S {
        &self.source
    }

    /// One contest end to end. The rate-limit delay runs only after an upload.
    pub async fn process_contest(&self, contest_id: i64) -> Result<ContestOutcome> {
        if self.store.exists(contest_id).await? {
            return Ok(ContestOutcome::AlreadyUploaded);
        }

        let rows = self.source.standings(contest_id).await?;
        let standings = normalize(&rows);
        let s = &standings.stats;
        debug!(
            contest_id,
            rows = s.rows_total,
            not_contestant = s.rejected_not_contestant,
            team = s.rejected_team,
            no_rating = s.rejected_no_rating,
            no_rank = s.rejected_no_rank,
            "[FILTER] {contest_id}: {} of {} rows eligible",
            s.eligible,
            s.rows_total,
        );

        let mut participants = standings.participants;
        info!(contest_id, users = participants.len(), "→ {contest_id}: Processing {} users...", participants.len());
        score_participants(&mut participants, &standings.rating_pool);

        let record = ContestRecord {
            contest_id,
            division: self.division.clone(),
            data: participants,
        };
        self.store.upsert(&record).await?;

        if !self.upload_delay.is_zero() {
            tokio::time::sleep(self.upload_delay).await;
        }

        Ok(ContestOutcome::Uploaded { participants: record.data.len() })
    }

    /// Process `contests` in the given order. Failures are logged and counted,
    /// never propagated.
    pub async fn run(&self, contests: &[Contest]) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for contest in contests {
            let contest_id = contest.id;
            match self.process_contest(contest_id).await {
                Ok(ContestOutcome::AlreadyUploaded) => {
                    summary.skipped += 1;
                    info!(contest_id, "✅ Contest {contest_id} already uploaded. Skipping.");
                }
                Ok(ContestOutcome::Uploaded { participants }) => {
                    summary.uploaded += 1;
                    info!(contest_id, participants, "✅ Uploaded contest {contest_id}");
                }
                Err(e) => {
                    summary.failed += 1;
                    error!(contest_id, "❌ Error with contest {contest_id}: {e}");
                }
            }
        }

        summary
    }

    /// The fixed backfill: the `count` newest rated contests, oldest first.
    /// Only a failure to list contests is an error.
    pub async fn run_latest(&self, count: usize) -> Result<BatchSummary> {
        let contests = select_rated_contests(self.source.contest_list().await?, count);
        info!(contests = contests.len(), "📥 Processing {} rated contests, oldest first", contests.len());
        Ok(self.run(&contests).await)
    }
}
