use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use doctor_cell::models::{Slot, SlotQuery};

use crate::services::gateway::SlotSource;

/// Slots currently offered for one doctor/branch/date.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SlotBoard {
    pub query: Option<SlotQuery>,
    pub slots: Vec<Slot>,
    pub generation: u64,
}

impl SlotBoard {
    pub fn find(&self, slot_id: Uuid) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.id == slot_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlotFetchOutcome {
    Applied { generation: u64, count: usize },
    /// A newer fetch started while this one was in flight; its result was dropped.
    Stale { generation: u64 },
    /// The fetch failed; the board was left as it was.
    Failed { generation: u64, reason: String },
}

impl SlotFetchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, SlotFetchOutcome::Applied { .. })
    }
}

/// A slot query stamped with the generation it was issued under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotTicket {
    pub query: SlotQuery,
    pub generation: u64,
}

/// Loads slot boards. Tickets are issued when a selection is made and only
/// the most recently issued ticket may replace the board.
pub struct SlotFetcher {
    source: Arc<dyn SlotSource>,
    generation: AtomicU64,
    board: RwLock<SlotBoard>,
}

impl SlotFetcher {
    pub fn new(source: Arc<dyn SlotSource>) -> Self {
        Self {
            source,
            generation: AtomicU64::new(0),
            board: RwLock::new(SlotBoard::default()),
        }
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Stamp `query` with a fresh generation, superseding every ticket
    /// issued before it.
    pub fn issue(&self, query: SlotQuery) -> SlotTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        SlotTicket { query, generation }
    }

    pub async fn refresh(&self, ticket: SlotTicket, auth_token: &str) -> SlotFetchOutcome {
        let SlotTicket { query, generation: ticket } = ticket;
        debug!("Slot fetch #{} for branch {} on {}", ticket, query.branch_id, query.date);

        let result = self.source.fetch_slots(&query, auth_token).await;

        let mut board = self.board.write().await;
        if self.current_generation() != ticket {
            debug!("Discarding stale slot response #{}", ticket);
            return SlotFetchOutcome::Stale { generation: ticket };
        }

        match result {
            Ok(slots) => {
                let count = slots.len();
                *board = SlotBoard {
                    query: Some(query),
                    slots,
                    generation: ticket,
                };
                SlotFetchOutcome::Applied { generation: ticket, count }
            }
            Err(e) => {
                warn!("Slot fetch #{} failed, keeping previous board: {}", ticket, e);
                SlotFetchOutcome::Failed { generation: ticket, reason: e.to_string() }
            }
        }
    }

    pub async fn board(&self) -> SlotBoard {
        self.board.read().await.clone()
    }

    /// Look a slot up on the board, provided the board still shows `query`.
    pub async fn find_slot(&self, query: &SlotQuery, slot_id: Uuid) -> Option<Slot> {
        let board = self.board.read().await;
        if board.query.as_ref() != Some(query) {
            return None;
        }
        board.find(slot_id).cloned()
    }

    /// Empty the board and invalidate any fetch still in flight.
    pub async fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.board.write().await = SlotBoard::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime};
    use tokio::sync::{oneshot, Mutex};

    use crate::services::gateway::MockSlotSource;

    fn query(date: NaiveDate) -> SlotQuery {
        SlotQuery { doctor_id: Uuid::nil(), branch_id: Uuid::from_u128(7), date }
    }

    fn slot_for(query: &SlotQuery) -> Slot {
        Slot {
            id: Uuid::new_v4(),
            branch_id: query.branch_id,
            date: query.date,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
            available: true,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    /// The first call blocks until the gate opens; later calls answer at once.
    struct GatedSource {
        gate: Mutex<Option<oneshot::Receiver<()>>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SlotSource for GatedSource {
        async fn fetch_slots(&self, query: &SlotQuery, _auth_token: &str) -> Result<Vec<Slot>> {
            let gate = self.gate.lock().await.take();
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(rx) = gate {
                let _ = rx.await;
            }
            Ok(vec![slot_for(query)])
        }
    }

    #[tokio::test]
    async fn test_refresh_replaces_board() {
        let mut source = MockSlotSource::new();
        source.expect_fetch_slots()
            .times(2)
            .returning(|q, _| Ok(vec![slot_for(q), slot_for(q)]));
        let fetcher = SlotFetcher::new(Arc::new(source));

        assert_eq!(
            fetcher.refresh(fetcher.issue(query(day(20))), "t").await,
            SlotFetchOutcome::Applied { generation: 1, count: 2 }
        );
        fetcher.refresh(fetcher.issue(query(day(21))), "t").await;

        let board = fetcher.board().await;
        assert_eq!(board.query, Some(query(day(21))));
        assert!(board.slots.iter().all(|slot| slot.date == day(21)));
        assert_eq!(board.generation, 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_board() {
        let mut source = MockSlotSource::new();
        let mut seq = mockall::Sequence::new();
        source.expect_fetch_slots()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|q, _| Ok(vec![slot_for(q)]));
        source.expect_fetch_slots()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(anyhow!("connection reset")));
        let fetcher = SlotFetcher::new(Arc::new(source));

        fetcher.refresh(fetcher.issue(query(day(20))), "t").await;
        let before = fetcher.board().await;
        let outcome = fetcher.refresh(fetcher.issue(query(day(22))), "t").await;

        assert!(matches!(outcome, SlotFetchOutcome::Failed { generation: 2, .. }));
        assert_eq!(fetcher.board().await, before);
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let (release, gate) = oneshot::channel();
        let source = Arc::new(GatedSource {
            gate: Mutex::new(Some(gate)),
            calls: AtomicUsize::new(0),
        });
        let fetcher = Arc::new(SlotFetcher::new(source.clone()));
        let older = fetcher.issue(query(day(20)));
        let newer = fetcher.issue(query(day(21)));

        let slow = {
            let fetcher = fetcher.clone();
            tokio::spawn(async move { fetcher.refresh(older, "t").await })
        };
        while source.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let fast = fetcher.refresh(newer, "t").await;
        release.send(()).unwrap();
        let slow = slow.await.unwrap();

        assert!(fast.is_applied());
        assert_eq!(slow, SlotFetchOutcome::Stale { generation: 1 });
        assert_eq!(fetcher.board().await.query, Some(query(day(21))));
    }

    #[tokio::test]
    async fn test_older_ticket_fetched_last_is_still_stale() {
        let mut source = MockSlotSource::new();
        source.expect_fetch_slots()
            .times(2)
            .returning(|q, _| Ok(vec![slot_for(q)]));
        let fetcher = SlotFetcher::new(Arc::new(source));

        let older = fetcher.issue(query(day(20)));
        let newer = fetcher.issue(query(day(21)));

        assert!(fetcher.refresh(newer, "t").await.is_applied());
        assert_eq!(fetcher.refresh(older, "t").await, SlotFetchOutcome::Stale { generation: 1 });
        assert_eq!(fetcher.board().await.query, Some(query(day(21))));
    }

    #[tokio::test]
    async fn test_find_slot_checks_board_query() {
        let mut source = MockSlotSource::new();
        source.expect_fetch_slots().returning(|q, _| Ok(vec![slot_for(q)]));
        let fetcher = SlotFetcher::new(Arc::new(source));

        fetcher.refresh(fetcher.issue(query(day(20))), "t").await;
        let slot_id = fetcher.board().await.slots[0].id;

        assert!(fetcher.find_slot(&query(day(20)), slot_id).await.is_some());
        assert!(fetcher.find_slot(&query(day(21)), slot_id).await.is_none());
    }

    #[tokio::test]
    async fn test_clear_empties_board() {
        let mut source = MockSlotSource::new();
        source.expect_fetch_slots().returning(|q, _| Ok(vec![slot_for(q)]));
        let fetcher = SlotFetcher::new(Arc::new(source));

        fetcher.refresh(fetcher.issue(query(day(20))), "t").await;
        fetcher.clear().await;

        assert_eq!(fetcher.board().await, SlotBoard::default());
        assert_eq!(fetcher.current_generation(), 2);
    }
}
