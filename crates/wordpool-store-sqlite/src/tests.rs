//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::HashSet;

use chrono::{DateTime, Duration, TimeZone, Utc};
use wordpool_core::{
  admission::DrawPolicy,
  pool::PoolEntry,
  store::WordStore,
  visitor::{Draw, Undo, Visit},
};

use crate::SqliteStore;

const WORDS: &[&str] = &[
  "amber", "basil", "cedar", "delta", "ember", "fjord", "gravel", "harbor",
  "indigo", "juniper", "kelp", "lantern",
];

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn seeded() -> SqliteStore {
  let s = store().await;
  let words = WORDS.iter().map(|w| (*w).to_owned()).collect();
  assert_eq!(s.import_words(words).await.unwrap(), WORDS.len());
  s
}

fn at(secs: i64) -> DateTime<Utc> { Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap() }

fn policy(budget: usize) -> DrawPolicy { DrawPolicy::new(Duration::hours(1), budget).unwrap() }

fn drawn(visit: Visit) -> Draw {
  match visit {
    Visit::Drawn { draw, .. } => draw,
    other => panic!("expected a draw, got {other:?}"),
  }
}

async fn used_ids(s: &SqliteStore) -> HashSet<i64> {
  s.longest_words(usize::MAX)
    .await
    .unwrap()
    .into_iter()
    .filter(|e| e.used)
    .map(|e| e.id)
    .collect()
}

// ─── Import ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn import_skips_blanks_and_duplicates() {
  let s = seeded().await;
  let again = vec!["amber".to_owned(), "  ".to_owned(), " mortar ".to_owned()];
  assert_eq!(s.import_words(again).await.unwrap(), 1);

  let progress = s.progress().await.unwrap();
  assert_eq!(progress.total, WORDS.len() as u64 + 1);
  assert_eq!(progress.used, 0);
}

// ─── Draw ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_visit_draws_within_budget_and_marks_words() {
  let s = seeded().await;

  let draw = drawn(s.visit("203.0.113.7", policy(20), at(0), None).await.unwrap());
  assert!(!draw.word_ids.is_empty());
  assert!(draw.text.chars().count() <= 20, "text too long: {:?}", draw.text);
  assert_eq!(draw.text.split(' ').count(), draw.word_ids.len());

  let used = used_ids(&s).await;
  assert_eq!(used, draw.word_ids.iter().copied().collect());

  let visitor = s.get_visitor("203.0.113.7").await.unwrap().unwrap();
  assert_eq!(visitor.last_access, at(0));
  assert_eq!(visitor.last_draw, Some(draw));
}

#[tokio::test]
async fn draw_reports_next_allowed_time() {
  let s = seeded().await;
  match s.visit("v", policy(20), at(0), None).await.unwrap() {
    Visit::Drawn { next_allowed_at, .. } => assert_eq!(next_allowed_at, at(3_600)),
    other => panic!("expected a draw, got {other:?}"),
  }
}

#[tokio::test]
async fn whole_pool_fits_in_large_budget() {
  let s = seeded().await;
  let draw = drawn(s.visit("v", policy(10_000), at(0), None).await.unwrap());
  assert_eq!(draw.word_ids.len(), WORDS.len());
  assert!(s.progress().await.unwrap().is_exhausted());
}

#[tokio::test]
async fn empty_pool_is_exhausted_and_writes_nothing() {
  let s = store().await;
  assert_eq!(s.visit("v", policy(100), at(0), None).await.unwrap(), Visit::Exhausted);
  assert!(s.get_visitor("v").await.unwrap().is_none());
}

#[tokio::test]
async fn budget_smaller_than_every_word_is_exhausted() {
  let s = seeded().await;
  assert_eq!(s.visit("v", policy(3), at(0), None).await.unwrap(), Visit::Exhausted);
  assert_eq!(s.progress().await.unwrap().used, 0);
}

/// Sixty seven-letter words plus the given short ones.
async fn mostly_long(short: &[&str]) -> SqliteStore {
  let s = store().await;
  let mut words: Vec<String> = (0..60).map(|i| format!("word{i:03}")).collect();
  words.extend(short.iter().map(|w| (*w).to_owned()));
  s.import_words(words).await.unwrap();
  s
}

#[tokio::test]
async fn lone_fitting_word_is_found_among_long_ones() {
  for _ in 0..20 {
    let s = mostly_long(&["ox"]).await;
    let draw = drawn(s.visit("v", policy(3), at(0), None).await.unwrap());
    assert_eq!(draw.text, "ox");
  }
}

#[tokio::test]
async fn long_words_do_not_crowd_out_the_sample() {
  // Budget 5 samples three candidates; any two two-letter words fill it.
  for _ in 0..20 {
    let s = mostly_long(&["ox", "ab", "cd", "ef"]).await;
    let draw = drawn(s.visit("v", policy(5), at(0), None).await.unwrap());
    assert_eq!(draw.word_ids.len(), 2, "text: {:?}", draw.text);
    assert_eq!(draw.text.chars().count(), 5);
  }
}

#[tokio::test]
async fn draws_never_reissue_used_words() {
  let s = seeded().await;
  let mut seen = HashSet::new();

  for i in 0..20 {
    match s.visit(&format!("visitor-{i}"), policy(12), at(0), None).await.unwrap() {
      Visit::Drawn { draw, .. } => {
        for id in draw.word_ids {
          assert!(seen.insert(id), "word {id} issued twice");
        }
      }
      Visit::Exhausted => break,
      other => panic!("unexpected {other:?}"),
    }
  }

  assert_eq!(seen.len(), WORDS.len());
  assert_eq!(s.progress().await.unwrap().used, WORDS.len() as u64);
}

// ─── Admission ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn second_visit_within_interval_is_refused_with_previous_draw() {
  let s = seeded().await;
  let first = drawn(s.visit("v", policy(20), at(0), None).await.unwrap());

  let refused = s.visit("v", policy(20), at(600), None).await.unwrap();
  assert_eq!(
    refused,
    Visit::Cooldown {
      remaining:       Duration::seconds(3_000),
      next_allowed_at: at(3_600),
      previous:        Some(first.clone()),
    }
  );

  // The refusal neither consumed words nor moved the window.
  assert_eq!(used_ids(&s).await.len(), first.word_ids.len());
  let visitor = s.get_visitor("v").await.unwrap().unwrap();
  assert_eq!(visitor.last_access, at(0));
}

#[tokio::test]
async fn visit_after_interval_draws_fresh_words() {
  let s = seeded().await;
  let first = drawn(s.visit("v", policy(12), at(0), None).await.unwrap());
  let second = drawn(s.visit("v", policy(12), at(3_600), None).await.unwrap());

  let first_ids: HashSet<_> = first.word_ids.iter().collect();
  assert!(second.word_ids.iter().all(|id| !first_ids.contains(id)));

  let visitor = s.get_visitor("v").await.unwrap().unwrap();
  assert_eq!(visitor.last_access, at(3_600));
  assert_eq!(visitor.last_draw, Some(second));
}

#[tokio::test]
async fn visitors_are_rate_limited_independently() {
  let s = seeded().await;
  drawn(s.visit("a", policy(12), at(0), None).await.unwrap());
  drawn(s.visit("b", policy(12), at(1), None).await.unwrap());
}

#[tokio::test]
async fn timezone_hint_is_kept_and_refreshed_during_cooldown() {
  let s = seeded().await;
  drawn(s.visit("v", policy(12), at(0), Some(60)).await.unwrap());
  drawn(s.visit("v", policy(12), at(4_000), None).await.unwrap());
  assert_eq!(s.get_visitor("v").await.unwrap().unwrap().tz_offset, Some(60));

  let refused = s.visit("v", policy(12), at(4_001), Some(-300)).await.unwrap();
  assert!(matches!(refused, Visit::Cooldown { .. }));
  assert_eq!(s.get_visitor("v").await.unwrap().unwrap().tz_offset, Some(-300));
}

// ─── Undo ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn undo_releases_words_and_clears_draw() {
  let s = seeded().await;
  let draw = drawn(s.visit("v", policy(20), at(0), None).await.unwrap());

  assert_eq!(s.undo("v").await.unwrap(), Undo::Restored { draw });
  assert!(used_ids(&s).await.is_empty());

  let visitor = s.get_visitor("v").await.unwrap().unwrap();
  assert_eq!(visitor.last_draw, None);
  // Undo does not reopen the admission window.
  assert_eq!(visitor.last_access, at(0));
  assert!(matches!(
    s.visit("v", policy(20), at(60), None).await.unwrap(),
    Visit::Cooldown { previous: None, .. }
  ));
}

#[tokio::test]
async fn undo_twice_is_refused() {
  let s = seeded().await;
  drawn(s.visit("v", policy(20), at(0), None).await.unwrap());
  assert!(matches!(s.undo("v").await.unwrap(), Undo::Restored { .. }));
  assert_eq!(s.undo("v").await.unwrap(), Undo::NothingToUndo);
}

#[tokio::test]
async fn undo_for_unknown_visitor_is_refused() {
  let s = seeded().await;
  assert_eq!(s.undo("nobody").await.unwrap(), Undo::NothingToUndo);
}

#[tokio::test]
async fn undo_only_touches_own_words() {
  let s = seeded().await;
  let a = drawn(s.visit("a", policy(12), at(0), None).await.unwrap());
  let b = drawn(s.visit("b", policy(12), at(0), None).await.unwrap());

  s.undo("a").await.unwrap();
  let used = used_ids(&s).await;
  assert_eq!(used, b.word_ids.iter().copied().collect());
  assert!(a.word_ids.iter().all(|id| !used.contains(id)));
}

// ─── Reports & maintenance ───────────────────────────────────────────────────

#[tokio::test]
async fn progress_tracks_draws() {
  let s = seeded().await;
  let draw = drawn(s.visit("v", policy(20), at(0), None).await.unwrap());
  let progress = s.progress().await.unwrap();
  assert_eq!(progress.total, WORDS.len() as u64);
  assert_eq!(progress.used, draw.word_ids.len() as u64);
}

#[tokio::test]
async fn longest_words_orders_by_length_then_id() {
  let s = seeded().await;
  let longest: Vec<PoolEntry> = s.longest_words(3).await.unwrap();
  let words: Vec<_> = longest.iter().map(|e| e.word.as_str()).collect();
  assert_eq!(words, ["juniper", "lantern", "gravel"]);
}

#[tokio::test]
async fn recent_visitors_newest_first() {
  let s = seeded().await;
  drawn(s.visit("old", policy(12), at(0), None).await.unwrap());
  drawn(s.visit("new", policy(12), at(10), None).await.unwrap());

  let recent = s.recent_visitors(10).await.unwrap();
  let names: Vec<_> = recent.iter().map(|v| v.visitor.as_str()).collect();
  assert_eq!(names, ["new", "old"]);
  assert_eq!(s.recent_visitors(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn reset_clears_progress_and_recorded_draws() {
  let s = seeded().await;
  drawn(s.visit("v", policy(20), at(0), None).await.unwrap());

  assert_eq!(s.reset_progress(false).await.unwrap(), WORDS.len() as u64);
  assert_eq!(s.progress().await.unwrap().used, 0);
  assert_eq!(s.undo("v").await.unwrap(), Undo::NothingToUndo);
}

#[tokio::test]
async fn reset_to_used_exhausts_pool() {
  let s = seeded().await;
  s.reset_progress(true).await.unwrap();
  assert!(s.progress().await.unwrap().is_exhausted());
  assert_eq!(s.visit("v", policy(100), at(0), None).await.unwrap(), Visit::Exhausted);
}
