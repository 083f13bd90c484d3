//! The shared word pool: entries, budget fitting and progress.

use serde::{Deserialize, Serialize};

// ─── Entries ─────────────────────────────────────────────────────────────────

/// One word in the shared list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
  pub id:   i64,
  pub word: String,
  /// Set while the word belongs to some visitor's recorded draw.
  pub used: bool,
}

// ─── Budget fitting ──────────────────────────────────────────────────────────

/// The most words a draw of `budget` characters could ever hold: one-letter
/// words separated by single spaces.
pub fn max_candidates(budget: usize) -> usize { budget.div_ceil(2) }

/// Keep candidates, in order, while the space-joined text stays within
/// `budget` characters. A word that would overflow is skipped; later, shorter
/// candidates may still fit.
pub fn fit_to_budget(candidates: Vec<PoolEntry>, budget: usize) -> Vec<PoolEntry> {
  let mut length = 0;
  let mut chosen = Vec::new();

  for entry in candidates {
    let word_len = entry.word.chars().count();
    if word_len == 0 {
      continue;
    }
    let extra = if chosen.is_empty() { word_len } else { word_len + 1 };
    if length + extra <= budget {
      length += extra;
      chosen.push(entry);
    }
  }

  chosen
}

/// Assemble the text handed to a visitor.
pub fn join_words(entries: &[PoolEntry]) -> String {
  entries
    .iter()
    .map(|e| e.word.as_str())
    .collect::<Vec<_>>()
    .join(" ")
}

// ─── Progress ────────────────────────────────────────────────────────────────

/// How much of the pool has been handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
  pub total: u64,
  pub used:  u64,
}

impl Progress {
  /// Consumed share in `0.0..=1.0`; an empty pool reports `0.0`.
  pub fn fraction(&self) -> f64 {
    if self.total == 0 {
      0.0
    } else {
      self.used as f64 / self.total as f64
    }
  }

  pub fn remaining(&self) -> u64 { self.total.saturating_sub(self.used) }

  pub fn is_exhausted(&self) -> bool { self.remaining() == 0 }
}
