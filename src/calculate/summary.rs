//! Headline figures over a draw set.

use crate::models::{DrawRecord, DrawSummary};

/// Summarize `draws`. Tier-based counts only look at draws that carry tiers.
pub fn summarize(draws: &[DrawRecord]) -> DrawSummary {
    let mut summary = DrawSummary {
        total_draws: draws.len(),
        ..DrawSummary::default()
    };

    for draw in draws {
        if let Some(date) = draw.date {
            summary.first_date = Some(summary.first_date.map_or(date, |d| d.min(date)));
            summary.last_date = Some(summary.last_date.map_or(date, |d| d.max(date)));
        }

        if let Some(combination) = draw.combination() {
            summary.complete_draws += 1;
            let even = combination.numbers().iter().filter(|&&n| n % 2 == 0).count() as u64;
            summary.even_count += even;
            summary.odd_count += combination.numbers().len() as u64 - even;
        }

        if let Some(tiers) = draw.prize_tiers {
            summary.draws_with_tier_data += 1;
            if tiers.sena == 0 {
                summary.draws_without_jackpot_winner += 1;
            }
            if tiers.quina == 0 {
                summary.draws_without_quina_winner += 1;
            }
            if tiers.quadra == 0 {
                summary.draws_without_quadra_winner += 1;
            }
        }

        if let Some(amount) = draw.accumulated_prize {
            summary.max_accumulated = Some(summary.max_accumulated.map_or(amount, |m| m.max(amount)));
        }
    }

    summary
}
