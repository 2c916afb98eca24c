use serde::Serialize;

use lottostats_db::models::{DrawHistory, DrawResult};

/// Result of comparing a ticket with one drawing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketCheck {
    /// Ticket numbers found among the drawn main numbers, ascending
    pub matched: Vec<u8>,
    pub main_matches: usize,
    /// `None` when either side has no bonus number
    pub bonus_match: Option<bool>,
}

impl TicketCheck {
    pub fn is_jackpot(&self, main_count: usize) -> bool {
        self.main_matches == main_count && self.bonus_match != Some(false)
    }
}

pub fn check_ticket(draw: &DrawResult, numbers: &[u8], bonus: Option<u8>) -> TicketCheck {
    let mut matched: Vec<u8> = numbers.iter().copied().filter(|n| draw.numbers.contains(n)).collect();
    matched.sort_unstable();
    matched.dedup();
    let bonus_match = match (bonus, draw.bonus_number) {
        (Some(mine), Some(drawn)) => Some(mine == drawn),
        _ => None,
    };
    TicketCheck {
        main_matches: matched.len(),
        matched,
        bonus_match,
    }
}

/// Checks a ticket against the `last` newest draws, newest first.
pub fn check_against_history<'a>(
    history: &'a DrawHistory,
    numbers: &[u8],
    bonus: Option<u8>,
    last: usize,
) -> Vec<(&'a DrawResult, TicketCheck)> {
    history
        .recent(last)
        .iter()
        .map(|draw| (draw, check_ticket(draw, numbers, bonus)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{draw_on, history_from};

    #[test]
    fn test_check_ticket_matches() {
        let draw = draw_on(0, &[3, 14, 25, 36, 47], Some(9));
        let check = check_ticket(&draw, &[47, 3, 10, 11, 25], Some(9));
        assert_eq!(check.matched, vec![3, 25, 47]);
        assert_eq!(check.main_matches, 3);
        assert_eq!(check.bonus_match, Some(true));
        assert!(!check.is_jackpot(5));
    }

    #[test]
    fn test_check_ticket_jackpot() {
        let draw = draw_on(0, &[1, 2, 3, 4, 5], Some(2));
        assert!(check_ticket(&draw, &[5, 4, 3, 2, 1], Some(2)).is_jackpot(5));
        assert!(!check_ticket(&draw, &[5, 4, 3, 2, 1], Some(3)).is_jackpot(5));
    }

    #[test]
    fn test_check_ticket_without_bonus() {
        let draw = draw_on(0, &[1, 2, 3, 4, 5], None);
        let check = check_ticket(&draw, &[1, 2, 3, 4, 5], Some(1));
        assert_eq!(check.bonus_match, None);
        assert!(check.is_jackpot(5));
    }

    #[test]
    fn test_check_ticket_ignores_repeated_numbers() {
        let draw = draw_on(0, &[1, 2, 3, 4, 5], None);
        assert_eq!(check_ticket(&draw, &[1, 1, 1, 9, 10], None).main_matches, 1);
    }

    #[test]
    fn test_check_against_history() {
        let history = history_from(vec![
            draw_on(0, &[1, 2, 3, 4, 5], None),
            draw_on(1, &[6, 7, 8, 9, 10], None),
            draw_on(2, &[1, 7, 20, 21, 22], None),
        ]);
        let results = check_against_history(&history, &[1, 7, 8], None, 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0.date, draw_on(2, &[], None).date);
        assert_eq!(results[0].1.main_matches, 2);
        assert_eq!(results[1].1.main_matches, 2);
        assert!(check_against_history(&history, &[1], None, 0).is_empty());
    }
}
