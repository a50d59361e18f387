use crate::types::{Side, Tick};

/// Splits a tick slice into candidate windows, one per qualification point.
///
/// The first window runs from the start of the slice through the first
/// qualifying tick. Each later window starts right after the previous
/// qualifying tick and ends at (and includes) the next one. Ticks after the
/// last qualifying tick belong to no window.
#[derive(Debug, Clone)]
pub struct CandidateWindows<'a> {
    ticks: &'a [Tick],
    next_start: usize,
}

impl<'a> CandidateWindows<'a> {
    pub fn new(ticks: &'a [Tick]) -> Self {
        Self {
            ticks,
            next_start: 0,
        }
    }
}

impl<'a> Iterator for CandidateWindows<'a> {
    type Item = &'a [Tick];

    fn next(&mut self) -> Option<Self::Item> {
        let ticks: &'a [Tick] = self.ticks;
        let rest = &ticks[self.next_start..];
        let offset = rest.iter().position(|t| t.qualifies)?;
        let window = &rest[..=offset];
        self.next_start += offset + 1;
        Some(window)
    }
}

/// Pick the tick this side fills at within `window`.
///
/// Buy takes the highest price, Sell the lowest. On equal prices the
/// earliest tick wins. Returns `None` only for an empty window.
pub fn select_price(window: &[Tick], side: Side) -> Option<&Tick> {
    window.iter().reduce(|best, t| {
        if side.prefers(t.price_millionths, best.price_millionths) {
            t
        } else {
            best
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::make_tick;
    use crate::types::TimeKey;

    fn keys(window: &[Tick]) -> Vec<i64> {
        window.iter().map(|t| t.key.timestamp_ms).collect()
    }

    #[test]
    fn test_windows_split_on_qualification_points() {
        let ticks = vec![
            make_tick(1, 0, 100, 1, false),
            make_tick(2, 0, 100, 1, true),
            make_tick(3, 0, 100, 1, false),
            make_tick(4, 0, 100, 1, false),
            make_tick(5, 0, 100, 1, true),
            make_tick(6, 0, 100, 1, true),
            make_tick(7, 0, 100, 1, false),
        ];
        let windows: Vec<Vec<i64>> = CandidateWindows::new(&ticks).map(keys).collect();
        assert_eq!(windows, vec![vec![1, 2], vec![3, 4, 5], vec![6]]);
    }

    #[test]
    fn test_no_qualifying_ticks_no_windows() {
        let ticks = vec![make_tick(1, 0, 100, 1, false), make_tick(2, 0, 100, 1, false)];
        assert_eq!(CandidateWindows::new(&ticks).count(), 0);
        assert_eq!(CandidateWindows::new(&[]).count(), 0);
    }

    #[test]
    fn test_every_tick_qualifies_single_element_windows() {
        let ticks = vec![
            make_tick(1, 0, 100, 1, true),
            make_tick(2, 0, 120, 1, true),
            make_tick(3, 0, 90, 1, true),
        ];
        let windows: Vec<Vec<i64>> = CandidateWindows::new(&ticks).map(keys).collect();
        assert_eq!(windows, vec![vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn test_select_buy_takes_max() {
        let window = vec![
            make_tick(1, 0, 100, 1, false),
            make_tick(2, 0, 130, 1, false),
            make_tick(3, 0, 110, 1, true),
        ];
        assert_eq!(select_price(&window, Side::Buy).unwrap().price_millionths, 130);
    }

    #[test]
    fn test_select_sell_takes_min() {
        let window = vec![
            make_tick(1, 0, 100, 1, false),
            make_tick(2, 0, 80, 1, false),
            make_tick(3, 0, 110, 1, true),
        ];
        assert_eq!(select_price(&window, Side::Sell).unwrap().price_millionths, 80);
    }

    #[test]
    fn test_select_ties_keep_earliest() {
        let window = vec![
            make_tick(1, 0, 100, 1, false),
            make_tick(1, 1, 100, 2, false),
            make_tick(2, 0, 100, 3, true),
        ];
        for side in Side::ALL {
            let pick = select_price(&window, side).unwrap();
            assert_eq!(pick.key, TimeKey::new(1, 0));
        }
    }

    #[test]
    fn test_select_empty_window() {
        assert!(select_price(&[], Side::Buy).is_none());
    }
}
