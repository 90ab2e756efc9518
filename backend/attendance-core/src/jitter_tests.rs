// src/jitter_tests.rs

#[cfg(test)]
mod tests {
    use crate::jitter::*;
    use crate::schedule::NormalizedSlot;

    // Hands out a scripted sequence of draws, cycling when exhausted
    struct ScriptedJitter {
        values: Vec<u32>,
        next: usize,
    }

    impl JitterSource for ScriptedJitter {
        fn draw(&mut self, max: u32) -> u32 {
            let value = self.values[self.next % self.values.len()];
            self.next += 1;
            value.min(max)
        }
    }

    fn slot(start: u32, end: u32) -> NormalizedSlot {
        NormalizedSlot {
            start,
            end,
            break_minutes: 0,
        }
    }

    #[test]
    fn test_zero_entropy_leaves_slots_untouched() {
        let mut source = RngJitter::seeded(7);
        let plan = JitterPlan::draw(&mut source, 0, 2);
        let morning = slot(495, 780);
        let afternoon = slot(810, 1005);

        assert_eq!(plan.apply(&morning, 0), (495, 780));
        assert_eq!(plan.apply(&afternoon, 1), (810, 1005));
    }

    #[test]
    fn test_draws_stay_within_one_and_entropy() {
        let mut source = RngJitter::seeded(42);
        for _ in 0..200 {
            let plan = JitterPlan::draw(&mut source, 15, 3);
            for i in 0..3 {
                let offset = plan.start_offset(i);
                assert!((1..=15).contains(&offset), "offset {} out of range", offset);
            }
        }
    }

    #[test]
    fn test_start_jitter_of_slot_i_equals_end_jitter_of_its_mirror() {
        let mut source = RngJitter::seeded(2024);
        for total in 1..=6 {
            let plan = JitterPlan::draw(&mut source, 12, total);
            for i in 0..total {
                assert_eq!(
                    plan.start_offset(i),
                    plan.end_offset(total - 1 - i),
                    "pairing broken for slot {} of {}",
                    i,
                    total
                );
            }
        }
    }

    #[test]
    fn test_single_slot_keeps_its_duration() {
        let mut source = ScriptedJitter {
            values: vec![9],
            next: 0,
        };
        let plan = JitterPlan::draw(&mut source, 15, 1);
        let (start, end) = plan.apply(&slot(540, 1050), 0);
        assert_eq!((start, end), (549, 1059));
        assert_eq!(end - start, 510);
    }

    #[test]
    fn test_two_slots_keep_window_and_gap() {
        let mut source = ScriptedJitter {
            values: vec![3, 11],
            next: 0,
        };
        let plan = JitterPlan::draw(&mut source, 15, 2);
        let morning = plan.apply(&slot(495, 780), 0);
        let afternoon = plan.apply(&slot(810, 1005), 1);

        assert_eq!(morning, (498, 791));
        assert_eq!(afternoon, (821, 1008));
        // First start and last end move by the same draw
        assert_eq!(afternoon.1 - morning.0, 1005 - 495);
        // Lunch gap survives because both edges use the second draw
        assert_eq!(afternoon.0 - morning.1, 810 - 780);
    }

    #[test]
    fn test_seeded_sources_are_reproducible() {
        let first = JitterPlan::draw(&mut RngJitter::seeded(99), 15, 4);
        let second = JitterPlan::draw(&mut RngJitter::seeded(99), 15, 4);
        assert_eq!(first, second);
    }

    #[test]
    fn test_out_of_range_index_has_no_offset() {
        let plan = JitterPlan::from_offsets(vec![4, 8]);
        assert_eq!(plan.start_offset(5), 0);
        assert_eq!(plan.end_offset(5), 0);
        assert_eq!(plan.len(), 2);
        assert!(!plan.is_empty());
    }

    #[test]
    fn test_huge_offsets_saturate() {
        let plan = JitterPlan::from_offsets(vec![u32::MAX]);
        let slot = NormalizedSlot {
            start: 60,
            end: 1440,
            break_minutes: 0,
        };
        assert_eq!(plan.apply(&slot, 0), (u32::MAX, u32::MAX));
    }
}
