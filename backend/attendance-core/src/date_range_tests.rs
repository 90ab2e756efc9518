// src/date_range_tests.rs

#[cfg(test)]
mod tests {
    use crate::date_range::*;
    use crate::error::ValidationError;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_rejects_inverted_range() {
        let err = DateRange::new(date(2024, 5, 10), date(2024, 5, 1)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvertedRange {
                start: date(2024, 5, 10),
                end: date(2024, 5, 1)
            }
        );
    }

    #[test]
    fn test_days_are_inclusive_and_ascending() {
        let range = DateRange::new(date(2024, 2, 27), date(2024, 3, 2)).unwrap();
        let days: Vec<_> = range.days().collect();
        assert_eq!(
            days,
            vec![
                date(2024, 2, 27),
                date(2024, 2, 28),
                date(2024, 2, 29),
                date(2024, 3, 1),
                date(2024, 3, 2)
            ]
        );
        assert_eq!(range.len_days(), 5);
    }

    #[test]
    fn test_single_day_range_yields_one_day() {
        let range = DateRange::single_day(date(2024, 5, 6));
        assert_eq!(range.days().count(), 1);
        assert!(range.contains(date(2024, 5, 6)));
        assert!(!range.contains(date(2024, 5, 7)));
    }

    #[test]
    fn test_month_of_covers_whole_month() {
        let feb = DateRange::month_of(date(2024, 2, 14));
        assert_eq!(feb.start(), date(2024, 2, 1));
        assert_eq!(feb.end(), date(2024, 2, 29));

        let dec = DateRange::month_of(date(2023, 12, 31));
        assert_eq!(dec.start(), date(2023, 12, 1));
        assert_eq!(dec.end(), date(2023, 12, 31));
    }

    #[test]
    fn test_instants_bracket_the_range() {
        let range = DateRange::new(date(2024, 5, 1), date(2024, 5, 31)).unwrap();
        assert_eq!(to_api_timestamp(range.start_instant()), "2024-05-01T00:00:00.000Z");
        assert_eq!(to_api_timestamp(range.end_instant()), "2024-05-31T23:59:59.999Z");
    }
}
