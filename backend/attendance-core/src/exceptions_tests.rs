// src/exceptions_tests.rs

#[cfg(test)]
mod tests {
    use crate::date_range::DateRange;
    use crate::exceptions::*;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn instant(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn may_2024() -> DateRange {
        DateRange::month_of(date(2024, 5, 15))
    }

    fn vacation(from: &str, to: &str) -> TimeOffRecord {
        TimeOffRecord {
            policy_name: "Vacation".to_string(),
            from: instant(from),
            to: instant(to),
        }
    }

    #[test]
    fn test_sources_are_merged_in_order_without_dedup() {
        let time_off = vec![vacation("2024-05-01T00:00:00.000Z", "2024-05-03T23:59:59.999Z")];
        let holidays = vec![HolidayRecord {
            name: "Labour Day".to_string(),
            date: date(2024, 5, 1),
        }];
        let custom = vec![CustomHolidayRecord {
            name: "Office closed".to_string(),
            date: date(2024, 5, 1),
        }];

        let resolved = resolve_exceptions(&time_off, &holidays, &custom, &may_2024());
        let reasons: Vec<_> = resolved.iter().map(|e| e.reason.as_str()).collect();
        assert_eq!(reasons, vec!["Vacation", "Labour Day", "Office closed"]);

        assert_eq!(
            reasons_for_day(&resolved, date(2024, 5, 1)),
            vec!["Vacation", "Labour Day", "Office closed"]
        );
        assert_eq!(reasons_for_day(&resolved, date(2024, 5, 2)), vec!["Vacation"]);
        assert!(reasons_for_day(&resolved, date(2024, 5, 4)).is_empty());
    }

    #[test]
    fn test_intervals_outside_range_are_dropped() {
        let holidays = vec![
            HolidayRecord {
                name: "New Year".to_string(),
                date: date(2024, 1, 1),
            },
            HolidayRecord {
                name: "Whit Monday".to_string(),
                date: date(2024, 5, 20),
            },
        ];
        let resolved = resolve_exceptions(&[], &holidays, &[], &may_2024());
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].reason, "Whit Monday");
    }

    #[test]
    fn test_time_off_straddling_range_start_is_kept() {
        let time_off = vec![vacation("2024-04-29T00:00:00.000Z", "2024-05-02T23:59:59.999Z")];
        let resolved = resolve_exceptions(&time_off, &[], &[], &may_2024());
        assert_eq!(resolved.len(), 1);
        assert!(resolved[0].contains_day(date(2024, 5, 2)));
        assert!(!resolved[0].contains_day(date(2024, 5, 3)));
    }

    #[test]
    fn test_whole_day_interval_bounds() {
        let interval = ExceptionInterval::whole_day("Holiday", date(2024, 5, 9));
        assert!(interval.contains(Utc.with_ymd_and_hms(2024, 5, 9, 0, 0, 0).unwrap()));
        assert!(interval.contains(instant("2024-05-09T23:59:59.999Z")));
        assert!(!interval.contains(Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap()));
        assert!(!interval.contains_day(date(2024, 5, 8)));
    }

    #[test]
    fn test_afternoon_only_time_off_does_not_cover_the_day_instant() {
        // Containment is checked against the day's 00:00 UTC instant
        let half_day = vec![vacation("2024-05-07T13:00:00.000Z", "2024-05-07T17:00:00.000Z")];
        let resolved = resolve_exceptions(&half_day, &[], &[], &may_2024());
        assert_eq!(resolved.len(), 1);
        assert!(reasons_for_day(&resolved, date(2024, 5, 7)).is_empty());
    }
}
