// src/clock_time_tests.rs

#[cfg(test)]
mod tests {
    use crate::clock_time::*;

    #[test]
    fn test_parse_clock_time_accepts_unpadded_and_padded_hours() {
        assert_eq!(parse_clock_time("8:15").unwrap(), 495);
        assert_eq!(parse_clock_time("08:15").unwrap(), 495);
        assert_eq!(parse_clock_time("13:30").unwrap(), 810);
        assert_eq!(parse_clock_time("0:00").unwrap(), 0);
        assert_eq!(parse_clock_time("23:59").unwrap(), 1439);
        assert_eq!(parse_clock_time(" 9:00 ").unwrap(), 540);
    }

    #[test]
    fn test_parse_clock_time_rejects_malformed_input() {
        for bad in ["", "8", "8:5", "8:150", "24:00", "12:60", "ab:cd", "8h15", "-1:00", "123:00"] {
            let err = parse_clock_time(bad).expect_err(bad);
            assert_eq!(err.input, bad);
        }
    }

    #[test]
    fn test_format_clock_time_pads_minutes_only() {
        assert_eq!(format_clock_time(495), "8:15");
        assert_eq!(format_clock_time(0), "0:00");
        assert_eq!(format_clock_time(1005), "16:45");
        assert_eq!(format_clock_time(605), "10:05");
    }

    #[test]
    fn test_format_clock_time_past_midnight_keeps_counting() {
        assert_eq!(format_clock_time(MINUTES_PER_DAY + 10), "24:10");
    }

    #[test]
    fn test_format_then_parse_is_identity_within_a_day() {
        for minutes in [0, 59, 60, 495, 810, 1439] {
            assert_eq!(parse_clock_time(&format_clock_time(minutes)).unwrap(), minutes);
        }
    }

    #[test]
    fn test_parse_duration_minutes_accepts_both_forms() {
        assert_eq!(parse_duration_minutes("8:00").unwrap(), 480);
        assert_eq!(parse_duration_minutes("00:30").unwrap(), 30);
        assert_eq!(parse_duration_minutes("45").unwrap(), 45);
        assert!(parse_duration_minutes("half an hour").is_err());
    }
}
