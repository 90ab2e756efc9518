// src/schedule_tests.rs

#[cfg(test)]
mod tests {
    use crate::error::{ScheduleError, ValidationError};
    use crate::schedule::*;
    use chrono::NaiveDate;

    // default: two slots, Friday: its own two slots
    fn office_template() -> ScheduleTemplate {
        ScheduleTemplate::new()
            .with_day(
                DayKey::Default,
                vec![TimeSlot::range("8:15", "13:00"), TimeSlot::range("13:30", "16:45")],
            )
            .with_day(
                DayKey::Day(DayOfWeek::Friday),
                vec![TimeSlot::range("8:15", "14:30"), TimeSlot::range("15:30", "17:15")],
            )
    }

    #[test]
    fn test_resolve_slots_prefers_exact_weekday() {
        let template = office_template();
        let friday = template.resolve_slots(DayOfWeek::Friday);
        assert_eq!(friday.len(), 2);
        assert_eq!(friday[0], TimeSlot::range("8:15", "14:30"));
    }

    #[test]
    fn test_resolve_slots_falls_back_to_default() {
        let template = office_template();
        for day in [DayOfWeek::Monday, DayOfWeek::Wednesday, DayOfWeek::Sunday] {
            let slots = template.resolve_slots(day);
            assert_eq!(slots[0], TimeSlot::range("8:15", "13:00"), "{}", day);
        }
    }

    #[test]
    fn test_resolve_slots_without_default_is_empty() {
        let template = ScheduleTemplate::standard_week();
        assert!(template.resolve_slots(DayOfWeek::Saturday).is_empty());
        assert!(template.resolve_slots(DayOfWeek::Sunday).is_empty());
        assert_eq!(template.resolve_slots(DayOfWeek::Tuesday).len(), 1);
        assert!(ScheduleTemplate::new().resolve_slots(DayOfWeek::Monday).is_empty());
    }

    #[test]
    fn test_slots_for_date_uses_calendar_weekday() {
        let template = office_template();
        // 2024-05-10 is a Friday
        let date = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        assert_eq!(template.slots_for_date(date)[1], TimeSlot::range("15:30", "17:15"));
    }

    #[test]
    fn test_day_key_parsing() {
        assert_eq!("default".parse::<DayKey>().unwrap(), DayKey::Default);
        assert_eq!("Fri".parse::<DayKey>().unwrap(), DayKey::Day(DayOfWeek::Friday));
        assert_eq!("monday".parse::<DayKey>().unwrap(), DayKey::Day(DayOfWeek::Monday));
        assert_eq!("0".parse::<DayKey>().unwrap(), DayKey::Day(DayOfWeek::Sunday));
        assert_eq!("6".parse::<DayKey>().unwrap(), DayKey::Day(DayOfWeek::Saturday));
        assert_eq!(
            "7".parse::<DayKey>(),
            Err(ValidationError::UnknownDayKey("7".to_string()))
        );
        assert!("Mon-Thu".parse::<DayKey>().is_err());
    }

    #[test]
    fn test_template_from_bamboohr_style_json() {
        let json = r#"{
            "default": [{ "start": "8:30", "end": "13:00" }, { "start": "13:30", "end": "17:00" }],
            "Fri": [{ "start": "8:30", "end": "14:30" }, { "start": "15:30", "end": "17:30" }]
        }"#;
        let template = ScheduleTemplate::from_json(json).unwrap();
        assert_eq!(template.resolve_slots(DayOfWeek::Friday)[1], TimeSlot::range("15:30", "17:30"));
        assert_eq!(template.resolve_slots(DayOfWeek::Monday)[0], TimeSlot::range("8:30", "13:00"));
        assert!(template.validate().is_ok());
    }

    #[test]
    fn test_template_from_kenjo_style_json() {
        let json = r#"{
            "1": [{ "start": "9:00", "hours": "8:00", "pause": "00:30" }],
            "5": [{ "start": "8:00", "durationMinutes": 360 }]
        }"#;
        let template = ScheduleTemplate::from_json(json).unwrap();

        let monday = template.resolve_slots(DayOfWeek::Monday)[0].normalize().unwrap();
        assert_eq!(
            monday,
            NormalizedSlot {
                start: 540,
                end: 540 + 480 + 30,
                break_minutes: 30
            }
        );

        let friday = template.resolve_slots(DayOfWeek::Friday)[0].normalize().unwrap();
        assert_eq!(friday.break_minutes, 0);
        assert_eq!(friday.end, 480 + 360);
        assert!(template.resolve_slots(DayOfWeek::Tuesday).is_empty());
    }

    #[test]
    fn test_template_rejects_unknown_key() {
        let json = r#"{ "Someday": [{ "start": "9:00", "end": "17:00" }] }"#;
        let err = ScheduleTemplate::from_json(json).unwrap_err();
        assert!(err.to_string().contains("Someday"), "{}", err);
    }

    #[test]
    fn test_template_round_trips_through_json() {
        let template = office_template();
        let json = serde_json::to_string(&template).unwrap();
        assert!(json.contains("\"default\""));
        assert!(json.contains("\"Fri\""));
        assert_eq!(ScheduleTemplate::from_json(&json).unwrap(), template);
    }

    #[test]
    fn test_validate_rejects_inverted_slot() {
        let template = ScheduleTemplate::new()
            .with_day(DayKey::Day(DayOfWeek::Monday), vec![TimeSlot::range("17:00", "9:00")]);
        match template.validate() {
            Err(ScheduleError::Validation(ValidationError::SlotNotIncreasing { day, index, .. })) => {
                assert_eq!(day, DayKey::Day(DayOfWeek::Monday));
                assert_eq!(index, 0);
            }
            other => panic!("Expected SlotNotIncreasing, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_overlap_and_bad_format() {
        let overlapping = ScheduleTemplate::new().with_day(
            DayKey::Default,
            vec![TimeSlot::range("8:00", "13:00"), TimeSlot::range("12:30", "16:00")],
        );
        assert!(matches!(
            overlapping.validate(),
            Err(ScheduleError::Validation(ValidationError::OverlappingSlots { index: 1, .. }))
        ));

        let malformed = ScheduleTemplate::new()
            .with_day(DayKey::Default, vec![TimeSlot::range("8h", "13:00")]);
        assert!(matches!(malformed.validate(), Err(ScheduleError::Format(_))));
    }

    #[test]
    fn test_break_longer_than_range_slot_is_rejected() {
        let slot = NormalizedSlot {
            start: 600,
            end: 630,
            break_minutes: 45,
        };
        assert!(matches!(
            slot.check(DayKey::Default, 0),
            Err(ValidationError::BreakExceedsSlot { span: 30, .. })
        ));
    }

    #[test]
    fn test_day_of_week_js_index_round_trip() {
        for day in DayOfWeek::ALL {
            assert_eq!(DayOfWeek::from_js_index(day.js_index()), Some(day));
        }
        assert_eq!(DayOfWeek::from_js_index(7), None);
    }

    #[test]
    fn test_huge_duration_is_rejected_instead_of_overflowing() {
        let template = ScheduleTemplate::from_json(
            r#"{"default": [{"start": "9:00", "durationMinutes": 4294967295, "breakMinutes": 30}]}"#,
        )
        .unwrap();
        match template.validate() {
            Err(ScheduleError::Validation(ValidationError::SlotPastMidnight { day, index, end })) => {
                assert_eq!(day, DayKey::Default);
                assert_eq!(index, 0);
                assert_eq!(end, u32::MAX);
            }
            other => panic!("Expected SlotPastMidnight, got {:?}", other),
        }

        let almost_max = ScheduleTemplate::from_json(
            r#"{"default": [{"start": "0:00", "durationMinutes": 4294967290}]}"#,
        )
        .unwrap();
        assert!(matches!(
            almost_max.validate(),
            Err(ScheduleError::Validation(ValidationError::SlotPastMidnight { .. }))
        ));
    }

    #[test]
    fn test_slot_may_end_exactly_at_midnight() {
        let template = ScheduleTemplate::new()
            .with_day(DayKey::Default, vec![TimeSlot::span("16:00", 450, 30)]);
        assert!(template.validate().is_ok());

        let late = ScheduleTemplate::new()
            .with_day(DayKey::Default, vec![TimeSlot::span("16:00", 450, 31)]);
        assert!(matches!(
            late.validate(),
            Err(ScheduleError::Validation(ValidationError::SlotPastMidnight { end: 1441, .. }))
        ));
    }

    #[test]
    fn test_resolve_reports_the_matching_key() {
        let template = office_template();
        assert_eq!(template.resolve(DayOfWeek::Friday).0, DayKey::Day(DayOfWeek::Friday));
        assert_eq!(template.resolve(DayOfWeek::Monday).0, DayKey::Default);

        let weekdays_only = ScheduleTemplate::standard_week();
        let (key, slots) = weekdays_only.resolve(DayOfWeek::Sunday);
        assert_eq!(key, DayKey::Day(DayOfWeek::Sunday));
        assert!(slots.is_empty());

        assert!(template.slots_for_key(DayKey::Default).is_some());
        assert!(template.slots_for_key(DayKey::Day(DayOfWeek::Monday)).is_none());
    }
}
