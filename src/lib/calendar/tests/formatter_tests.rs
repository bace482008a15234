use crate::models::event_model::{
    CourseRef, GroupCourseRef, GroupRef, RoomRef, SubjectRef, TeacherRef,
};

use super::*;

fn named_group_course(group: &str, teacher: &str, subject: &str) -> GroupCourseRef {
    GroupCourseRef {
        id: Some(7),
        group: Some(GroupRef {
            id: Some(1),
            name: Some(group.to_owned()),
            ..Default::default()
        }),
        teacher: Some(TeacherRef {
            id: Some(2),
            user: Some(teacher.to_owned()),
            ..Default::default()
        }),
        course: Some(CourseRef {
            id: Some(3),
            subject: Some(SubjectRef {
                id: Some(4),
                name: Some(subject.to_owned()),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn math_lesson() -> ScheduledEventRecord {
    ScheduledEventRecord {
        id: 1,
        specific_date: Some("2024-05-01".to_owned()),
        start_time: "09:00".to_owned(),
        end_time: "10:30".to_owned(),
        topic: Some(String::new()),
        duration_minutes: Some(90),
        group_course: Some(named_group_course("10A", "Ivanova", "Math")),
        room: Some(RoomRef {
            id: Some(5),
            name: Some("101".to_owned()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

#[test]
fn formats_dated_lesson() {
    let event = format_event(&math_lesson()).unwrap();
    assert_eq!(event.id, 1);
    assert_eq!(event.title, "Lesson\n10A\n101");
    assert_eq!(event.start, "2024-05-01T09:00");
    assert_eq!(event.end, "2024-05-01T10:30");
    assert_eq!(event.class_name, "subject-physics");
    assert_eq!(event.extended_props.group_name, "10A");
    assert_eq!(event.extended_props.teacher_name, "Ivanova");
    assert_eq!(event.extended_props.room_name, "101");
    assert_eq!(event.extended_props.subject_name, "Math");
    assert_eq!(event.extended_props.duration, Some(90));
    assert!(!event.extended_props.has_conflicts);
    assert_eq!(event.record(), &math_lesson());
}

#[test]
fn topic_is_kept_when_present() {
    let mut record = math_lesson();
    record.topic = Some("Fractions".to_owned());
    assert_eq!(event_title(&record), "Fractions\n10A\n101");

    record.topic = Some("   ".to_owned());
    assert_eq!(event_title(&record), "Lesson\n10A\n101");
}

#[test]
fn missing_references_render_empty() {
    let mut record = math_lesson();
    record.group_course = None;
    record.room = None;
    let event = format_event(&record).unwrap();
    assert_eq!(event.title, "Lesson\n\n");
    assert_eq!(event.class_name, DEFAULT_SUBJECT_CLASS);
    assert_eq!(event.extended_props.group_name, "");
    assert_eq!(event.extended_props.teacher_name, "");
    assert_eq!(event.extended_props.subject_name, "");
}

#[test]
fn missing_anchor_is_rejected() {
    let mut record = math_lesson();
    record.specific_date = None;
    assert_eq!(
        format_event(&record),
        Err(FormatError::MissingAnchor { id: 1 })
    );
}

#[test]
fn empty_specific_date_falls_back_to_weekday() {
    let mut record = math_lesson();
    record.specific_date = Some(String::new());
    record.weekday = Some(4);
    assert_eq!(anchor_date(&record, None).unwrap(), "4");
}

#[test]
fn inverted_times_are_rejected() {
    let mut record = math_lesson();
    record.start_time = "10:30".to_owned();
    record.end_time = "09:00".to_owned();
    assert!(matches!(
        format_event(&record),
        Err(FormatError::InvertedTimes { id: 1, .. })
    ));
}

#[test]
fn weekly_lesson_is_placed_in_week() {
    let mut record = math_lesson();
    record.specific_date = None;
    record.weekday = Some(2);
    // 2024-05-01 is a Wednesday
    let event = format_event_in_week(&record, Some(date("2024-05-01"))).unwrap();
    assert_eq!(event.start, "2024-05-01T09:00");

    record.weekday = Some(0);
    let event = format_event_in_week(&record, Some(date("2024-05-03"))).unwrap();
    assert_eq!(event.start, "2024-04-29T09:00");
    assert_eq!(event.end, "2024-04-29T10:30");
}

#[test]
fn weekly_lesson_without_week_keeps_weekday() {
    let mut record = math_lesson();
    record.specific_date = None;
    record.weekday = Some(3);
    let event = format_event(&record).unwrap();
    assert_eq!(event.start, "3T09:00");
}

#[test]
fn subject_hash_matches_known_value() {
    assert_eq!(subject_hash(""), 0);
    assert_eq!(subject_hash("Math"), 2390824);
    assert_eq!(subject_class("Math"), "subject-physics");
    assert_eq!(subject_class(""), DEFAULT_SUBJECT_CLASS);
}

#[test]
fn subject_class_is_stable() {
    for name in ["Math", "Physics", "Литература", "A very long subject name indeed"] {
        let class = subject_class(name);
        assert_eq!(class, subject_class(name));
        assert!(SUBJECT_CLASSES.contains(&class));
    }
}

#[test]
fn one_bad_record_fails_batch() {
    let mut broken = math_lesson();
    broken.id = 2;
    broken.specific_date = None;
    let range = DateRange::new(date("2024-04-29"), date("2024-05-06"));
    let result = format_events(&[math_lesson(), broken], &range);
    assert_eq!(result, Err(FormatError::MissingAnchor { id: 2 }));

    let events = format_events(&[math_lesson()], &range).unwrap();
    assert_eq!(events.len(), 1);
}

#[test]
fn weekly_lesson_repeats_across_range() {
    let mut record = math_lesson();
    record.specific_date = None;
    record.weekday = Some(0);
    let range = DateRange::new(date("2024-04-29"), date("2024-06-10"));

    let starts: Vec<String> = format_events(&[record, math_lesson()], &range)
        .unwrap()
        .into_iter()
        .map(|event| event.start)
        .collect();

    assert_eq!(
        starts,
        vec![
            "2024-04-29T09:00",
            "2024-05-06T09:00",
            "2024-05-13T09:00",
            "2024-05-20T09:00",
            "2024-05-27T09:00",
            "2024-06-03T09:00",
            "2024-05-01T09:00",
        ]
    );
}

#[test]
fn weekly_lesson_outside_range_yields_nothing() {
    let mut record = math_lesson();
    record.specific_date = None;
    record.weekday = Some(5);
    // Tuesday to Thursday, no Saturday inside
    let range = DateRange::new(date("2024-04-30"), date("2024-05-03"));
    assert!(format_events(&[record.clone()], &range).unwrap().is_empty());

    record.end_time = "08:00".to_owned();
    assert!(matches!(
        format_events(&[record], &range),
        Err(FormatError::InvertedTimes { id: 1, .. })
    ));
}

#[test]
fn weekly_range_starting_midweek_skips_earlier_days() {
    let mut record = math_lesson();
    record.specific_date = None;
    record.weekday = Some(0);
    let range = DateRange::new(date("2024-05-01"), date("2024-05-15"));
    let starts: Vec<String> = format_events(&[record], &range)
        .unwrap()
        .into_iter()
        .map(|event| event.start)
        .collect();
    assert_eq!(starts, vec!["2024-05-06T09:00", "2024-05-13T09:00"]);
}
