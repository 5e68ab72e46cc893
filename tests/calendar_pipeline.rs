// tests/calendar_pipeline.rs
// End-to-end run over an inline events CSV: parse, normalize, index,
// score, normalize to 0-100. Era context is Reiwa 7 and `today` is pinned
// so every date in the fixture resolves deterministically.

use chrono::NaiveDate;
use tourism_demand_calendar::ingest::normalize_rows_at;
use tourism_demand_calendar::resolve::DateOutcome;
use tourism_demand_calendar::{
    aggregate, read_events_csv, EventIndex, HolidaySet, ImpactLevel, MonthlyTrends, ScoringConfig,
};

const EVENTS_CSV: &str = "\
EventType,Subject,DateText,Location,Description,Organizer,Contact,DataSource
イベント,第40回くしろ港まつり,2025-08-01～2025-08-03,釧路市内 北大通ほか,\"参集人員: 3,000人\",港まつり実行委員会,0154-00-0000,matsuri_pdf
クルーズ,飛鳥Ⅱ入港,2025-08-02,釧路港耐震旅客船ターミナル,\"総トン数: 50,444t\",,,cruise_schedule
大会,全国高校生アイスホッケー選手権,2025年8月2日～8月3日,釧路アイスアリーナ,参集人員: 600人,連盟事務局,,taikai_pdf
コンサート,夏のホールコンサート,8月2日,釧路市民文化会館 大ホール,,文化振興財団,,hall_site
イベント,霧のまつり,8月上旬,幣舞橋周辺,,観光協会,,kankou_pdf
イベント,阿寒湖まつり,2025-08-02,阿寒湖温泉街,,阿寒観光協会,,kankou_pdf
イベント,港の夜市,2025年8月1日(予定),港文館前,,商店街組合,,kankou_pdf
大会,春季スケート選手権,未定,柳町スピードスケート場,,スケート連盟,,taikai_pdf
";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

fn today() -> NaiveDate {
    date(2025, 3, 1)
}

fn close(got: f64, want: f64, what: &str) {
    assert!(
        (got - want).abs() < 1e-9,
        "{what}: got {got}, want {want}"
    );
}

/// Full fixture run shared by the assertions below.
fn run() -> (Vec<tourism_demand_calendar::DailyRecord>, Vec<tourism_demand_calendar::PendingEvent>) {
    let cfg = ScoringConfig::default_seed();
    let rows = read_events_csv(EVENTS_CSV.as_bytes()).expect("parse events CSV");
    assert_eq!(rows.len(), 8);

    let (records, excluded) = normalize_rows_at(rows, Some(7), &cfg, today());
    assert_eq!(excluded, 1, "the 阿寒 row is dropped");
    assert_eq!(records.len(), 7);

    let (index, pending) = EventIndex::build(records);
    assert_eq!(index.len(), 5, "five events carry resolvable dates");

    let holidays = HolidaySet::from_pairs([(date(2025, 8, 11), "山の日".to_string())]);
    let trends = MonthlyTrends::from_map([("2025-08".to_string(), 80.0)].into());

    let days = aggregate(
        &index,
        &holidays,
        &trends,
        date(2025, 8, 1),
        date(2025, 8, 11),
        &cfg,
    )
    .expect("valid range");
    (days, pending)
}

#[test]
fn calendar_is_chronological_with_no_gaps() {
    let (days, _) = run();
    assert_eq!(days.len(), 11);
    assert_eq!(days[0].date, date(2025, 8, 1));
    assert_eq!(days[10].date, date(2025, 8, 11));
    for pair in days.windows(2) {
        assert_eq!(
            pair[0].date.succ_opt(),
            Some(pair[1].date),
            "consecutive days"
        );
    }
}

#[test]
fn busiest_day_collects_all_active_events() {
    let (days, _) = run();
    let busiest = &days[1];
    assert_eq!(busiest.date, date(2025, 8, 2));

    let subjects: Vec<&str> = busiest.events.iter().map(|e| e.subject.as_str()).collect();
    assert_eq!(
        subjects,
        vec![
            "🎉 第40回くしろ港まつり",
            "🚢 飛鳥Ⅱ入港",
            "🏆 全国高校生アイスホッケー選手権",
            "🎤 夏のホールコンサート",
        ],
        "arrival order with category markers"
    );

    // trend 80*2, matsuri (3000/3)/5, cruise (1441/1)/5 damped by 5,
    // hockey (600/2)/5 + 600/10 lodging + 50/2 national, concert 1500/5,
    // weekend 20.
    let cruise = 1441.0_f64 / 5.0 / 5.0;
    close(
        busiest.raw_score,
        160.0 + 200.0 + cruise + 145.0 + 300.0 + 20.0,
        "raw score on 8/2",
    );
    close(busiest.normalized_score, 100.0, "busiest day pins the scale");
    assert_eq!(busiest.impact_level, ImpactLevel::High);
}

#[test]
fn multi_day_events_cover_every_span_day() {
    let (days, _) = run();
    let sunday = &days[2];
    assert_eq!(sunday.date, date(2025, 8, 3));

    let subjects: Vec<&str> = sunday.events.iter().map(|e| e.subject.as_str()).collect();
    assert_eq!(
        subjects,
        vec!["🎉 第40回くしろ港まつり", "🏆 全国高校生アイスホッケー選手権"],
        "both multi-day events still active"
    );
    close(sunday.raw_score, 160.0 + 200.0 + 145.0 + 20.0, "raw on 8/3");
}

#[test]
fn estimators_backfill_missing_attendance() {
    let (days, _) = run();
    let busiest = &days[1];

    let cruise = busiest
        .events
        .iter()
        .find(|e| e.subject.contains("飛鳥"))
        .expect("cruise event on 8/2");
    assert_eq!(cruise.estimated_attendees, 1_441, "50,444t / 35");
    assert_eq!(cruise.impact_level, ImpactLevel::High);

    let concert = busiest
        .events
        .iter()
        .find(|e| e.subject.contains("コンサート"))
        .expect("concert event on 8/2");
    assert_eq!(concert.estimated_attendees, 1_500, "venue capacity");
    assert_eq!(concert.impact_level, ImpactLevel::High);
}

#[test]
fn quiet_weekday_scores_trend_only() {
    let (days, _) = run();
    let monday = &days[3];
    assert_eq!(monday.date, date(2025, 8, 4));
    assert!(monday.events.is_empty());
    close(monday.raw_score, 160.0, "trend only");
    assert_eq!(monday.impact_level, ImpactLevel::Low);
    assert!(monday.normalized_score > 0.0 && monday.normalized_score < 30.0);
}

#[test]
fn holiday_carries_bonus_and_name() {
    let (days, _) = run();
    let mountain_day = &days[10];
    assert_eq!(mountain_day.date, date(2025, 8, 11));
    assert!(mountain_day.is_holiday);
    assert_eq!(mountain_day.holiday_name.as_deref(), Some("山の日"));
    close(mountain_day.raw_score, 160.0 + 50.0, "trend plus holiday bonus");
}

#[test]
fn unresolvable_dates_go_to_pending_not_calendar() {
    let (days, pending) = run();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].subject, "霧のまつり");
    assert_eq!(pending[0].original_date, "8月上旬");
    assert_eq!(pending[0].location, "幣舞橋周辺");
    assert_eq!(pending[1].subject, "春季スケート選手権");
    assert_eq!(pending[1].original_date, "未定");

    for day in &days {
        for event in &day.events {
            assert!(
                !event.subject.contains("霧のまつり")
                    && !event.subject.contains("スケート選手権"),
                "pending event must not appear on {}",
                day.date
            );
        }
    }
}

#[test]
fn tentative_dates_resolve_with_a_note() {
    let cfg = ScoringConfig::default_seed();
    let rows = read_events_csv(EVENTS_CSV.as_bytes()).expect("parse events CSV");
    let (records, _) = normalize_rows_at(rows, Some(7), &cfg, today());

    let yoichi = records
        .iter()
        .find(|r| r.subject == "港の夜市")
        .expect("tentative row survives");
    assert_eq!(yoichi.start_date, DateOutcome::Resolved(date(2025, 8, 1)));
    assert_eq!(yoichi.span_days(), Some(1));
    assert!(
        yoichi.description.contains("(日程は予定)"),
        "got: {}",
        yoichi.description
    );
}

#[test]
fn normalized_scores_stay_in_band_and_track_raw_order() {
    let (days, _) = run();
    for day in &days {
        assert!(
            (0.0..=100.0).contains(&day.normalized_score),
            "normalized {} out of band on {}",
            day.normalized_score,
            day.date
        );
    }
    for a in &days {
        for b in &days {
            if a.raw_score < b.raw_score {
                assert!(
                    a.normalized_score < b.normalized_score,
                    "normalization must preserve order ({} vs {})",
                    a.date,
                    b.date
                );
            }
        }
    }
}
