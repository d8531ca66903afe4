use chrono::Weekday;
use fournil_forecast::hours::{model_weekday, opening_hours};
use rstest::rstest;

#[test]
fn monday_is_always_closed() {
    assert!(opening_hours(Weekday::Mon).is_none());
}

#[rstest]
#[case(Weekday::Tue, 10, 17)]
#[case(Weekday::Wed, 10, 17)]
#[case(Weekday::Thu, 10, 18)]
#[case(Weekday::Fri, 10, 18)]
#[case(Weekday::Sat, 10, 17)]
#[case(Weekday::Sun, 10, 17)]
fn weekly_open_windows(#[case] weekday: Weekday, #[case] open: u32, #[case] close: u32) {
    let window = opening_hours(weekday).unwrap();
    assert_eq!(window.open, open);
    assert_eq!(window.close, close);
    assert_eq!(window.span_hours(), close - open);
}

#[rstest]
#[case(Weekday::Sun, 0)]
#[case(Weekday::Mon, 1)]
#[case(Weekday::Tue, 2)]
#[case(Weekday::Wed, 3)]
#[case(Weekday::Thu, 4)]
#[case(Weekday::Fri, 5)]
#[case(Weekday::Sat, 6)]
fn model_weekday_uses_sunday_zero(#[case] weekday: Weekday, #[case] feature: u8) {
    assert_eq!(model_weekday(weekday), feature);
}
