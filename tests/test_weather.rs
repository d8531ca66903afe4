use assert_approx_eq::assert_approx_eq;
use chrono::NaiveDate;
use fournil_forecast::weather::{current_class, WeatherClass, WeatherFeed};
use rstest::rstest;

#[rstest]
#[case(0, WeatherClass::Sunny, 1.2)]
#[case(2, WeatherClass::Cloudy, 1.0)]
#[case(46, WeatherClass::Fog, 0.9)]
#[case(60, WeatherClass::Rain, 0.7)]
#[case(81, WeatherClass::Showers, 0.7)]
#[case(75, WeatherClass::Snow, 0.6)]
#[case(96, WeatherClass::Storm, 0.5)]
#[case(10, WeatherClass::Variable, 1.0)]
#[case(-5, WeatherClass::Variable, 1.0)]
fn classify_code_bands(#[case] code: i64, #[case] expected: WeatherClass, #[case] factor: f64) {
    let class = WeatherClass::from_code(code);
    assert_eq!(class, expected);
    assert_approx_eq!(class.factor(), factor);
}

#[test]
fn classification_is_total_with_bounded_factor() {
    for code in -100i64..=200 {
        let class = WeatherClass::from_code(code);
        let factor = class.factor();
        assert!(factor > 0.0 && factor <= 1.5, "code {code} gave factor {factor}");
        assert!(class.score() <= 2);
    }
}

#[test]
fn band_edges() {
    assert_eq!(WeatherClass::from_code(1), WeatherClass::Cloudy);
    assert_eq!(WeatherClass::from_code(3), WeatherClass::Cloudy);
    assert_eq!(WeatherClass::from_code(4), WeatherClass::Variable);
    assert_eq!(WeatherClass::from_code(44), WeatherClass::Variable);
    assert_eq!(WeatherClass::from_code(45), WeatherClass::Fog);
    assert_eq!(WeatherClass::from_code(67), WeatherClass::Rain);
    assert_eq!(WeatherClass::from_code(68), WeatherClass::Variable);
    assert_eq!(WeatherClass::from_code(94), WeatherClass::Variable);
    assert_eq!(WeatherClass::from_code(95), WeatherClass::Storm);
    assert_eq!(WeatherClass::from_code(120), WeatherClass::Storm);
}

#[rstest]
#[case(WeatherClass::Sunny, 2)]
#[case(WeatherClass::Cloudy, 1)]
#[case(WeatherClass::Fog, 1)]
#[case(WeatherClass::Variable, 1)]
#[case(WeatherClass::Unavailable, 1)]
#[case(WeatherClass::Rain, 0)]
#[case(WeatherClass::Showers, 0)]
#[case(WeatherClass::Snow, 0)]
#[case(WeatherClass::Storm, 0)]
fn three_level_scores(#[case] class: WeatherClass, #[case] score: u8) {
    assert_eq!(class.score(), score);
}

#[test]
fn labels_round_trip_through_the_shared_vocabulary() {
    let classes = [
        WeatherClass::Sunny,
        WeatherClass::Cloudy,
        WeatherClass::Fog,
        WeatherClass::Rain,
        WeatherClass::Showers,
        WeatherClass::Snow,
        WeatherClass::Storm,
        WeatherClass::Variable,
        WeatherClass::Unavailable,
    ];
    for class in classes {
        assert_eq!(WeatherClass::from_label(class.label()), class);
    }
    // Anything stale or unknown degrades to the average bucket.
    assert_eq!(WeatherClass::from_label("Hurricane"), WeatherClass::Variable);
    assert_eq!(WeatherClass::from_label("Hurricane").score(), 1);
}

struct DeadFeed;

impl WeatherFeed for DeadFeed {
    fn current_code(&self) -> Option<i64> {
        None
    }

    fn weekly_codes(&self) -> Vec<(NaiveDate, i64)> {
        Vec::new()
    }
}

#[test]
fn unavailable_feed_degrades_to_neutral() {
    let class = current_class(&DeadFeed);
    assert_eq!(class, WeatherClass::Unavailable);
    assert_approx_eq!(class.factor(), 1.0);
    assert_eq!(class.score(), 1);
}
