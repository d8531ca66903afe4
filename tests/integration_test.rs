use chrono::{NaiveDate, NaiveDateTime};
use fournil_forecast::data::{BagFormat, Ledger, LogEntry};
use fournil_forecast::engine::{ForecastEngine, ForecastMode};
use fournil_forecast::events::EventCalendar;
use fournil_forecast::store::{ModelState, ModelStore};
use fournil_forecast::training::{TrainOutcome, Trainer};
use fournil_forecast::weather::WeatherClass;

fn at(y: i32, m: u32, d: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// Full pipeline: log sales, retrain, then forecast the next trading day
/// intraday and a week ahead.
#[test]
fn ledger_to_forecast_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Ledger::open(dir.path().join("ledger.csv")).unwrap();
    let store = ModelStore::new(dir.path().join("model.json"));
    let events = EventCalendar::default();

    // Three complete trading days of history, one incomplete day that must
    // not influence the model. No 2kg bag ever sells.
    for (y, m, d) in [(2025, 7, 8), (2025, 7, 9), (2025, 7, 12)] {
        for i in 0..8u32 {
            ledger
                .append(&LogEntry::sale(
                    at(y, m, d, 10 + i % 7, (i * 11) % 60),
                    BagFormat::Small,
                    WeatherClass::Sunny,
                ))
                .unwrap();
        }
        for i in 0..4u32 {
            ledger
                .append(&LogEntry::sale(
                    at(y, m, d, 11 + i % 5, (i * 13) % 60),
                    BagFormat::Medium,
                    WeatherClass::Sunny,
                ))
                .unwrap();
        }
    }
    for i in 0..3u32 {
        ledger
            .append(&LogEntry::sale(
                at(2025, 7, 10, 11 + i, 0),
                BagFormat::Small,
                WeatherClass::Rain,
            ))
            .unwrap();
    }

    let outcome = Trainer::new().retrain(&ledger, &store).unwrap();
    let model = match outcome {
        TrainOutcome::Trained(model) => model,
        other => panic!("expected a trained model, got {other:?}"),
    };
    assert!(model.regressor(BagFormat::Small).is_some());
    assert!(model.regressor(BagFormat::Medium).is_some());
    assert!(model.regressor(BagFormat::Large).is_none());
    assert!(matches!(store.load(), ModelState::Loaded(_)));

    // Pre-open forecast for the following Tuesday rides the learned curve.
    let engine = ForecastEngine::new(&ledger, &store, &events);
    let forecast = engine
        .intraday(at(2025, 7, 15, 9, 0), WeatherClass::Sunny)
        .unwrap();

    assert_eq!(
        forecast.mode,
        ForecastMode::Model { trend_ratio: 1.0 }
    );
    assert_eq!(forecast.hours_remaining, 7.0);
    assert!(forecast.predictions[&BagFormat::Small] > 0);
    assert_eq!(forecast.predictions[&BagFormat::Large], 0);

    // Week-ahead outlook covers the horizon with per-format totals.
    let today = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
    let codes: Vec<(NaiveDate, i64)> = (0..8)
        .map(|i| (today + chrono::Duration::days(i), 1))
        .collect();
    let outlooks = engine.week_ahead(today, &codes);

    assert_eq!(outlooks.len(), 7);
    for outlook in &outlooks {
        let totals = outlook.totals.as_ref().unwrap();
        assert_eq!(totals[&BagFormat::Large], 0);
        if outlook.closed {
            assert_eq!(totals[&BagFormat::Small], 0);
        }
    }

    // Undoing the last log row keeps the rest of the ledger intact.
    let before = ledger.sale_records().unwrap().len();
    let removed = ledger.undo_last().unwrap().unwrap();
    assert_eq!(removed.detail, "250g");
    assert_eq!(ledger.sale_records().unwrap().len(), before - 1);
}
