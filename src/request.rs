//! The stdin/stdout request cycle.
//!
//! One JSON request is read from stdin, predictions are made for each
//! horizon present, and the response is printed as a human-readable summary
//! followed by pretty JSON. The response always carries all three horizon
//! keys; unpopulated ones serialize as `{}` / `[]`.

use chrono::Datelike;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::data::WeatherReading;
use crate::ml::TrainedModel;
use crate::traits::Clock;

/// A prediction request: any subset of the three horizons.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PredictionRequest {
    pub current: Option<WeatherReading>,
    pub tomorrow: Option<WeatherReading>,
    #[serde(default)]
    pub weekly: Vec<WeatherReading>,
}

/// One horizon's answer. `r2_score` is the single training-time holdout R²,
/// repeated verbatim for every horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonPrediction {
    pub price: f64,
    pub r2_score: f64,
}

/// The full response. Mirrors the request's horizons; absent ones stay
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(
        serialize_with = "serialize_horizon",
        deserialize_with = "deserialize_horizon",
        default
    )]
    pub current: Option<HorizonPrediction>,
    #[serde(
        serialize_with = "serialize_horizon",
        deserialize_with = "deserialize_horizon",
        default
    )]
    pub tomorrow: Option<HorizonPrediction>,
    #[serde(default)]
    pub weekly: Vec<HorizonPrediction>,
}

/// Errors raised while handling a request.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid request: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Parse a raw JSON request and answer it.
pub fn handle_request(
    input: &str,
    model: &TrainedModel,
    clock: &dyn Clock,
) -> Result<PredictionResponse, RequestError> {
    let request: PredictionRequest = serde_json::from_str(input)?;
    Ok(respond(&request, model, clock))
}

/// Predict every horizon present in the request, preserving weekly input
/// order. Month and day default to the current calendar date.
pub fn respond(
    request: &PredictionRequest,
    model: &TrainedModel,
    clock: &dyn Clock,
) -> PredictionResponse {
    let today = clock.now_local().date_naive();
    let month = today.month();
    let day = today.day();

    let predict = |weather: &WeatherReading| HorizonPrediction {
        price: round_to(model.predict_price(weather, month, day), 2),
        r2_score: round_to(model.r2, 4),
    };

    PredictionResponse {
        current: request.current.as_ref().map(&predict),
        tomorrow: request.tomorrow.as_ref().map(&predict),
        weekly: request.weekly.iter().map(&predict).collect(),
    }
}

/// Human-readable summary of the populated horizons, printed before the
/// JSON body.
pub fn render_summary(response: &PredictionResponse) -> String {
    let mut out = String::from("=== Market price forecast ===\n");

    if let Some(h) = &response.current {
        out.push_str(&format!(
            "\nCurrent price: {:.2} (confidence {:.2}%)\n",
            h.price,
            h.r2_score * 100.0
        ));
    }
    if let Some(h) = &response.tomorrow {
        out.push_str(&format!(
            "\nTomorrow's price: {:.2} (confidence {:.2}%)\n",
            h.price,
            h.r2_score * 100.0
        ));
    }
    if !response.weekly.is_empty() {
        out.push_str("\nWeekly forecast:\n");
        for (i, h) in response.weekly.iter().enumerate() {
            out.push_str(&format!(
                "  day {}: {:.2} (confidence {:.2}%)\n",
                i + 1,
                h.price,
                h.r2_score * 100.0
            ));
        }
    }

    out
}

/// Round to `decimals` decimal places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

fn serialize_horizon<S>(value: &Option<HorizonPrediction>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(horizon) => horizon.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

fn deserialize_horizon<'de, D>(deserializer: D) -> Result<Option<HorizonPrediction>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Partial {
        price: Option<f64>,
        r2_score: Option<f64>,
    }

    let partial = Partial::deserialize(deserializer)?;
    Ok(match (partial.price, partial.r2_score) {
        (Some(price), Some(r2_score)) => Some(HorizonPrediction { price, r2_score }),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Observation;
    use crate::ml::{train, ForestParams, TrainingParams};
    use crate::traits::MockClock;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn reading(avg: f64) -> WeatherReading {
        WeatherReading {
            avg_temp: avg,
            max_temp: avg + 5.0,
            min_temp: avg - 5.0,
            rainfall: 0.5,
        }
    }

    fn test_model() -> TrainedModel {
        let start = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
        let observations: Vec<Observation> = (0..120)
            .map(|i| {
                let avg = 10.0 + 12.0 * ((i as f64) * 0.06).sin();
                Observation {
                    date: start + chrono::Duration::days(i as i64),
                    weather: reading(avg),
                    price: 500.0 + 40.0 * avg,
                }
            })
            .collect();

        let params = TrainingParams {
            forest: ForestParams {
                n_trees: 15,
                max_depth: 10,
                ..Default::default()
            },
            train_ratio: 0.8,
        };
        train(&observations, &params).unwrap()
    }

    fn test_clock() -> MockClock {
        MockClock::new(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_parse_request_wire_names() {
        let json = r#"{
            "current": {"avg temp": 20, "max temp": 25, "min temp": 15, "rainFall": 0},
            "weekly": [{"avg temp": 18, "max temp": 22, "min temp": 12, "rainFall": 1.5}]
        }"#;

        let request: PredictionRequest = serde_json::from_str(json).unwrap();

        assert!(request.current.is_some());
        assert!(request.tomorrow.is_none());
        assert_eq!(request.weekly.len(), 1);
        assert_eq!(request.current.unwrap().avg_temp, 20.0);
    }

    #[test]
    fn test_empty_request_parses_to_default() {
        let request: PredictionRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, PredictionRequest::default());
    }

    #[test]
    fn test_malformed_request_is_an_error() {
        let model = test_model();
        let clock = test_clock();

        let result = handle_request("not json at all", &model, &clock);

        assert!(matches!(result, Err(RequestError::InvalidJson(_))));
    }

    #[test]
    fn test_respond_populates_only_present_horizons() {
        let model = test_model();
        let clock = test_clock();
        let request = PredictionRequest {
            current: Some(reading(20.0)),
            ..Default::default()
        };

        let response = respond(&request, &model, &clock);

        assert!(response.current.is_some());
        assert!(response.tomorrow.is_none());
        assert!(response.weekly.is_empty());

        let horizon = response.current.unwrap();
        assert!(horizon.price >= 0.0);
        assert!(horizon.r2_score <= 1.0);
    }

    #[test]
    fn test_weekly_preserves_input_order() {
        let model = test_model();
        let clock = test_clock();
        let temps = [5.0, 25.0, 15.0];
        let request = PredictionRequest {
            weekly: temps.iter().map(|&t| reading(t)).collect(),
            ..Default::default()
        };

        let response = respond(&request, &model, &clock);

        let today = clock.now_local().date_naive();
        let expected: Vec<f64> = temps
            .iter()
            .map(|&t| round_to(model.predict_price(&reading(t), today.month(), today.day()), 2))
            .collect();
        let got: Vec<f64> = response.weekly.iter().map(|h| h.price).collect();

        assert_eq!(got, expected);
    }

    #[test]
    fn test_r2_is_repeated_verbatim_across_horizons() {
        let model = test_model();
        let clock = test_clock();
        let request = PredictionRequest {
            current: Some(reading(10.0)),
            tomorrow: Some(reading(30.0)),
            weekly: vec![reading(20.0)],
        };

        let response = respond(&request, &model, &clock);

        let expected = round_to(model.r2, 4);
        assert_eq!(response.current.unwrap().r2_score, expected);
        assert_eq!(response.tomorrow.unwrap().r2_score, expected);
        assert_eq!(response.weekly[0].r2_score, expected);
    }

    #[test]
    fn test_empty_response_serialization_shape() {
        let response = PredictionResponse::default();
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(
            value,
            serde_json::json!({"current": {}, "tomorrow": {}, "weekly": []})
        );
    }

    #[test]
    fn test_response_round_trip() {
        let response = PredictionResponse {
            current: Some(HorizonPrediction {
                price: 1234.56,
                r2_score: 0.8765,
            }),
            tomorrow: None,
            weekly: vec![HorizonPrediction {
                price: 99.99,
                r2_score: 0.8765,
            }],
        };

        let json = serde_json::to_string_pretty(&response).unwrap();
        let parsed: PredictionResponse = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, response);
    }

    #[test]
    fn test_summary_covers_populated_horizons_only() {
        let response = PredictionResponse {
            current: Some(HorizonPrediction {
                price: 1500.0,
                r2_score: 0.9,
            }),
            tomorrow: None,
            weekly: vec![
                HorizonPrediction {
                    price: 1480.0,
                    r2_score: 0.9,
                },
                HorizonPrediction {
                    price: 1520.0,
                    r2_score: 0.9,
                },
            ],
        };

        let summary = render_summary(&response);

        assert!(summary.contains("Current price: 1500.00"));
        assert!(!summary.contains("Tomorrow"));
        assert!(summary.contains("day 1: 1480.00"));
        assert!(summary.contains("day 2: 1520.00"));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1234.5678, 2), 1234.57);
        assert_eq!(round_to(0.87654, 4), 0.8765);
        assert_eq!(round_to(-0.004, 2), -0.0);
    }
}
