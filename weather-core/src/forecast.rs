//! Reduction of the 3-hourly forecast series into per-day summaries.

use chrono::{Local, TimeZone};

use crate::model::{DaySummary, ForecastSample};

/// Number of day summaries rendered.
pub const MAX_DAYS: usize = 3;

/// Groups samples by weekday in the viewer's local time zone.
pub fn group_by_day(samples: &[ForecastSample]) -> Vec<DaySummary> {
    group_by_day_in(samples, &Local)
}

/// Groups samples by the weekday name of `observed_at` in `tz`.
///
/// Partitions keep the order in which their weekday is first seen. Each
/// partition's condition is taken from its first sample and its temperature
/// is the plain mean. Only the first [`MAX_DAYS`] partitions are returned, so
/// a series starting late in the day yields a short first day.
pub fn group_by_day_in<Tz: TimeZone>(samples: &[ForecastSample], tz: &Tz) -> Vec<DaySummary>
where
    Tz::Offset: std::fmt::Display,
{
    let mut days: Vec<(String, Vec<&ForecastSample>)> = Vec::new();

    for sample in samples {
        let label = sample.observed_at.with_timezone(tz).format("%A").to_string();

        match days.iter_mut().find(|(day, _)| *day == label) {
            Some((_, bucket)) => bucket.push(sample),
            None => days.push((label, vec![sample])),
        }
    }

    days.into_iter()
        .take(MAX_DAYS)
        .map(|(day_label, bucket)| {
            let total: f64 = bucket.iter().map(|s| s.temperature).sum();
            DaySummary {
                day_label,
                average_temperature: total / bucket.len() as f64,
                representative_condition: bucket[0].condition.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Condition;
    use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};

    fn condition(main: &str) -> Condition {
        Condition {
            main: main.to_string(),
            description: main.to_lowercase(),
            icon_id: "01d".to_string(),
        }
    }

    fn sample(at: DateTime<Utc>, temperature: f64, main: &str) -> ForecastSample {
        ForecastSample {
            observed_at: at,
            temperature,
            feels_like: temperature,
            humidity: 50,
            pressure_hpa: 1013,
            wind_speed: 3.0,
            wind_direction_deg: 90.0,
            condition: condition(main),
        }
    }

    /// Monday 2024-01-15 00:00 UTC.
    fn monday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
    }

    fn three_hourly(start: DateTime<Utc>, count: usize) -> Vec<ForecastSample> {
        (0..count)
            .map(|i| sample(start + Duration::hours(3 * i as i64), i as f64, "Clear"))
            .collect()
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(group_by_day_in(&[], &Utc).is_empty());
    }

    #[test]
    fn single_sample_is_its_own_average() {
        let days = group_by_day_in(&[sample(monday(), 7.25, "Rain")], &Utc);

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].day_label, "Monday");
        assert_eq!(days[0].average_temperature, 7.25);
        assert_eq!(days[0].representative_condition.main, "Rain");
    }

    #[test]
    fn single_day_average_is_arithmetic_mean() {
        let temps = [1.5, 2.25, -3.0, 10.0, 4.125];
        let samples: Vec<_> = temps
            .iter()
            .enumerate()
            .map(|(i, t)| sample(monday() + Duration::hours(3 * i as i64), *t, "Clouds"))
            .collect();

        let days = group_by_day_in(&samples, &Utc);
        let expected = temps.iter().sum::<f64>() / temps.len() as f64;

        assert_eq!(days.len(), 1);
        assert!((days[0].average_temperature - expected).abs() < 1e-6);
    }

    #[test]
    fn never_more_than_three_days() {
        // Five days of 3-hourly samples, as the provider returns.
        let days = group_by_day_in(&three_hourly(monday(), 40), &Utc);

        assert_eq!(days.len(), MAX_DAYS);
        let labels: Vec<_> = days.iter().map(|d| d.day_label.as_str()).collect();
        assert_eq!(labels, ["Monday", "Tuesday", "Wednesday"]);
    }

    #[test]
    fn condition_comes_from_first_sample_of_day() {
        let samples = vec![
            sample(monday() + Duration::hours(3), 5.0, "Rain"),
            sample(monday() + Duration::hours(6), 6.0, "Clear"),
            sample(monday() + Duration::hours(9), 7.0, "Clear"),
        ];

        let days = group_by_day_in(&samples, &Utc);
        assert_eq!(days[0].representative_condition.main, "Rain");
    }

    #[test]
    fn late_start_produces_short_first_day() {
        let start = monday() + Duration::hours(21);
        let days = group_by_day_in(&three_hourly(start, 10), &Utc);

        assert_eq!(days[0].day_label, "Monday");
        assert_eq!(days[0].average_temperature, 0.0);
        assert_eq!(days[1].day_label, "Tuesday");
        assert_eq!(days[2].day_label, "Wednesday");
    }

    #[test]
    fn weekday_follows_viewer_time_zone() {
        // 23:00 UTC Monday is already Tuesday in UTC+2.
        let at = monday() + Duration::hours(23);
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();

        let days = group_by_day_in(&[sample(at, 1.0, "Clear")], &tz);
        assert_eq!(days[0].day_label, "Tuesday");
    }

    #[test]
    fn discovery_order_is_kept_for_unsorted_input() {
        let samples = vec![
            sample(monday() + Duration::days(1), 2.0, "Snow"),
            sample(monday(), 1.0, "Clear"),
            sample(monday() + Duration::days(1) + Duration::hours(3), 4.0, "Clear"),
        ];

        let days = group_by_day_in(&samples, &Utc);

        assert_eq!(days[0].day_label, "Tuesday");
        assert_eq!(days[0].average_temperature, 3.0);
        assert_eq!(days[0].representative_condition.main, "Snow");
        assert_eq!(days[1].day_label, "Monday");
    }
}
