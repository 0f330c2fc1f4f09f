//! Hourly hydrogen demand profiles.
use crate::units::MassPerHour;
use anyhow::{Result, ensure};
use serde::Deserialize;
use std::ops::Range;

/// Deserialise an optional `[start, end]` pair of hours into a half-open range
pub fn deserialise_hour_window<'de, D>(deserialiser: D) -> Result<Option<Range<usize>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let window: Option<[usize; 2]> = Deserialize::deserialize(deserialiser)?;
    let Some([start, end]) = window else {
        return Ok(None);
    };

    if start >= end {
        Err(serde::de::Error::custom(format!(
            "Hour window [{start}, {end}] must have start < end"
        )))?;
    }

    Ok(Some(start..end))
}

/// The shape of the hourly hydrogen demand.
///
/// Demand runs at a constant `rate` from `start_hour` until the end of the horizon, except during
/// an optional `pause` (e.g. a summer shutdown of the consumer) when it drops to zero.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DemandProfile {
    /// Demand while the consumer is running
    pub rate: MassPerHour,
    /// First hour with demand
    #[serde(default)]
    pub start_hour: usize,
    /// Half-open window of hours with no demand
    #[serde(default, deserialize_with = "deserialise_hour_window")]
    pub pause: Option<Range<usize>>,
}

impl DemandProfile {
    /// A profile with the same demand in every hour
    pub fn constant(rate: MassPerHour) -> Self {
        Self {
            rate,
            start_hour: 0,
            pause: None,
        }
    }

    /// Check the profile fits within a horizon of the given length
    pub fn validate(&self, horizon_hours: usize) -> Result<()> {
        ensure!(
            self.rate.is_finite() && self.rate >= MassPerHour(0.0),
            "Demand rate must be a finite, non-negative number"
        );
        ensure!(
            self.start_hour < horizon_hours,
            "Demand start hour {} is outside the horizon of {horizon_hours} hours",
            self.start_hour
        );
        if let Some(pause) = &self.pause {
            ensure!(
                pause.end <= horizon_hours,
                "Demand pause {pause:?} extends beyond the horizon of {horizon_hours} hours"
            );
        }

        Ok(())
    }

    /// Hourly demand in kg for a horizon of the given length
    pub fn hourly(&self, horizon_hours: usize) -> Vec<f64> {
        (0..horizon_hours)
            .map(|hour| {
                let paused = self.pause.as_ref().is_some_and(|p| p.contains(&hour));
                if hour < self.start_hour || paused {
                    0.0
                } else {
                    self.rate.value()
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_hourly_constant() {
        let profile = DemandProfile::constant(MassPerHour(2000.0));
        assert_eq!(profile.hourly(3), [2000.0, 2000.0, 2000.0]);
    }

    #[test]
    fn test_hourly_with_start_and_pause() {
        let profile = DemandProfile {
            rate: MassPerHour(100.0),
            start_hour: 1,
            pause: Some(5..7),
        };
        assert_eq!(
            profile.hourly(10),
            [0.0, 100.0, 100.0, 100.0, 100.0, 0.0, 0.0, 100.0, 100.0, 100.0]
        );
    }

    #[rstest]
    #[case(MassPerHour(100.0), 0, None, true)]
    #[case(MassPerHour(-1.0), 0, None, false)]
    #[case(MassPerHour(f64::NAN), 0, None, false)]
    #[case(MassPerHour(100.0), 10, None, false)]
    #[case(MassPerHour(100.0), 0, Some(5..10), true)]
    #[case(MassPerHour(100.0), 0, Some(5..11), false)]
    fn test_validate(
        #[case] rate: MassPerHour,
        #[case] start_hour: usize,
        #[case] pause: Option<Range<usize>>,
        #[case] valid: bool,
    ) {
        let profile = DemandProfile {
            rate,
            start_hour,
            pause,
        };
        assert_eq!(profile.validate(10).is_ok(), valid);
    }

    #[test]
    fn test_deserialise() {
        let profile: DemandProfile =
            toml::from_str("rate = 2000.0\nstart_hour = 168\npause = [5065, 5809]").unwrap();
        assert_eq!(
            profile,
            DemandProfile {
                rate: MassPerHour(2000.0),
                start_hour: 168,
                pause: Some(5065..5809),
            }
        );

        assert!(toml::from_str::<DemandProfile>("rate = 1.0\npause = [10, 10]").is_err());
    }
}
