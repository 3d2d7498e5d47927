use serde::Serialize;
use time::OffsetDateTime;

use crate::utils::serialize_timestamp;

/// Number of measurement words carried by one sensor frame
pub const FIELD_COUNT: usize = 12;

/// One validated measurement decoded from a sensor frame
///
/// Field order matches the order of the words on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub pm10_standard: u16,
    pub pm25_standard: u16,
    pub pm100_standard: u16,
    pub pm10_env: u16,
    pub pm25_env: u16,
    pub pm100_env: u16,
    pub particles_3um: u16,
    pub particles_5um: u16,
    pub particles_10um: u16,
    pub particles_25um: u16,
    pub particles_50um: u16,
    pub particles_100um: u16,
}

impl Reading {
    pub fn from_words(words: [u16; FIELD_COUNT]) -> Self {
        let [
            pm10_standard,
            pm25_standard,
            pm100_standard,
            pm10_env,
            pm25_env,
            pm100_env,
            particles_3um,
            particles_5um,
            particles_10um,
            particles_25um,
            particles_50um,
            particles_100um,
        ] = words;

        Reading {
            pm10_standard,
            pm25_standard,
            pm100_standard,
            pm10_env,
            pm25_env,
            pm100_env,
            particles_3um,
            particles_5um,
            particles_10um,
            particles_25um,
            particles_50um,
            particles_100um,
        }
    }

    pub fn words(&self) -> [u16; FIELD_COUNT] {
        [
            self.pm10_standard,
            self.pm25_standard,
            self.pm100_standard,
            self.pm10_env,
            self.pm25_env,
            self.pm100_env,
            self.particles_3um,
            self.particles_5um,
            self.particles_10um,
            self.particles_25um,
            self.particles_50um,
            self.particles_100um,
        ]
    }
}

/// Rounded averages over the last completed window
///
/// The default value is the sentinel served before any window has completed:
/// all fields zero and no refresh time. Serialized keys are the display labels
/// served to HTTP clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    #[serde(rename = "PM1.0 (standard)")]
    pub pm10_standard: u16,
    #[serde(rename = "PM2.5 (standard)")]
    pub pm25_standard: u16,
    #[serde(rename = "PM10 (standard)")]
    pub pm100_standard: u16,
    #[serde(rename = "PM1.0 (environmental)")]
    pub pm10_env: u16,
    #[serde(rename = "PM2.5 (environmental)")]
    pub pm25_env: u16,
    #[serde(rename = "PM10 (environmental)")]
    pub pm100_env: u16,
    #[serde(rename = "0.3μm particles")]
    pub particles_3um: u16,
    #[serde(rename = "0.5μm particles")]
    pub particles_5um: u16,
    #[serde(rename = "1.0μm particles")]
    pub particles_10um: u16,
    #[serde(rename = "2.5μm particles")]
    pub particles_25um: u16,
    #[serde(rename = "5.0μm particles")]
    pub particles_50um: u16,
    #[serde(rename = "10μm particles")]
    pub particles_100um: u16,
    #[serde(skip)]
    pub samples: usize,
    #[serde(rename = "last_updated", serialize_with = "serialize_timestamp")]
    pub updated_at: Option<OffsetDateTime>,
}

impl Summary {
    pub fn from_averages(
        averages: [u16; FIELD_COUNT],
        samples: usize,
        updated_at: OffsetDateTime,
    ) -> Self {
        let reading = Reading::from_words(averages);

        Summary {
            pm10_standard: reading.pm10_standard,
            pm25_standard: reading.pm25_standard,
            pm100_standard: reading.pm100_standard,
            pm10_env: reading.pm10_env,
            pm25_env: reading.pm25_env,
            pm100_env: reading.pm100_env,
            particles_3um: reading.particles_3um,
            particles_5um: reading.particles_5um,
            particles_10um: reading.particles_10um,
            particles_25um: reading.particles_25um,
            particles_50um: reading.particles_50um,
            particles_100um: reading.particles_100um,
            samples,
            updated_at: Some(updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn words_keep_canonical_order() {
        let words = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
        let reading = Reading::from_words(words);

        assert_eq!(reading.pm10_standard, 1);
        assert_eq!(reading.pm25_env, 5);
        assert_eq!(reading.particles_100um, 12);
        assert_eq!(reading.words(), words);
    }

    #[test]
    fn summary_keys_are_display_labels() {
        let summary = Summary::from_averages(
            [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12],
            9,
            datetime!(1970-01-01 00:00 UTC),
        );
        let json = serde_json::to_value(summary).unwrap();
        let labels = [
            "PM1.0 (standard)",
            "PM2.5 (standard)",
            "PM10 (standard)",
            "PM1.0 (environmental)",
            "PM2.5 (environmental)",
            "PM10 (environmental)",
            "0.3μm particles",
            "0.5μm particles",
            "1.0μm particles",
            "2.5μm particles",
            "5.0μm particles",
            "10μm particles",
        ];

        for (expected, label) in (1..=12).zip(labels) {
            assert_eq!(json[label], expected, "{}", label);
        }
        assert_eq!(json["last_updated"], "1970-01-01 00:00");
    }

    #[test]
    fn sentinel_serializes_with_null_timestamp() {
        let json = serde_json::to_value(Summary::default()).unwrap();

        assert_eq!(json["PM2.5 (standard)"], 0);
        assert!(json["last_updated"].is_null());
        assert!(json.get("samples").is_none());
        assert_eq!(json.as_object().unwrap().len(), FIELD_COUNT + 1);
    }

    #[test]
    fn summary_serializes_as_flat_mapping() {
        let summary = Summary::from_averages(
            [5, 42, 7, 5, 40, 7, 900, 300, 60, 4, 1, 0],
            9,
            datetime!(2024-03-05 14:07:59 +02:00),
        );
        let json = serde_json::to_value(summary).unwrap();

        assert_eq!(json["PM2.5 (standard)"], 42);
        assert_eq!(json["PM2.5 (environmental)"], 40);
        assert_eq!(json["0.3μm particles"], 900);
        assert_eq!(json["10μm particles"], 0);
        assert_eq!(json["last_updated"], "2024-03-05 14:07");
        assert!(json.get("pm25_standard").is_none());
    }
}
