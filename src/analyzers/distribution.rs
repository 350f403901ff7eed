use serde::Serialize;

use crate::models::{AirQualityRecord, Pollutant};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationHistogram {
    pub station: String,
    pub observations: usize,
    pub densities: Vec<f64>,
}

/// Probability-density histogram of one pollutant, per station, over shared
/// equal-width bins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionHistogram {
    pub pollutant: Pollutant,
    pub bin_edges: Vec<f64>,
    pub stations: Vec<StationHistogram>,
}

impl DistributionHistogram {
    pub fn bin_count(&self) -> usize {
        self.bin_edges.len().saturating_sub(1)
    }

    pub fn station(&self, name: &str) -> Option<&StationHistogram> {
        self.stations.iter().find(|s| s.station == name)
    }
}

/// Bin every station's readings of `pollutant` into `bins` equal-width bins
/// spanning the global min..max. Densities are normalised so each station's
/// histogram integrates to one. A zero bin count is treated as one.
pub fn density_histogram(
    records: &[AirQualityRecord],
    pollutant: Pollutant,
    bins: usize,
) -> DistributionHistogram {
    let bins = bins.max(1);

    let (min, max) = records
        .iter()
        .filter_map(|r| r.reading(pollutant))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if !min.is_finite() {
        return DistributionHistogram {
            pollutant,
            bin_edges: Vec::new(),
            stations: Vec::new(),
        };
    }

    // A single distinct value gets one unit-wide bin.
    let (bins, width) = if max > min {
        (bins, (max - min) / bins as f64)
    } else {
        (1, 1.0)
    };
    let bin_edges: Vec<f64> = (0..=bins).map(|i| min + width * i as f64).collect();

    let mut stations: Vec<(String, Vec<usize>, usize)> = Vec::new();
    for record in records {
        let Some(value) = record.reading(pollutant) else {
            continue;
        };
        let slot = match stations.iter().position(|(s, _, _)| *s == record.station) {
            Some(slot) => slot,
            None => {
                stations.push((record.station.clone(), vec![0; bins], 0));
                stations.len() - 1
            }
        };

        let bin = (((value - min) / width) as usize).min(bins - 1);
        stations[slot].1[bin] += 1;
        stations[slot].2 += 1;
    }

    DistributionHistogram {
        pollutant,
        bin_edges,
        stations: stations
            .into_iter()
            .map(|(station, counts, observations)| StationHistogram {
                station,
                observations,
                densities: counts
                    .iter()
                    .map(|c| *c as f64 / (observations as f64 * width))
                    .collect(),
            })
            .collect(),
    }
}
