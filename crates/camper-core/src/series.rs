// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of CamperDash.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Series classification and resampling for history charts.

use std::collections::BTreeMap;

use camper_types::StateSample;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

/// Default resampling bucket
pub const DEFAULT_BUCKET_HOURS: i64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericPoint {
    pub at: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoricalPoint {
    pub at: DateTime<Utc>,
    pub value: String,
}

/// A history series after classification, ordered by time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Series {
    Numeric(Vec<NumericPoint>),
    Categorical(Vec<CategoricalPoint>),
}

/// Aggregate of one non-empty resampling bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub start: DateTime<Utc>,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    pub count: usize,
}

/// Occurrences of one categorical value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerTrack {
    pub value: String,
    pub times: Vec<DateTime<Utc>>,
}

/// What a history chart should draw
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub enum ChartPlan {
    #[default]
    Empty,
    Bands(Vec<Band>),
    Markers(Vec<MarkerTrack>),
}

impl ChartPlan {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Bands(bands) => bands.is_empty(),
            Self::Markers(tracks) => tracks.is_empty(),
        }
    }
}

/// Numeric iff every sample coerces to a finite number
pub fn classify(samples: &[StateSample]) -> Series {
    let mut sorted: Vec<&StateSample> = samples.iter().collect();
    sorted.sort_by_key(|s| s.created);

    let numeric: Option<Vec<NumericPoint>> = sorted
        .iter()
        .map(|s| {
            s.state.as_number().map(|value| NumericPoint {
                at: s.created,
                value,
            })
        })
        .collect();

    match numeric {
        Some(points) => Series::Numeric(points),
        None => Series::Categorical(
            sorted
                .into_iter()
                .map(|s| CategoricalPoint {
                    at: s.created,
                    value: s.state.as_str().to_owned(),
                })
                .collect(),
        ),
    }
}

struct Accumulator {
    min: f64,
    max: f64,
    sum: f64,
    count: usize,
}

/// Group points into epoch-aligned buckets of length `bucket`.
///
/// Produces one [`Band`] per non-empty bucket, ascending by start.
pub fn resample(points: &[NumericPoint], bucket: TimeDelta) -> Vec<Band> {
    let width = bucket.num_seconds().max(1);
    let mut buckets: BTreeMap<i64, Accumulator> = BTreeMap::new();

    for point in points {
        let start = point.at.timestamp().div_euclid(width) * width;
        buckets
            .entry(start)
            .and_modify(|acc| {
                acc.min = acc.min.min(point.value);
                acc.max = acc.max.max(point.value);
                acc.sum += point.value;
                acc.count += 1;
            })
            .or_insert(Accumulator {
                min: point.value,
                max: point.value,
                sum: point.value,
                count: 1,
            });
    }

    buckets
        .into_iter()
        .filter_map(|(start, acc)| {
            #[expect(clippy::cast_precision_loss, reason = "bucket counts are small")]
            let mean = acc.sum / acc.count as f64;
            Some(Band {
                start: DateTime::from_timestamp(start, 0)?,
                min: acc.min,
                mean,
                max: acc.max,
                count: acc.count,
            })
        })
        .collect()
}

/// One track per distinct value, in order of first appearance
pub fn categorical_markers(points: &[CategoricalPoint]) -> Vec<MarkerTrack> {
    let mut tracks: Vec<MarkerTrack> = Vec::new();
    for point in points {
        match tracks.iter_mut().find(|t| t.value == point.value) {
            Some(track) => track.times.push(point.at),
            None => tracks.push(MarkerTrack {
                value: point.value.clone(),
                times: vec![point.at],
            }),
        }
    }
    tracks
}

pub fn plan_chart(samples: &[StateSample], bucket: TimeDelta) -> ChartPlan {
    if samples.is_empty() {
        return ChartPlan::Empty;
    }

    match classify(samples) {
        Series::Numeric(points) => ChartPlan::Bands(resample(&points, bucket)),
        Series::Categorical(points) => ChartPlan::Markers(categorical_markers(&points)),
    }
}
