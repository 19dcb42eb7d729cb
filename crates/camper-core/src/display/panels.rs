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

use camper_types::EntityValue;

use super::{
    DisplayThresholds, Presentation, level_fraction, reading_presentation, reading_text,
    switch_label, switch_presentation, threshold_presentation,
};
use crate::cache::Snapshot;
use crate::entities::{CamperEntity, ClimateEntity, EntitySet, PowerEntity};

/// A colored button-like element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indicator {
    pub label: String,
    pub presentation: Presentation,
}

/// A tank level bar
#[derive(Debug, Clone, PartialEq)]
pub struct Gauge {
    pub label: &'static str,
    /// `None` when there is no reading; never rendered as an empty tank
    pub fraction: Option<f64>,
    pub presentation: Presentation,
}

/// A labelled value field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readout {
    pub label: &'static str,
    pub text: String,
    pub presentation: Presentation,
}

fn switch<K: EntitySet>(key: K, value: &EntityValue) -> Indicator {
    Indicator {
        label: format!("{} [{}]", key.label(), switch_label(value)),
        presentation: switch_presentation(value),
    }
}

fn gauge<K: EntitySet>(key: K, value: &EntityValue) -> Gauge {
    let fraction = level_fraction(value, key.scale());
    Gauge {
        label: key.label(),
        fraction,
        presentation: if fraction.is_some() {
            Presentation::Plain
        } else {
            Presentation::Neutral
        },
    }
}

fn readout<K: EntitySet>(key: K, value: &EntityValue) -> Readout {
    Readout {
        label: key.label(),
        text: reading_text(value, key.scale()),
        presentation: reading_presentation(value),
    }
}

fn voltage<K: EntitySet>(key: K, value: &EntityValue, threshold: f64) -> Readout {
    Readout {
        label: key.label(),
        text: reading_text(value, key.scale()),
        presentation: threshold_presentation(value, key.scale(), threshold),
    }
}

fn mains(value: &EntityValue, threshold: f64) -> Indicator {
    let key = CamperEntity::MainsVoltage;
    let presentation = threshold_presentation(value, key.scale(), threshold);
    let state = match presentation {
        Presentation::Positive => "CONNECTED",
        Presentation::Negative => "NOT CONNECTED",
        Presentation::Neutral | Presentation::Caution | Presentation::Plain => "Unknown",
    };
    Indicator {
        label: format!("{} [{state}]", key.label()),
        presentation,
    }
}

/// Switches, tank levels and battery voltages
#[derive(Debug, Clone, PartialEq)]
pub struct CamperPanel {
    pub household: Indicator,
    pub pump: Indicator,
    pub water: Gauge,
    pub waste: Gauge,
    pub mains: Indicator,
    pub starter_voltage: Readout,
    pub household_voltage: Readout,
}

impl CamperPanel {
    pub fn build(snapshot: &Snapshot<CamperEntity>, thresholds: &DisplayThresholds) -> Self {
        use CamperEntity as E;

        Self {
            household: switch(E::HouseholdState, snapshot.get(E::HouseholdState)),
            pump: switch(E::PumpState, snapshot.get(E::PumpState)),
            water: gauge(E::WaterLevel, snapshot.get(E::WaterLevel)),
            waste: gauge(E::WasteLevel, snapshot.get(E::WasteLevel)),
            mains: mains(snapshot.get(E::MainsVoltage), thresholds.mains_present_volts),
            starter_voltage: voltage(
                E::StarterVoltage,
                snapshot.get(E::StarterVoltage),
                thresholds.battery_ok_volts,
            ),
            household_voltage: voltage(
                E::HouseholdVoltage,
                snapshot.get(E::HouseholdVoltage),
                thresholds.battery_ok_volts,
            ),
        }
    }
}

/// Battery monitor and solar charger readouts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerPanel {
    pub readouts: Vec<Readout>,
}

impl PowerPanel {
    pub fn build(snapshot: &Snapshot<PowerEntity>) -> Self {
        Self {
            readouts: snapshot.iter().map(|(k, v)| readout(k, v)).collect(),
        }
    }
}

/// Inside and outside climate readouts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClimatePanel {
    pub readouts: Vec<Readout>,
}

impl ClimatePanel {
    pub fn build(snapshot: &Snapshot<ClimateEntity>) -> Self {
        Self {
            readouts: snapshot.iter().map(|(k, v)| readout(k, v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::EntityStateCache;
    use crate::messages::MessageLog;
    use crate::testing::{camper_source, reading};
    use camper_types::SensorId;

    async fn camper_snapshot(states: Vec<camper_types::StateReading>) -> Snapshot<CamperEntity> {
        let source = camper_source();
        source.set_states(SensorId(1), states);
        let mut cache = EntityStateCache::<CamperEntity>::new(MessageLog::new());
        cache.refresh(&source).await;
        cache.snapshot()
    }

    #[test]
    fn test_unknown_snapshot_is_neutral_everywhere() {
        let panel = CamperPanel::build(&Snapshot::default(), &DisplayThresholds::default());

        assert_eq!(panel.household.label, "Household [Unknown]");
        assert_eq!(panel.pump.label, "Pump [Unknown]");
        assert_eq!(panel.mains.label, "Mains [Unknown]");
        assert_eq!(panel.water.fraction, None);
        assert_eq!(panel.starter_voltage.text, "");
        for presentation in [
            panel.household.presentation,
            panel.pump.presentation,
            panel.mains.presentation,
            panel.water.presentation,
            panel.waste.presentation,
            panel.starter_voltage.presentation,
            panel.household_voltage.presentation,
        ] {
            assert_eq!(presentation, Presentation::Neutral);
        }
    }

    #[tokio::test]
    async fn test_camper_panel_from_readings() {
        let snapshot = camper_snapshot(vec![
            reading(10, "ON"),
            reading(11, "PENDING"),
            reading(12, "75"),
            reading(13, "0"),
            reading(14, "230000"),
            reading(15, "12500"),
            reading(16, "11000"),
        ])
        .await;
        let panel = CamperPanel::build(&snapshot, &DisplayThresholds::default());

        assert_eq!(panel.household.label, "Household [ON]");
        assert_eq!(panel.household.presentation, Presentation::Positive);
        assert_eq!(panel.pump.presentation, Presentation::Caution);
        assert_eq!(panel.water.fraction, Some(0.75));
        assert_eq!(panel.waste.fraction, Some(0.0));
        assert_eq!(panel.waste.presentation, Presentation::Plain);
        assert_eq!(panel.mains.label, "Mains [CONNECTED]");
        assert_eq!(panel.starter_voltage.text, "12.5");
        assert_eq!(panel.starter_voltage.presentation, Presentation::Positive);
        assert_eq!(panel.household_voltage.presentation, Presentation::Negative);
    }

    #[tokio::test]
    async fn test_mains_disconnected_below_threshold() {
        let snapshot = camper_snapshot(vec![reading(14, "6500")]).await;
        let panel = CamperPanel::build(&snapshot, &DisplayThresholds::default());

        assert_eq!(panel.mains.label, "Mains [NOT CONNECTED]");
        assert_eq!(panel.mains.presentation, Presentation::Negative);
    }

    #[test]
    fn test_power_panel_order_and_neutral() {
        let panel = PowerPanel::build(&Snapshot::default());
        let labels: Vec<_> = panel.readouts.iter().map(|r| r.label).collect();
        assert_eq!(labels.first(), Some(&"SoC [%]"));
        assert_eq!(labels.last(), Some(&"Charge state"));
        assert!(
            panel
                .readouts
                .iter()
                .all(|r| r.presentation == Presentation::Neutral)
        );
    }

    #[test]
    fn test_climate_panel_has_every_reading() {
        let panel = ClimatePanel::build(&Snapshot::default());
        assert_eq!(panel.readouts.len(), ClimateEntity::ALL.len());
    }
}
