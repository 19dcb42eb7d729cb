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

//! Statically-known entity sets, one per dashboard panel.
//!
//! Each set names the `(sensor, entity)` pairs it displays. Ids are bound at
//! runtime by [`Bindings`](crate::Bindings) against the API's sensor list.

use std::fmt;
use std::hash::Hash;

use crate::display::Scale;

/// A closed set of entities refreshed and displayed together
pub trait EntitySet: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Name used in logs and view titles
    const NAME: &'static str;

    /// Every member, in display order
    const ALL: &'static [Self];

    /// Name of the API sensor owning this entity
    fn sensor(self) -> &'static str;

    /// Entity name within the sensor
    fn entity(self) -> &'static str;

    /// Human-readable label
    fn label(self) -> &'static str;

    /// Scaling applied to numeric raw values before display
    fn scale(self) -> Scale {
        Scale::UNIT
    }

    /// Whether the entity accepts `POST /action/{id}`
    fn writable(self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CamperEntity {
    HouseholdState,
    PumpState,
    WaterLevel,
    WasteLevel,
    MainsVoltage,
    StarterVoltage,
    HouseholdVoltage,
}

impl EntitySet for CamperEntity {
    const NAME: &'static str = "camper";

    const ALL: &'static [Self] = &[
        Self::HouseholdState,
        Self::PumpState,
        Self::WaterLevel,
        Self::WasteLevel,
        Self::MainsVoltage,
        Self::StarterVoltage,
        Self::HouseholdVoltage,
    ];

    fn sensor(self) -> &'static str {
        "camper"
    }

    fn entity(self) -> &'static str {
        match self {
            Self::HouseholdState => "household_state",
            Self::PumpState => "pump_state",
            Self::WaterLevel => "water_state",
            Self::WasteLevel => "waste_state",
            Self::MainsVoltage => "mains_voltage",
            Self::StarterVoltage => "starter_voltage",
            Self::HouseholdVoltage => "household_voltage",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::HouseholdState => "Household",
            Self::PumpState => "Pump",
            Self::WaterLevel => "Water",
            Self::WasteLevel => "Waste",
            Self::MainsVoltage => "Mains",
            Self::StarterVoltage => "Starter [V]",
            Self::HouseholdVoltage => "Household [V]",
        }
    }

    fn scale(self) -> Scale {
        match self {
            Self::MainsVoltage | Self::StarterVoltage | Self::HouseholdVoltage => Scale::MILLI,
            Self::WaterLevel | Self::WasteLevel => Scale::PERCENT,
            Self::HouseholdState | Self::PumpState => Scale::UNIT,
        }
    }

    fn writable(self) -> bool {
        matches!(self, Self::HouseholdState | Self::PumpState)
    }
}

/// Battery monitor and solar charge controller readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PowerEntity {
    StateOfCharge,
    RemainingMinutes,
    ConsumedAmpHours,
    SolarPower,
    YieldToday,
    ChargeState,
}

impl EntitySet for PowerEntity {
    const NAME: &'static str = "power";

    const ALL: &'static [Self] = &[
        Self::StateOfCharge,
        Self::RemainingMinutes,
        Self::ConsumedAmpHours,
        Self::SolarPower,
        Self::YieldToday,
        Self::ChargeState,
    ];

    fn sensor(self) -> &'static str {
        match self {
            Self::StateOfCharge | Self::RemainingMinutes | Self::ConsumedAmpHours => "SmartShunt",
            Self::SolarPower | Self::YieldToday | Self::ChargeState => "SmartSolar",
        }
    }

    fn entity(self) -> &'static str {
        match self {
            Self::StateOfCharge => "soc",
            Self::RemainingMinutes => "remaining_mins",
            Self::ConsumedAmpHours => "consumed_ah",
            Self::SolarPower => "solar_power",
            Self::YieldToday => "yield_today",
            Self::ChargeState => "charge_state",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::StateOfCharge => "SoC [%]",
            Self::RemainingMinutes => "Remaining [min]",
            Self::ConsumedAmpHours => "Consumed [Ah]",
            Self::SolarPower => "Solar [W]",
            Self::YieldToday => "Yield today [kWh]",
            Self::ChargeState => "Charge state",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClimateEntity {
    OutsideTemperature,
    OutsideHumidity,
    InsideTemperature,
    InsideHumidity,
}

impl EntitySet for ClimateEntity {
    const NAME: &'static str = "climate";

    const ALL: &'static [Self] = &[
        Self::OutsideTemperature,
        Self::OutsideHumidity,
        Self::InsideTemperature,
        Self::InsideHumidity,
    ];

    fn sensor(self) -> &'static str {
        match self {
            Self::OutsideTemperature | Self::OutsideHumidity => "outside",
            Self::InsideTemperature | Self::InsideHumidity => "inside",
        }
    }

    fn entity(self) -> &'static str {
        match self {
            Self::OutsideTemperature | Self::InsideTemperature => "temperature",
            Self::OutsideHumidity | Self::InsideHumidity => "humidity",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::OutsideTemperature => "Outside [°C]",
            Self::OutsideHumidity => "Outside [%RH]",
            Self::InsideTemperature => "Inside [°C]",
            Self::InsideHumidity => "Inside [%RH]",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn assert_unique_pairs<K: EntitySet>() {
        let pairs: HashSet<_> = K::ALL.iter().map(|k| (k.sensor(), k.entity())).collect();
        assert_eq!(pairs.len(), K::ALL.len(), "{} has duplicate bindings", K::NAME);
    }

    #[test]
    fn test_entity_pairs_are_unique() {
        assert_unique_pairs::<CamperEntity>();
        assert_unique_pairs::<PowerEntity>();
        assert_unique_pairs::<ClimateEntity>();
    }

    #[test]
    fn test_only_switches_are_writable() {
        let writable: Vec<_> = CamperEntity::ALL
            .iter()
            .copied()
            .filter(|k| k.writable())
            .collect();
        assert_eq!(
            writable,
            vec![CamperEntity::HouseholdState, CamperEntity::PumpState]
        );
        assert!(PowerEntity::ALL.iter().all(|k| !k.writable()));
        assert!(ClimateEntity::ALL.iter().all(|k| !k.writable()));
    }

    #[test]
    fn test_camper_scales() {
        assert_eq!(CamperEntity::HouseholdVoltage.scale(), Scale::MILLI);
        assert_eq!(CamperEntity::WaterLevel.scale(), Scale::PERCENT);
        assert_eq!(CamperEntity::PumpState.scale(), Scale::UNIT);
        assert_eq!(PowerEntity::SolarPower.scale(), Scale::UNIT);
    }
}
