//! Channel identities and positional layouts

use serde::{Deserialize, Serialize};

use crate::config::defaults::DEFAULT_READING;

/// A single named physical quantity reported by a three-phase meter.
///
/// Serialized in snake_case (`u1`, `thd_i1`, `pf_total`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    // === Phase voltages (V) ===
    U1,
    U2,
    U3,

    // === Phase currents (A) ===
    I1,
    I2,
    I3,

    // === Phase active powers (kW) ===
    P1,
    P2,
    P3,
    /// Meter-reported total active power (kW)
    PTotal,
    /// Meter-reported peak phase power (kW)
    PMax,
    /// Meter-reported minimum phase power (kW)
    PMin,

    // === Harmonic distortion (%) ===
    ThdI1,
    ThdI2,
    ThdI3,
    ThdU1n,
    ThdU2n,
    ThdU3n,

    // === Aggregates ===
    /// Aggregate active power (kW)
    ActivePower,
    /// Aggregate active energy (kWh)
    ActiveEnergy,

    // === Power factor ===
    Pf1,
    Pf2,
    Pf3,
    PfTotal,
}

impl Channel {
    pub const PHASE_VOLTAGES: [Channel; 3] = [Channel::U1, Channel::U2, Channel::U3];
    pub const PHASE_CURRENTS: [Channel; 3] = [Channel::I1, Channel::I2, Channel::I3];
    pub const PHASE_POWERS: [Channel; 3] = [Channel::P1, Channel::P2, Channel::P3];
    pub const CURRENT_THD: [Channel; 3] = [Channel::ThdI1, Channel::ThdI2, Channel::ThdI3];
    pub const VOLTAGE_THD: [Channel; 3] = [Channel::ThdU1n, Channel::ThdU2n, Channel::ThdU3n];
    pub const PHASE_POWER_FACTORS: [Channel; 3] = [Channel::Pf1, Channel::Pf2, Channel::Pf3];

    /// Short display label as printed on meter panels.
    pub fn label(&self) -> &'static str {
        match self {
            Channel::U1 => "U1",
            Channel::U2 => "U2",
            Channel::U3 => "U3",
            Channel::I1 => "I1",
            Channel::I2 => "I2",
            Channel::I3 => "I3",
            Channel::P1 => "P1",
            Channel::P2 => "P2",
            Channel::P3 => "P3",
            Channel::PTotal => "P Total",
            Channel::PMax => "P Max",
            Channel::PMin => "P Min",
            Channel::ThdI1 => "THD I1",
            Channel::ThdI2 => "THD I2",
            Channel::ThdI3 => "THD I3",
            Channel::ThdU1n => "THD U1N",
            Channel::ThdU2n => "THD U2N",
            Channel::ThdU3n => "THD U3N",
            Channel::ActivePower => "Active Power",
            Channel::ActiveEnergy => "Active Energy",
            Channel::Pf1 => "PF1",
            Channel::Pf2 => "PF2",
            Channel::Pf3 => "PF3",
            Channel::PfTotal => "PF Total",
        }
    }

    /// Engineering unit of the channel.
    pub fn unit(&self) -> &'static str {
        match self {
            Channel::U1 | Channel::U2 | Channel::U3 => "V",
            Channel::I1 | Channel::I2 | Channel::I3 => "A",
            Channel::P1
            | Channel::P2
            | Channel::P3
            | Channel::PTotal
            | Channel::PMax
            | Channel::PMin
            | Channel::ActivePower => "kW",
            Channel::ActiveEnergy => "kWh",
            Channel::ThdI1
            | Channel::ThdI2
            | Channel::ThdI3
            | Channel::ThdU1n
            | Channel::ThdU2n
            | Channel::ThdU3n => "%",
            Channel::Pf1 | Channel::Pf2 | Channel::Pf3 | Channel::PfTotal => "",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Layout
// ============================================================================

/// One position of the configuration: which channel it carries and the
/// reading substituted when the channel is absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelSlot {
    pub channel: Channel,
    #[serde(default = "default_slot_reading")]
    pub default: f64,
}

fn default_slot_reading() -> f64 {
    DEFAULT_READING
}

impl ChannelSlot {
    pub const fn new(channel: Channel) -> Self {
        Self {
            channel,
            default: DEFAULT_READING,
        }
    }
}

/// Built-in positional layouts observed across meter deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutProfile {
    /// Voltages, currents and phase powers only.
    Basic,
    /// Phase triples followed by THD, aggregates and power factor.
    #[default]
    Standard,
    /// Like `Standard` with meter-reported total/peak/minimum power after the phase powers.
    Extended,
}

impl LayoutProfile {
    pub fn name(&self) -> &'static str {
        match self {
            LayoutProfile::Basic => "basic",
            LayoutProfile::Standard => "standard",
            LayoutProfile::Extended => "extended",
        }
    }

    /// Ordered channels for this profile. Position `i` is configuration index `i`.
    pub fn channels(&self) -> Vec<Channel> {
        let mut channels = Vec::with_capacity(24);
        channels.extend(Channel::PHASE_VOLTAGES);
        channels.extend(Channel::PHASE_CURRENTS);
        channels.extend(Channel::PHASE_POWERS);

        match self {
            LayoutProfile::Basic => {}
            LayoutProfile::Standard => {
                channels.extend(Self::tail());
            }
            LayoutProfile::Extended => {
                channels.extend([Channel::PTotal, Channel::PMax, Channel::PMin]);
                channels.extend(Self::tail());
            }
        }
        channels
    }

    fn tail() -> impl Iterator<Item = Channel> {
        Channel::CURRENT_THD
            .into_iter()
            .chain(Channel::VOLTAGE_THD)
            .chain([Channel::ActivePower, Channel::ActiveEnergy])
            .chain(Channel::PHASE_POWER_FACTORS)
            .chain([Channel::PfTotal])
    }
}

impl std::str::FromStr for LayoutProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(LayoutProfile::Basic),
            "standard" => Ok(LayoutProfile::Standard),
            "extended" => Ok(LayoutProfile::Extended),
            other => Err(format!(
                "unknown layout profile '{other}' (expected basic, standard or extended)"
            )),
        }
    }
}

impl std::fmt::Display for LayoutProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Explicit index → channel descriptor replacing the implicit positional convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelLayout {
    slots: Vec<ChannelSlot>,
}

impl ChannelLayout {
    pub fn new(slots: Vec<ChannelSlot>) -> Self {
        Self { slots }
    }

    pub fn from_profile(profile: LayoutProfile) -> Self {
        Self::new(profile.channels().into_iter().map(ChannelSlot::new).collect())
    }

    pub fn slots(&self) -> &[ChannelSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Configuration index carrying `channel`, if the layout has it.
    pub fn position_of(&self, channel: Channel) -> Option<usize> {
        self.slots.iter().position(|s| s.channel == channel)
    }

    pub fn contains(&self, channel: Channel) -> bool {
        self.position_of(channel).is_some()
    }

    /// Channels appearing in more than one slot.
    pub fn duplicate_channels(&self) -> Vec<Channel> {
        let mut seen = std::collections::BTreeSet::new();
        let mut dupes = Vec::new();
        for slot in &self.slots {
            if !seen.insert(slot.channel) && !dupes.contains(&slot.channel) {
                dupes.push(slot.channel);
            }
        }
        dupes
    }
}

impl Default for ChannelLayout {
    fn default() -> Self {
        Self::from_profile(LayoutProfile::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_positions_fixed_across_profiles() {
        for profile in [LayoutProfile::Basic, LayoutProfile::Standard, LayoutProfile::Extended] {
            let layout = ChannelLayout::from_profile(profile);
            assert_eq!(layout.position_of(Channel::U1), Some(0));
            assert_eq!(layout.position_of(Channel::I1), Some(3));
            assert_eq!(layout.position_of(Channel::P3), Some(8));
        }
    }

    #[test]
    fn test_units() {
        assert_eq!(Channel::U2.unit(), "V");
        assert_eq!(Channel::I3.unit(), "A");
        assert_eq!(Channel::PTotal.unit(), "kW");
        assert_eq!(Channel::ActiveEnergy.unit(), "kWh");
        assert_eq!(Channel::ThdI1.unit(), "%");
        assert_eq!(Channel::PfTotal.unit(), "");
    }

    #[test]
    fn test_profile_lengths() {
        assert_eq!(ChannelLayout::from_profile(LayoutProfile::Basic).len(), 9);
        assert_eq!(ChannelLayout::from_profile(LayoutProfile::Standard).len(), 21);
        assert_eq!(ChannelLayout::from_profile(LayoutProfile::Extended).len(), 24);
    }

    #[test]
    fn test_extended_total_follows_phase_powers() {
        let layout = ChannelLayout::from_profile(LayoutProfile::Extended);
        assert_eq!(layout.position_of(Channel::PTotal), Some(9));
        assert_eq!(layout.position_of(Channel::ThdI1), Some(12));
        assert!(!ChannelLayout::from_profile(LayoutProfile::Standard).contains(Channel::PTotal));
    }

    #[test]
    fn test_duplicate_detection() {
        let layout = ChannelLayout::new(vec![
            ChannelSlot::new(Channel::U1),
            ChannelSlot::new(Channel::U1),
            ChannelSlot::new(Channel::U2),
            ChannelSlot::new(Channel::U1),
        ]);
        assert_eq!(layout.duplicate_channels(), vec![Channel::U1]);
    }

    #[test]
    fn test_channel_serde_names() {
        let json = serde_json::to_string(&Channel::ThdU1n).expect("serialize");
        assert_eq!(json, "\"thd_u1n\"");
        let ch: Channel = serde_json::from_str("\"pf_total\"").expect("deserialize");
        assert_eq!(ch, Channel::PfTotal);
    }

    #[test]
    fn test_profile_from_str() {
        assert_eq!("Extended".parse::<LayoutProfile>(), Ok(LayoutProfile::Extended));
        assert!("fancy".parse::<LayoutProfile>().is_err());
    }
}
