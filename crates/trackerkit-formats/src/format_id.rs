//! Identity and naming conventions of every supported format.

use std::fmt;

use serde::{Serialize, Serializer};
use trackerkit_common::FormatFamily;

/// How far a decoder takes a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodePolicy {
    /// Patterns, instruments and order list are decoded.
    Full,
    /// Only a metadata stub is built; the bytes go to a native engine.
    Delegated,
}

/// Static description of a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    /// Short provenance tag used in song names (`"MOD"`).
    pub tag: &'static str,
    /// Human-readable name (`"ProTracker"`).
    pub name: &'static str,
    /// Renderer family of decoded songs.
    pub family: FormatFamily,
    /// Full decode or delegation.
    pub policy: DecodePolicy,
    /// Conventional Amiga-style filename prefixes, e.g. `"MOD."`.
    pub prefixes: &'static [&'static str],
    /// Conventional filename extensions, e.g. `".mod"`.
    pub suffixes: &'static [&'static str],
}

macro_rules! formats {
    ($(
        $variant:ident => $tag:literal, $name:literal, $family:ident, $policy:ident,
            [$($prefix:literal),*], [$($suffix:literal),*];
    )+) => {
        /// Every format the registry knows, in registration order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum FormatId {
            $(
                #[doc = $name]
                $variant,
            )+
        }

        impl FormatId {
            /// All formats in registration order.
            pub const ALL: &'static [FormatId] = &[$(FormatId::$variant),+];

            /// Static description.
            pub fn info(self) -> &'static FormatInfo {
                match self {
                    $(
                        FormatId::$variant => &FormatInfo {
                            tag: $tag,
                            name: $name,
                            family: FormatFamily::$family,
                            policy: DecodePolicy::$policy,
                            prefixes: &[$($prefix),*],
                            suffixes: &[$($suffix),*],
                        },
                    )+
                }
            }
        }
    };
}

formats! {
    Xm => "XM", "FastTracker 2", Xm, Full, [], [".xm"];
    Oktalyzer => "OKT", "Oktalyzer", Mod, Full, ["OKT.", "OKTA."], [".okt", ".okta"];
    Td3 => "TD3", "Behringer TD-3 Pattern", Xm, Full, [], [".sqs", ".seq"];
    Imf => "IMF", "Imago Orpheus", Xm, Full, [], [".imf"];
    Mtm => "MTM", "MultiTracker", Xm, Full, [], [".mtm"];
    ChipTracker => "KRIS", "ChipTracker", Mod, Full, ["KRIS.", "KRS."], [".kris", ".krs"];
    ProTracker => "MOD", "ProTracker", Mod, Full, ["MOD."], [".mod"];
    Composer669 => "669", "Composer 669", Xm, Full, [], [".669"];
    Furnace => "FUR", "Furnace", Native, Delegated, [], [".fur"];
    DigitalMugician => "DMU", "Digital Mugician", Native, Delegated, ["DMU.", "MUG."], [".dmu", ".mug"];
    Tfmx => "TFMX", "TFMX", Native, Delegated, ["MDAT.", "TFMX."], [".tfx", ".mdat"];
    MusicLine => "ML", "MusicLine Editor", Native, Delegated, ["ML."], [".ml"];
    SonicArranger => "SA", "Sonic Arranger", Native, Delegated, ["SA."], [".sa"];
    QuadraComposer => "EMOD", "Quadra Composer", Native, Delegated, ["EMOD.", "QC."], [".emod", ".qc"];
    HippelCoso => "COSO", "Hippel COSO", Native, Delegated, ["HIPC.", "COSO."], [".hipc", ".coso"];
    SidMon1 => "SID1", "SidMon 1", Native, Delegated, ["SID1.", "SID."], [".sid1", ".smn"];
    ScreamTracker3 => "S3M", "Scream Tracker 3", Native, Delegated, [], [".s3m"];
    ImpulseTracker => "IT", "Impulse Tracker", Native, Delegated, [], [".it"];
    SoundFx => "SFX", "SoundFX", Native, Delegated, ["SFX."], [".sfx", ".sfx2"];
    DeltaMusic2 => "DM2", "Delta Music 2", Native, Delegated, ["DM2."], [".dm2"];
    OctaMed => "MED", "OctaMED", Native, Delegated, ["MED.", "MMD0.", "MMD1.", "MMD2.", "MMD3."], [".med", ".mmd0", ".mmd1", ".mmd2", ".mmd3"];
    NovoTrade => "NTP", "NovoTrade Packer", Native, Delegated, ["NTP."], [".ntp"];
    FutureComposer => "FC", "Future Composer", Native, Delegated, ["FC13.", "FC14.", "FC."], [".fc13", ".fc14", ".fc"];
    SoundMon => "BP", "SoundMon", Native, Delegated, ["BP3.", "BP."], [".bp3", ".bp"];
    HivelyTracker => "HVL", "HivelyTracker", Native, Delegated, ["HVL."], [".hvl"];
    Ahx => "AHX", "AHX", Native, Delegated, ["AHX.", "THX."], [".ahx", ".thx"];
    JamCracker => "JAM", "JamCracker", Native, Delegated, ["JAM."], [".jam"];
    DigitalSoundStudio => "DSS", "Digital Sound Studio", Native, Delegated, ["DSS."], [".dss"];
    SunVox => "SUNVOX", "SunVox", Native, Delegated, [], [".sunvox"];
    DeltaMusic1 => "DM1", "Delta Music 1", Native, Delegated, ["DM1.", "DM."], [".dm1", ".dm"];
    SoundTrackerPro => "STP", "SoundTracker Pro II", Native, Delegated, ["STP."], [".stp"];
    Dmdl => "DMDL", "DMDL Module", Native, Delegated, [], [".dmdl"];
    C183 => "C183", "C183 Module", Native, Delegated, [], [];
    Adpcm2 => "ADPCM2", "ADPCM2", Native, Delegated, [], [".adpcm"];
    Adpcm3 => "ADPCM3", "ADPCM3", Native, Delegated, [], [".adpcm"];
    SteveTurner => "JPO", "Steve Turner", Native, Delegated, ["JPO."], [".jpo"];
    SoundPlayer => "SJS", "Sound Player", Native, Delegated, ["SJS."], [".sjs"];
    PierreAdane => "PAP", "Pierre Adane Packer", Native, Delegated, ["PAP."], [".pap"];
    AdpcmMono => "ADPCM", "ADPCM Mono", Native, Delegated, [], [".adpcm"];
    Lme => "LME", "Leggless Music Editor", Native, Delegated, ["LME."], [".lme"];
}

impl FormatId {
    /// Short provenance tag.
    pub fn tag(self) -> &'static str {
        self.info().tag
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Renderer family.
    pub fn family(self) -> FormatFamily {
        self.info().family
    }

    /// Full decode or delegation.
    pub fn policy(self) -> DecodePolicy {
        self.info().policy
    }

    /// Look a format up by tag, ignoring ASCII case.
    pub fn from_tag(tag: &str) -> Option<FormatId> {
        FormatId::ALL
            .iter()
            .copied()
            .find(|id| id.tag().eq_ignore_ascii_case(tag.trim()))
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for FormatId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tags_are_unique() {
        let tags: HashSet<&str> = FormatId::ALL.iter().map(|id| id.tag()).collect();
        assert_eq!(tags.len(), FormatId::ALL.len());
    }

    #[test]
    fn test_from_tag_ignores_case() {
        assert_eq!(FormatId::from_tag("ntp"), Some(FormatId::NovoTrade));
        assert_eq!(FormatId::from_tag(" XM "), Some(FormatId::Xm));
        assert_eq!(FormatId::from_tag("YM6"), None);
    }

    #[test]
    fn test_policy_matches_family() {
        for &id in FormatId::ALL {
            let delegated = id.policy() == DecodePolicy::Delegated;
            assert_eq!(delegated, id.family() == FormatFamily::Native, "{id}");
        }
    }

    #[test]
    fn test_serializes_as_tag() {
        let json = serde_json::to_string(&FormatId::Composer669).unwrap();
        assert_eq!(json, "\"669\"");
    }
}
