//! Synthetic modules shared by the integration tests.

#![allow(dead_code)]

use trackerkit_formats::FormatId;

pub fn put(data: &mut Vec<u8>, offset: usize, bytes: &[u8]) {
    if data.len() < offset + bytes.len() {
        data.resize(offset + bytes.len(), 0);
    }
    data[offset..offset + bytes.len()].copy_from_slice(bytes);
}

pub fn put_u16_le(data: &mut Vec<u8>, offset: usize, value: u16) {
    put(data, offset, &value.to_le_bytes());
}

pub fn put_u16_be(data: &mut Vec<u8>, offset: usize, value: u16) {
    put(data, offset, &value.to_be_bytes());
}

pub fn put_u32_le(data: &mut Vec<u8>, offset: usize, value: u32) {
    put(data, offset, &value.to_le_bytes());
}

pub fn put_u32_be(data: &mut Vec<u8>, offset: usize, value: u32) {
    put(data, offset, &value.to_be_bytes());
}

/// `len` zero bytes with `magic` at `offset`.
pub fn tagged(len: usize, offset: usize, magic: &[u8]) -> Vec<u8> {
    let mut data = vec![0u8; len];
    put(&mut data, offset, magic);
    data
}

fn chunk(data: &mut Vec<u8>, id: &[u8; 4], body: &[u8]) {
    data.extend_from_slice(id);
    data.extend_from_slice(&(body.len() as u32).to_be_bytes());
    data.extend_from_slice(body);
}

/// Four-channel `M.K.` module with one pattern and a note on row 0.
pub fn protracker() -> Vec<u8> {
    let mut data = vec![0u8; 1084 + 64 * 4 * 4];
    put(&mut data, 0, b"space debris");
    data[950] = 1;
    put(&mut data, 1080, b"M.K.");
    put(&mut data, 1084, &[0x03, 0x58, 0x10, 0x00]);
    data
}

/// FastTracker 2 header with no patterns and one order.
pub fn xm() -> Vec<u8> {
    let mut data = vec![0u8; 336];
    put(&mut data, 0, b"Extended Module: ");
    put(&mut data, 17, b"unreal superhero");
    data[37] = 0x1A;
    put_u16_le(&mut data, 58, 0x0104);
    put_u32_le(&mut data, 60, 276);
    put_u16_le(&mut data, 64, 1);
    put_u16_le(&mut data, 68, 4);
    put_u16_le(&mut data, 76, 6);
    put_u16_le(&mut data, 78, 125);
    data
}

/// MultiTracker module: four channels, one silent pattern.
pub fn mtm() -> Vec<u8> {
    let mut data = vec![0u8; 66 + 128 + 64];
    put(&mut data, 0, b"MTM\x10");
    put(&mut data, 4, b"tracked down");
    data[32] = 64;
    data[33] = 4;
    data
}

/// Composer 669 module with one empty pattern.
pub fn composer669() -> Vec<u8> {
    let mut data = vec![0u8; 497];
    put(&mut data, 0, b"if");
    put(&mut data, 2, b"lunatic asylum");
    data[111] = 1;
    put(&mut data, 113, &[0xFF; 128]);
    data[113] = 0;
    data[241] = 6;
    data[369] = 63;
    data.resize(497 + 64 * 8 * 3, 0xFF);
    data
}

/// Oktalyzer module: four plain voices, one single-row pattern.
pub fn oktalyzer() -> Vec<u8> {
    let mut data = b"OKTASONG".to_vec();
    chunk(&mut data, b"CMOD", &[0; 8]);
    chunk(&mut data, b"SPEE", &[0, 6]);
    chunk(&mut data, b"SLEN", &[0, 1]);
    chunk(&mut data, b"PLEN", &[0, 1]);
    chunk(&mut data, b"PATT", &[0; 128]);
    let mut body = vec![0, 1];
    body.extend_from_slice(&[13, 0, 0, 0]);
    body.extend_from_slice(&[0; 12]);
    chunk(&mut data, b"PBOD", &body);
    data
}

/// TD-3 pattern dump with four steps.
pub fn td3() -> Vec<u8> {
    let mut data = vec![0u8; 146];
    put(&mut data, 0, &[0x23, 0x98, 0x54, 0x76]);
    put(&mut data, 8, &[0, b'T', 0, b'D', 0, b'-', 0, b'3']);
    put(&mut data, 0x86, &[0, 4]);
    put(&mut data, 0x24, &[1, 3]);
    data
}

/// Imago Orpheus header: four enabled channels, no stored patterns.
pub fn imf() -> Vec<u8> {
    let mut data = vec![0u8; 0x340];
    put(&mut data, 0, b"orbital");
    put_u16_le(&mut data, 32, 1);
    data[48] = 6;
    data[49] = 125;
    data[50] = 64;
    put(&mut data, 60, b"IM10");
    for channel in 0..32 {
        data[64 + channel * 16 + 14] = 0x80;
        data[64 + channel * 16 + 15] = if channel < 4 { 0 } else { 2 };
    }
    data
}

/// ChipTracker module: one position, track 0 silent but for row 0.
pub fn chiptracker() -> Vec<u8> {
    let mut data = vec![0u8; 2241];
    put(&mut data, 0, b"kris kross");
    put(&mut data, 952, b"KRIS");
    data[956] = 1;
    for row in 0..64 {
        data[1984 + row * 4] = 0xA8;
    }
    data[1984] = 24;
    data
}

pub fn furnace() -> Vec<u8> {
    tagged(64, 0, b"-Furnace module-")
}

pub fn mugician() -> Vec<u8> {
    tagged(76, 0, b" MUGICIAN/SOFTEAM")
}

pub fn tfmx() -> Vec<u8> {
    tagged(512, 0, b"TFMX-SONG ")
}

pub fn musicline() -> Vec<u8> {
    tagged(16, 0, b"MLEDMODL")
}

pub fn sonic_arranger() -> Vec<u8> {
    tagged(16, 0, b"SOARV1.0")
}

pub fn quadra() -> Vec<u8> {
    let mut data = tagged(16, 0, b"FORM");
    put(&mut data, 8, b"EMODEMIC");
    data
}

pub fn coso() -> Vec<u8> {
    let mut data = tagged(36, 0, b"COSO");
    put(&mut data, 32, b"TFMX");
    data
}

pub fn sidmon() -> Vec<u8> {
    tagged(64, 16, b"SID-MON BY R.v.VLIET")
}

pub fn impulse() -> Vec<u8> {
    let mut data = tagged(192, 0, b"IMPM");
    put(&mut data, 4, b"beyond");
    data
}

pub fn s3m() -> Vec<u8> {
    let mut data = tagged(96, 0, b"second reality");
    data[29] = 0x10;
    put(&mut data, 44, b"SCRM");
    data
}

pub fn soundfx() -> Vec<u8> {
    tagged(80, 60, b"SONG")
}

pub fn delta_music2() -> Vec<u8> {
    tagged(0xBCA, 0xBC6, b".FNL")
}

pub fn med() -> Vec<u8> {
    let mut data = tagged(52, 0, b"MMD0");
    put_u32_be(&mut data, 4, 52);
    data
}

/// `MODU` header chained to `BODY` and `SAMP` chunks.
pub fn novotrade() -> Vec<u8> {
    let mut data = tagged(40, 0, b"MODU");
    put_u16_be(&mut data, 16, 20);
    put(&mut data, 24, b"BODY");
    put_u16_be(&mut data, 28, 8);
    put(&mut data, 32, b"SAMP");
    put_u16_be(&mut data, 36, 2);
    data
}

pub fn future_composer() -> Vec<u8> {
    let mut data = tagged(100, 0, b"SMOD");
    put_u32_be(&mut data, 4, 13);
    put_u32_be(&mut data, 8, 40);
    put_u32_be(&mut data, 32, 60);
    data
}

pub fn soundmon() -> Vec<u8> {
    let mut data = tagged(32, 0, b"bubble bobble");
    put(&mut data, 26, b"V.3");
    data
}

pub fn hively() -> Vec<u8> {
    let mut data = tagged(32, 0, b"HVL\0");
    put_u16_be(&mut data, 4, 20);
    put(&mut data, 20, b"Gone\0");
    data
}

pub fn ahx() -> Vec<u8> {
    let mut data = tagged(32, 0, b"THX\0");
    put_u16_be(&mut data, 4, 16);
    put(&mut data, 16, b"Geir\0");
    data
}

pub fn jamcracker() -> Vec<u8> {
    tagged(8, 0, b"BeEp")
}

pub fn digital_sound_studio() -> Vec<u8> {
    tagged(8, 0, b"MMU2")
}

pub fn sunvox() -> Vec<u8> {
    tagged(16, 0, b"SVOX")
}

/// `ALL ` header whose 25 block lengths are all zero.
pub fn delta_music1() -> Vec<u8> {
    tagged(104, 0, b"ALL ")
}

pub fn soundtracker_pro() -> Vec<u8> {
    tagged(204, 0, b"STP3")
}

pub fn dmdl() -> Vec<u8> {
    tagged(16, 0, b"DMDL")
}

pub fn c183() -> Vec<u8> {
    let mut data = vec![0u8; 16];
    put_u32_be(&mut data, 0, 0xC183_2A9E);
    data
}

pub fn adpcm2() -> Vec<u8> {
    tagged(16, 0, b"ADPCM2")
}

pub fn adpcm3() -> Vec<u8> {
    tagged(16, 0, b"ADPCM3")
}

/// Steve Turner player opening; only detected under a `JPO.` name.
pub fn steve_turner() -> Vec<u8> {
    let mut data = vec![0u8; 0x24];
    for at in [0, 8, 16, 24] {
        put_u16_be(&mut data, at, 0x2B7C);
    }
    put_u16_be(&mut data, 0x20, 0x303C);
    data
}

/// Seven-voice Sound Player header.
pub fn sound_player() -> Vec<u8> {
    let mut data = vec![0u8; 16];
    put_u16_be(&mut data, 0, 0x0040);
    put(&mut data, 2, &[7, 1, 0x10, 0x22]);
    data
}

/// Pierre Adane offsets 32, 36, 38, 40 with the terminator before D3.
pub fn pierre_adane() -> Vec<u8> {
    let mut data = vec![0u8; 64];
    for (at, offset) in [(0, 32), (2, 36), (4, 38), (6, 40)] {
        put_u16_be(&mut data, at, offset);
    }
    data[37] = 0xFF;
    data
}

/// Unsigned stream content with no signature of its own.
pub fn adpcm_mono() -> Vec<u8> {
    vec![0x11; 64]
}

pub fn lme() -> Vec<u8> {
    vec![0x11; 32]
}

/// A buffer the registry must resolve to `id`.
pub struct Fixture {
    pub id: FormatId,
    /// Filename hint; `None` unless the detector needs one.
    pub filename: Option<&'static str>,
    pub data: Vec<u8>,
}

fn content(id: FormatId, data: Vec<u8>) -> Fixture {
    Fixture {
        id,
        filename: None,
        data,
    }
}

fn named(id: FormatId, filename: &'static str, data: Vec<u8>) -> Fixture {
    Fixture {
        id,
        filename: Some(filename),
        data,
    }
}

/// One fixture per registry entry, in registration order.
pub fn all_fixtures() -> Vec<Fixture> {
    vec![
        content(FormatId::Xm, xm()),
        content(FormatId::Oktalyzer, oktalyzer()),
        content(FormatId::Td3, td3()),
        content(FormatId::Imf, imf()),
        content(FormatId::Mtm, mtm()),
        content(FormatId::ChipTracker, chiptracker()),
        content(FormatId::ProTracker, protracker()),
        content(FormatId::Composer669, composer669()),
        content(FormatId::Furnace, furnace()),
        content(FormatId::DigitalMugician, mugician()),
        content(FormatId::Tfmx, tfmx()),
        content(FormatId::MusicLine, musicline()),
        content(FormatId::SonicArranger, sonic_arranger()),
        content(FormatId::QuadraComposer, quadra()),
        content(FormatId::HippelCoso, coso()),
        content(FormatId::SidMon1, sidmon()),
        content(FormatId::ScreamTracker3, s3m()),
        content(FormatId::ImpulseTracker, impulse()),
        content(FormatId::SoundFx, soundfx()),
        content(FormatId::DeltaMusic2, delta_music2()),
        content(FormatId::OctaMed, med()),
        content(FormatId::NovoTrade, novotrade()),
        content(FormatId::FutureComposer, future_composer()),
        content(FormatId::SoundMon, soundmon()),
        content(FormatId::HivelyTracker, hively()),
        content(FormatId::Ahx, ahx()),
        content(FormatId::JamCracker, jamcracker()),
        content(FormatId::DigitalSoundStudio, digital_sound_studio()),
        content(FormatId::SunVox, sunvox()),
        content(FormatId::DeltaMusic1, delta_music1()),
        content(FormatId::SoundTrackerPro, soundtracker_pro()),
        content(FormatId::Dmdl, dmdl()),
        content(FormatId::C183, c183()),
        content(FormatId::Adpcm2, adpcm2()),
        content(FormatId::Adpcm3, adpcm3()),
        named(FormatId::SteveTurner, "JPO.dragons", steve_turner()),
        content(FormatId::SoundPlayer, sound_player()),
        content(FormatId::PierreAdane, pierre_adane()),
        named(FormatId::AdpcmMono, "voice.adpcm", adpcm_mono()),
        named(FormatId::Lme, "LME.intro", lme()),
    ]
}
