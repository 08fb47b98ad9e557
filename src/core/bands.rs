//! Source band selection for terrain correction.
//!
//! When a terrain-correction task declares `sourceBands`, the list handed to
//! the operator is recomputed from the bands its first source actually
//! provides. Names are collected predicate by predicate in a fixed order, so
//! a name matching several predicates appears several times.

/// Operator whose `sourceBands` parameter is derived at run time.
pub const TERRAIN_CORRECTION: &str = "Terrain-Correction";

/// Parameter holding the comma-separated band list.
pub const SOURCE_BANDS: &str = "sourceBands";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandPredicate {
    Prefix(&'static str),
    Suffix(&'static str),
}

impl BandPredicate {
    pub fn matches(&self, band: &str) -> bool {
        match self {
            BandPredicate::Prefix(p) => band.starts_with(p),
            BandPredicate::Suffix(s) => band.ends_with(s),
        }
    }
}

pub const BAND_PREDICATES: [BandPredicate; 10] = [
    BandPredicate::Prefix("Amp"),
    BandPredicate::Prefix("Phase"),
    BandPredicate::Prefix("coh"),
    BandPredicate::Prefix("Int"),
    BandPredicate::Suffix("VV"),
    BandPredicate::Suffix("VH"),
    BandPredicate::Suffix("HH"),
    BandPredicate::Suffix("DEM"),
    BandPredicate::Suffix("elevation"),
    BandPredicate::Prefix("lay"),
];

pub fn select_bands<S: AsRef<str>>(bands: &[S]) -> Vec<String> {
    BAND_PREDICATES
        .iter()
        .flat_map(|predicate| {
            bands
                .iter()
                .map(|band| band.as_ref())
                .filter(move |band| predicate.matches(band))
        })
        .map(|band| band.to_string())
        .collect()
}

/// The `sourceBands` value for a source exposing `bands`.
pub fn source_bands_value<S: AsRef<str>>(bands: &[S]) -> String {
    select_bands(bands).join(",")
}
