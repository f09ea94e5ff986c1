//! Grain-form vocabulary tables.
//!
//! Each density method accepts a different set of grain-form codes. A code
//! is either a sub-grain class (e.g. `FCxr`, `PPgp`, `RGmx`) or a basic
//! 2-character class (`FC`, `PP`, `RG`). Resolution prefers the sub-grain
//! code when the method knows it; otherwise the basic class extracted from
//! the first two characters is tried.

use snowmech_engine::DomainTable;

/// Prefix length of a basic grain class code.
pub const BASIC_CLASS_LEN: usize = 2;

/// The vocabulary table for a density method's `grain_form` input, if the
/// method restricts its grain forms.
pub fn grain_form_table(method: &str) -> Option<DomainTable> {
    let (specific, general): (&[&str], &[&str]) = match method {
        "geldsetzer" => (&["PPgp", "RGmx", "FCmx"], &["PP", "DF", "RG", "FC", "DH"]),
        "kim_jamieson_table2" => (
            &["PPgp", "RGxf", "FCxr", "MFcr"],
            &["PP", "DF", "FC", "DH", "RG"],
        ),
        "kim_jamieson_table5" => (&["FCxr", "PPgp"], &["FC", "PP", "DF", "MF"]),
        _ => return None,
    };
    Some(DomainTable::new(
        specific.iter().copied(),
        general.iter().copied(),
        BASIC_CLASS_LEN,
    ))
}

/// The basic grain class: the first two characters of a grain-form code.
pub fn basic_class(grain_form: &str) -> Option<&str> {
    grain_form.get(0..BASIC_CLASS_LEN)
}
