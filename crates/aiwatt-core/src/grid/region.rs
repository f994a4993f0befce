//! Region name normalisation.
//!
//! Free-form region names are matched after trimming and lower-casing, first against the
//! canonical codes of the dataset and then against a fixed alias table. There is no fuzzy
//! or partial matching.

use super::dataset::GridIntensityDataset;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Alias to canonical region code.
const REGION_ALIASES: &[(&str, &str)] = &[
    // Global
    ("world", "global"),
    ("worldwide", "global"),
    // Europe
    ("europe", "eu"),
    ("european union", "eu"),
    ("eu27", "eu"),
    ("eu-27", "eu"),
    ("eu-west", "eu"),
    ("eu-central", "eu"),
    ("eu-north", "eu"),
    ("eu-south", "eu"),
    ("gb", "uk"),
    ("gbr", "uk"),
    ("united kingdom", "uk"),
    ("great britain", "uk"),
    ("britain", "uk"),
    ("england", "uk"),
    ("scotland", "uk"),
    ("wales", "uk"),
    ("northern ireland", "uk"),
    ("uk-south", "uk"),
    ("uk-west", "uk"),
    ("france", "fr"),
    ("fra", "fr"),
    ("germany", "de"),
    ("deutschland", "de"),
    ("deu", "de"),
    ("spain", "es"),
    ("italy", "it"),
    ("netherlands", "nl"),
    ("holland", "nl"),
    ("belgium", "be"),
    ("austria", "at"),
    ("switzerland", "ch"),
    ("ireland", "ie"),
    ("portugal", "pt"),
    ("poland", "pl"),
    ("czechia", "cz"),
    ("czech republic", "cz"),
    ("denmark", "dk"),
    ("sweden", "se"),
    ("norway", "no"),
    ("nor", "no"),
    ("finland", "fi"),
    ("greece", "gr"),
    ("romania", "ro"),
    ("hungary", "hu"),
    // Americas
    ("usa", "us"),
    ("united states", "us"),
    ("united states of america", "us"),
    ("america", "us"),
    ("us-east", "us"),
    ("us-west", "us"),
    ("us-central", "us"),
    ("us-south", "us"),
    ("canada", "ca"),
    ("can", "ca"),
    ("mexico", "mx"),
    ("brazil", "br"),
    ("bra", "br"),
    ("argentina", "ar"),
    ("chile", "cl"),
    // Asia-Pacific
    ("india", "in"),
    ("ind", "in"),
    ("china", "cn"),
    ("chn", "cn"),
    ("prc", "cn"),
    ("japan", "jp"),
    ("jpn", "jp"),
    ("south korea", "kr"),
    ("korea", "kr"),
    ("republic of korea", "kr"),
    ("taiwan", "tw"),
    ("singapore", "sg"),
    ("indonesia", "id"),
    ("thailand", "th"),
    ("vietnam", "vn"),
    ("viet nam", "vn"),
    ("malaysia", "my"),
    ("philippines", "ph"),
    ("australia", "au"),
    ("aus", "au"),
    ("new zealand", "nz"),
    // Africa and Middle East
    ("south africa", "za"),
    ("nigeria", "ng"),
    ("kenya", "ke"),
    ("egypt", "eg"),
    ("saudi arabia", "sa"),
    ("uae", "ae"),
    ("united arab emirates", "ae"),
    ("turkey", "tr"),
    ("turkiye", "tr"),
    ("russia", "ru"),
    ("russian federation", "ru"),
];

static ALIASES: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| REGION_ALIASES.iter().copied().collect());

/// Resolve a free-form region name to a canonical code.
///
/// Returns `None` when the name is absent, empty, or neither a code in `dataset` nor a
/// known alias. Callers are responsible for falling back to the global intensity.
pub fn normalize_region(region: Option<&str>, dataset: &GridIntensityDataset) -> Option<String> {
    let key = region?.trim().to_lowercase();
    if key.is_empty() {
        return None;
    }
    if dataset.contains(&key) {
        return Some(key);
    }
    ALIASES.get(key.as_str()).map(|code| code.to_string())
}

/// Canonical code an alias refers to, without consulting a dataset.
pub fn alias_target(alias: &str) -> Option<&'static str> {
    ALIASES.get(alias.trim().to_lowercase().as_str()).copied()
}
