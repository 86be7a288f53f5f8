//! SPDX license identifiers.
//!
//! The full SPDX list is several hundred entries long; the ones bundled
//! here cover what scientific software is commonly released under. Unknown
//! identifiers that are shaped like SPDX ids are reported as warnings, not
//! errors.

use std::sync::LazyLock;

use regex::Regex;

/// Commonly used SPDX license identifiers.
pub const KNOWN_LICENSES: &[&str] = &[
    "0BSD",
    "AFL-3.0",
    "AGPL-3.0-only",
    "AGPL-3.0-or-later",
    "Apache-1.1",
    "Apache-2.0",
    "Artistic-2.0",
    "BSD-2-Clause",
    "BSD-3-Clause",
    "BSD-3-Clause-Clear",
    "BSD-4-Clause",
    "BSL-1.0",
    "CC-BY-3.0",
    "CC-BY-4.0",
    "CC-BY-NC-4.0",
    "CC-BY-NC-SA-4.0",
    "CC-BY-ND-4.0",
    "CC-BY-SA-3.0",
    "CC-BY-SA-4.0",
    "CC0-1.0",
    "CECILL-2.1",
    "ECL-2.0",
    "EPL-1.0",
    "EPL-2.0",
    "EUPL-1.1",
    "EUPL-1.2",
    "GPL-2.0-only",
    "GPL-2.0-or-later",
    "GPL-3.0-only",
    "GPL-3.0-or-later",
    "ISC",
    "LGPL-2.1-only",
    "LGPL-2.1-or-later",
    "LGPL-3.0-only",
    "LGPL-3.0-or-later",
    "LPPL-1.3c",
    "MIT",
    "MIT-0",
    "MPL-2.0",
    "MS-PL",
    "MS-RL",
    "NCSA",
    "ODbL-1.0",
    "OFL-1.1",
    "OSL-3.0",
    "PDDL-1.0",
    "PostgreSQL",
    "Python-2.0",
    "Unlicense",
    "UPL-1.0",
    "Zlib",
];

static SPDX_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(LicenseRef-[A-Za-z0-9.\-]+|[A-Za-z0-9][A-Za-z0-9.+\-]*)$")
        .expect("Invalid SPDX identifier regex")
});

/// Is `id` one of the bundled identifiers (case-sensitive, as SPDX is)?
pub fn is_known(id: &str) -> bool {
    KNOWN_LICENSES.contains(&id)
}

/// Does `id` have the lexical shape of an SPDX identifier?
pub fn is_well_formed(id: &str) -> bool {
    SPDX_SHAPE.is_match(id)
}

/// Bundled identifier that matches `id` ignoring case, if any.
///
/// Used to suggest `Apache-2.0` for `apache-2.0`.
pub fn case_insensitive_match(id: &str) -> Option<&'static str> {
    KNOWN_LICENSES
        .iter()
        .copied()
        .find(|known| known.eq_ignore_ascii_case(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known() {
        assert!(is_known("Apache-2.0"));
        assert!(is_known("MIT"));
        assert!(!is_known("apache-2.0"));
    }

    #[test]
    fn test_well_formed() {
        assert!(is_well_formed("Apache-2.0"));
        assert!(is_well_formed("GPL-2.0+"));
        assert!(is_well_formed("LicenseRef-ECMWF-Internal"));
        assert!(!is_well_formed("Apache 2.0"));
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("-MIT"));
    }

    #[test]
    fn test_case_insensitive_match() {
        assert_eq!(case_insensitive_match("apache-2.0"), Some("Apache-2.0"));
        assert_eq!(case_insensitive_match("nope"), None);
    }

    #[test]
    fn test_list_is_sorted_case_insensitively() {
        let mut sorted = KNOWN_LICENSES.to_vec();
        sorted.sort_by_key(|id| id.to_lowercase());
        assert_eq!(sorted, KNOWN_LICENSES);
    }
}
