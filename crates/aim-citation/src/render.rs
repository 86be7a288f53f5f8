//! Formatted citations (APA and BibTeX) generated from a [`Citation`].

use chrono::Datelike;

use crate::model::{Author, Citation, CitationType};

/// Year of release, if known.
fn year(citation: &Citation) -> Option<i32> {
    citation.date_released.map(|date| date.year())
}

fn apa_author(author: &Author) -> String {
    match author {
        Author::Entity(entity) => entity.name.clone(),
        Author::Person(person) => {
            let initials = person.initials();
            match (person.family_with_particle(), initials.is_empty()) {
                (Some(family), false) => format!("{family}, {initials}"),
                (Some(family), true) => family,
                (None, _) => person.full_name(),
            }
        }
    }
}

fn bibtex_author(author: &Author) -> String {
    match author {
        // Braces keep BibTeX from splitting organisation names.
        Author::Entity(entity) => format!("{{{}}}", entity.name),
        Author::Person(person) => match (person.family_with_particle(), &person.given_names) {
            (Some(family), Some(given)) => format!("{family}, {given}"),
            _ => person.full_name(),
        },
    }
}

/// APA 7 style reference.
///
/// ```rust
/// use aim_citation::{parse_str, render::to_apa};
///
/// let doc = parse_str(
///     "cff-version: 1.2.0\nmessage: cite\ntitle: ai-models\nauthors:\n  - name: ECMWF\n",
/// ).unwrap();
/// let citation = doc.deserialize().unwrap();
/// assert_eq!(to_apa(&citation), "ECMWF. (n.d.). ai-models [Computer software].");
/// ```
pub fn to_apa(citation: &Citation) -> String {
    let authors: Vec<String> = citation.authors.iter().map(apa_author).collect();
    let authors = match authors.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{}, & {last}", init.join(", ")),
    };

    let year = year(citation).map_or_else(|| "n.d.".to_string(), |y| y.to_string());
    let separator = if authors.ends_with('.') { " " } else { ". " };
    let mut out = format!("{authors}{separator}({year}). {}", citation.title);

    if let Some(version) = &citation.version {
        out.push_str(&format!(" (Version {version})"));
    }
    out.push_str(match citation.kind {
        CitationType::Software => " [Computer software].",
        CitationType::Dataset => " [Data set].",
    });

    if let Some(doi) = citation.primary_doi() {
        out.push_str(&format!(" https://doi.org/{doi}"));
    } else if let Some(url) = citation.primary_url() {
        out.push_str(&format!(" {url}"));
    }
    out
}

/// Citation key: first author's family name (or entity name) plus year.
pub fn bibtex_key(citation: &Citation) -> String {
    let stem = citation
        .authors
        .first()
        .map(|author| match author {
            Author::Entity(entity) => entity.alias.clone().unwrap_or_else(|| entity.name.clone()),
            Author::Person(person) => person
                .family_names
                .clone()
                .unwrap_or_else(|| person.full_name()),
        })
        .unwrap_or_else(|| citation.title.clone());

    let stem: String = stem
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase();

    match year(citation) {
        Some(year) => format!("{stem}{year}"),
        None => stem,
    }
}

/// BibTeX entry (`@software` or `@misc` for datasets).
pub fn to_bibtex(citation: &Citation) -> String {
    let entry_type = match citation.kind {
        CitationType::Software => "software",
        CitationType::Dataset => "misc",
    };

    let mut fields: Vec<(&str, String)> = vec![
        (
            "author",
            citation
                .authors
                .iter()
                .map(bibtex_author)
                .collect::<Vec<_>>()
                .join(" and "),
        ),
        ("title", format!("{{{}}}", citation.title)),
    ];
    if let Some(year) = year(citation) {
        fields.push(("year", year.to_string()));
    }
    if let Some(version) = &citation.version {
        fields.push(("version", version.to_string()));
    }
    if let Some(doi) = citation.primary_doi() {
        fields.push(("doi", doi.to_string()));
    }
    if let Some(url) = citation.primary_url() {
        fields.push(("url", url.to_string()));
    }
    if let Some(license) = &citation.license {
        fields.push(("license", license.to_string()));
    }

    let body = fields
        .iter()
        .map(|(name, value)| format!("  {name} = {{{value}}}"))
        .collect::<Vec<_>>()
        .join(",\n");

    format!("@{entry_type}{{{},\n{body}\n}}\n", bibtex_key(citation))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::parse_str;

    fn citation(extra: &str) -> Citation {
        let content = format!(
            "cff-version: 1.2.0\nmessage: cite\ntitle: ai-models\nauthors:\n  - family-names: Raoult\n    given-names: Baudouin\n  - family-names: Pinault\n    given-names: Florian\n  - name: European Centre for Medium-Range Weather Forecasts\n    alias: ECMWF\n{extra}"
        );
        parse_str(&content).unwrap().deserialize().unwrap()
    }

    #[test]
    fn test_apa_full() {
        let c = citation(
            "date-released: 2023-08-30\nversion: 0.3.1\nrepository-code: https://github.com/ecmwf-lab/ai-models\n",
        );
        assert_eq!(
            to_apa(&c),
            "Raoult, B., Pinault, F., & European Centre for Medium-Range Weather Forecasts. \
             (2023). ai-models (Version 0.3.1) [Computer software]. \
             https://github.com/ecmwf-lab/ai-models"
        );
    }

    #[test]
    fn test_apa_no_double_period() {
        let c: Citation = parse_str(
            "cff-version: 1.2.0\nmessage: cite\ntitle: t\nauthors:\n  - family-names: Raoult\n    given-names: Baudouin\n",
        )
        .unwrap()
        .deserialize()
        .unwrap();
        assert!(to_apa(&c).starts_with("Raoult, B. (n.d.). t"));
    }

    #[test]
    fn test_apa_prefers_doi() {
        let c = citation("doi: 10.5281/zenodo.8014856\nurl: https://example.org\n");
        assert!(to_apa(&c).ends_with("https://doi.org/10.5281/zenodo.8014856"));
    }

    #[test]
    fn test_apa_dataset() {
        let c = citation("type: dataset\n");
        assert!(to_apa(&c).contains("[Data set]."));
    }

    #[test]
    fn test_bibtex_key() {
        assert_eq!(bibtex_key(&citation("date-released: 2023-08-30\n")), "raoult2023");
        assert_eq!(bibtex_key(&citation("")), "raoult");
    }

    #[test]
    fn test_bibtex_entry() {
        let c = citation("date-released: 2023-08-30\nlicense: Apache-2.0\n");
        let bib = to_bibtex(&c);
        assert!(bib.starts_with("@software{raoult2023,\n"));
        assert!(bib.contains(
            "  author = {Raoult, Baudouin and Pinault, Florian and {European Centre for Medium-Range Weather Forecasts}}"
        ));
        assert!(bib.contains("  title = {{ai-models}}"));
        assert!(bib.contains("  license = {Apache-2.0}"));
        assert!(bib.ends_with("}\n"));
    }
}
