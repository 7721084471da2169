//! Pattern-based extraction of contact details from ad descriptions.

use super::domain::ContactDetails;
use regex::Regex;
use std::sync::OnceLock;

/// Longest stretch after a contact keyword that is searched for a name.
const CONTACT_WINDOW_CHARS: usize = 160;

static PHONE_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
static UNION_PATTERN: OnceLock<Regex> = OnceLock::new();
static CONTACT_ANCHOR: OnceLock<Regex> = OnceLock::new();
static PERSON_NAME: OnceLock<Regex> = OnceLock::new();
static TRAILING_TITLE: OnceLock<Regex> = OnceLock::new();
static LEADING_TITLE: OnceLock<Regex> = OnceLock::new();

/// Words that follow a name in running text but are never part of it.
const NAME_STOPWORDS: &[&str] = &[
    "Tel", "Telefon", "Tfn", "Mobil", "Mail", "Mejl", "Epost", "Via", "Och", "Eller", "På",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactPerson {
    pub name: String,
    pub title: Option<String>,
}

pub fn extract_contact(description: &str) -> ContactDetails {
    let person = find_contact_person(description);
    ContactDetails {
        phone: find_phone(description),
        contact_name: person.as_ref().map(|person| person.name.clone()),
        contact_title: person.and_then(|person| person.title),
        union_mention: mentions_union(description),
    }
}

/// Earliest phone-number-like span in the text; ties go to the longer match.
pub fn find_phone(text: &str) -> Option<String> {
    phone_patterns()
        .iter()
        .filter_map(|pattern| pattern.find(text))
        .min_by_key(|found| (found.start(), std::cmp::Reverse(found.end())))
        .map(|found| found.as_str().trim().to_string())
}

pub fn mentions_union(text: &str) -> bool {
    UNION_PATTERN
        .get_or_init(|| Regex::new(r"(?i)fack|unionen|saco|förbund").expect("union pattern"))
        .is_match(text)
}

/// Looks for a named contact after keywords such as "kontaktperson" or
/// "upplysningar", with an optional role title.
pub fn find_contact_person(text: &str) -> Option<ContactPerson> {
    let anchor = CONTACT_ANCHOR.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:kontaktpersoner|kontaktperson|kontakta|kontakt|upplysningar|frågor|information)\b",
        )
        .expect("contact anchor pattern")
    });

    anchor
        .find_iter(text)
        .find_map(|keyword| person_in_window(contact_window(&text[keyword.end()..])))
}

fn contact_window(rest: &str) -> &str {
    let line = rest.split('\n').next().unwrap_or_default();
    match line.char_indices().nth(CONTACT_WINDOW_CHARS) {
        Some((cut, _)) => &line[..cut],
        None => line,
    }
}

fn person_in_window(window: &str) -> Option<ContactPerson> {
    let name_pattern = PERSON_NAME.get_or_init(|| {
        Regex::new(r"\b\p{Lu}\p{Ll}+(?:-\p{Lu}\p{Ll}+)?(?:\s+\p{Lu}\p{Ll}+(?:-\p{Lu}\p{Ll}+)?){1,2}\b")
            .expect("person name pattern")
    });

    let mut at = 0;
    while let Some(found) = name_pattern.find_at(window, at) {
        let Some((start, end)) = trim_stopwords(found.as_str()) else {
            // Matches do not overlap, so a name starting inside the rejected
            // one is searched for from its first non-stopword.
            at = match first_name_word(found.as_str()) {
                Some(offset) if offset > 0 => found.start() + offset,
                _ => found.end(),
            };
            continue;
        };
        let name_start = found.start() + start;
        let name_end = found.start() + end;
        let title = trailing_title(&window[name_end..])
            .or_else(|| leading_title(&window[..name_start]));
        return Some(ContactPerson {
            name: window[name_start..name_end].to_string(),
            title,
        });
    }

    None
}

fn candidate_words(candidate: &str) -> Vec<(usize, &str)> {
    candidate
        .split_whitespace()
        .map(|word| (word.as_ptr() as usize - candidate.as_ptr() as usize, word))
        .collect()
}

fn is_name_word(word: &str) -> bool {
    !NAME_STOPWORDS.contains(&word)
}

fn first_name_word(candidate: &str) -> Option<usize> {
    candidate_words(candidate)
        .into_iter()
        .find(|(_, word)| is_name_word(word))
        .map(|(offset, _)| offset)
}

/// Byte span of the candidate left after dropping stopwords at either end;
/// a name needs at least two words.
fn trim_stopwords(candidate: &str) -> Option<(usize, usize)> {
    let words = candidate_words(candidate);

    let first = words.iter().position(|(_, word)| is_name_word(word))?;
    let last = words.iter().rposition(|(_, word)| is_name_word(word))?;
    if last <= first {
        return None;
    }

    let (last_offset, last_word) = words[last];
    Some((words[first].0, last_offset + last_word.len()))
}

fn trailing_title(after_name: &str) -> Option<String> {
    let pattern = TRAILING_TITLE.get_or_init(|| {
        Regex::new(r"^\s*(?:,|\s[-–])\s*([^,\n.;:()]+)").expect("trailing title pattern")
    });

    let candidate = pattern.captures(after_name)?.get(1)?.as_str().trim();
    let words = candidate.split_whitespace().count();
    let first_word = candidate
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();
    let looks_like_contact_channel = matches!(
        first_word.as_str(),
        "tel" | "telefon" | "tfn" | "mobil" | "mail" | "mejl" | "e-post" | "epost"
    );

    if words == 0
        || words > 6
        || looks_like_contact_channel
        || candidate.contains('@')
        || candidate.chars().any(|c| c.is_ascii_digit())
    {
        return None;
    }

    Some(candidate.to_string())
}

fn leading_title(before_name: &str) -> Option<String> {
    let pattern = LEADING_TITLE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:\p{L}+\s+)?(?:[\p{L}-]*(?:chef|ansvarig|direktör|rekryterare|specialist|koordinator|ledare|ägare|konsult|rektor)\p{L}*|vd|hr)\b",
        )
        .expect("leading title pattern")
    });

    let found = pattern.find_iter(before_name).last()?;
    let mut words: Vec<&str> = found.as_str().split_whitespace().collect();
    if words.len() > 1
        && matches!(
            words[0].to_lowercase().as_str(),
            "vår" | "vårt" | "våra" | "er" | "din" | "av" | "till" | "med" | "är" | "om"
                | "kontakta" | "kontakt" | "kontaktperson" | "lämnas" | "ring" | "mejla"
        )
    {
        words.remove(0);
    }

    Some(words.join(" "))
}

fn phone_patterns() -> &'static [Regex] {
    PHONE_PATTERNS.get_or_init(|| {
        [
            r"\b\d{2,4}[-\s]?\d{5,}",
            r"\b0\d{1,3}[-\s]?\d{2,3}[\s-]\d{2}[\s-]\d{2}\b",
            r"\+46[\s-]?\d{1,3}[\s-]?\d{2,3}[\s-]?\d{2}[\s-]?\d{2}\b",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("phone pattern"))
        .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_phone_numbers_in_common_formats() {
        assert_eq!(
            find_phone("Ring 08-123456 för info").as_deref(),
            Some("08-123456")
        );
        assert_eq!(
            find_phone("Mobil 0701234567 dagtid").as_deref(),
            Some("0701234567")
        );
        assert_eq!(
            find_phone("Nås på 070-123 45 67 vardagar").as_deref(),
            Some("070-123 45 67")
        );
        assert_eq!(
            find_phone("Tel: +46 70 123 45 67").as_deref(),
            Some("+46 70 123 45 67")
        );
    }

    #[test]
    fn ignores_dates_and_org_numbers() {
        assert_eq!(find_phone("Sista ansökningsdag 2025-01-31"), None);
        assert_eq!(find_phone("Org.nr 556123-4567"), None);
        assert_eq!(find_phone(""), None);
    }

    #[test]
    fn earliest_phone_wins() {
        assert_eq!(
            find_phone("Växel 08-123456, direkt 070-123 45 67").as_deref(),
            Some("08-123456")
        );
    }

    #[test]
    fn detects_union_mentions_case_insensitively() {
        assert!(mentions_union("Fackliga företrädare: Kommunal"));
        assert!(mentions_union("Kontakta UNIONEN för frågor"));
        assert!(mentions_union("Vårdförbundet nås på 08-123456"));
        assert!(!mentions_union("Välkommen med din ansökan"));
    }

    #[test]
    fn extracts_contact_with_trailing_title() {
        let person = find_contact_person(
            "Vi söker dig!\nKontaktperson: Anna Svensson, HR-specialist, 070-123 45 67",
        )
        .expect("contact found");
        assert_eq!(person.name, "Anna Svensson");
        assert_eq!(person.title.as_deref(), Some("HR-specialist"));
    }

    #[test]
    fn extracts_contact_with_leading_title() {
        let person = find_contact_person("För frågor kontakta rekryterande chef Per Olsson på 08-123456.")
            .expect("contact found");
        assert_eq!(person.name, "Per Olsson");
        assert_eq!(person.title.as_deref(), Some("rekryterande chef"));
    }

    #[test]
    fn anchor_word_is_not_part_of_leading_title() {
        let person = find_contact_person("För frågor kontakta platschef Per Olsson på 0701234567.")
            .expect("contact found");
        assert_eq!(person.title.as_deref(), Some("platschef"));
    }

    #[test]
    fn trailing_phone_is_not_a_title() {
        let person = find_contact_person("Upplysningar lämnas av Karin Berg-Lund, tel 070-1234567")
            .expect("contact found");
        assert_eq!(person.name, "Karin Berg-Lund");
        assert!(person.title.is_none());
    }

    #[test]
    fn stopwords_around_names_are_dropped() {
        let person = find_contact_person("Kontakt Via Maria Holm Tel 08-123456")
            .expect("contact found");
        assert_eq!(person.name, "Maria Holm");
    }

    #[test]
    fn name_after_a_run_of_stopwords_is_found() {
        let person = find_contact_person("Kontakt Via Mail Maria Holm")
            .expect("contact found");
        assert_eq!(person.name, "Maria Holm");

        let person = find_contact_person("Frågor: Tel Eller Mail Anna Ek, rektor")
            .expect("contact found");
        assert_eq!(person.name, "Anna Ek");
        assert_eq!(person.title.as_deref(), Some("rektor"));
    }

    #[test]
    fn no_contact_without_keyword_or_name() {
        assert!(find_contact_person("Anna Svensson är vår kock.").is_none());
        assert!(find_contact_person("Kontakta oss gärna via mejl.").is_none());
    }

    #[test]
    fn extract_contact_combines_all_fields() {
        let details = extract_contact(
            "Kontaktperson: Lisa Ek, enhetschef. Ring 08-123456. Facklig kontakt: Vision.",
        );
        assert_eq!(details.phone.as_deref(), Some("08-123456"));
        assert_eq!(details.contact_name.as_deref(), Some("Lisa Ek"));
        assert_eq!(details.contact_title.as_deref(), Some("enhetschef"));
        assert!(details.union_mention);
    }
}
