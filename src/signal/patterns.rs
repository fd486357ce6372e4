use once_cell::sync::Lazy;
use regex::Regex;

use crate::field::field_types::FieldType;

/// One row of a pattern table. Rows are tried in order; first hit wins.
pub struct PatternRule {
    pub pattern: Regex,
    pub field_type: FieldType,
}

/// A successful table lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch {
    pub field_type: FieldType,
    pub pattern: String,
}

fn table(rows: &[(&str, FieldType)]) -> Vec<PatternRule> {
    rows.iter()
        .map(|(source, field_type)| PatternRule {
            pattern: Regex::new(&format!("(?i){}", source))
                .expect("pattern table entries are valid regexes"),
            field_type: *field_type,
        })
        .collect()
}

/// Machine identifiers: name/id attributes, class names, data-* values.
pub static NAME_ID_PATTERNS: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    table(&[
        (r"first[_-]?name|fname|given[_-]?name", FieldType::FirstName),
        (r"last[_-]?name|lname|family[_-]?name|surname", FieldType::LastName),
        (r"^name$|full[_-]?name|your[_-]?name", FieldType::FullName),
        (r"e[_-]?mail", FieldType::Email),
        (r"phone|mobile|tel(?:ephone)?", FieldType::Phone),
        (r"linkedin", FieldType::LinkedinUrl),
        (r"portfolio", FieldType::PortfolioUrl),
        (r"website|personal[_-]?url|home[_-]?page", FieldType::WebsiteUrl),
        (r"resume|cv", FieldType::ResumeUpload),
        (r"cover[_-]?letter", FieldType::CoverLetterText),
        (r"^location$|^city$|address[_-]?line", FieldType::Location),
        (r"^city$", FieldType::City),
        (r"^state$|^province$|^region$", FieldType::State),
        (r"zip[_-]?code|postal[_-]?code", FieldType::ZipCode),
        (r"^country$", FieldType::Country),
        (r"salary|compensation|pay[_-]?rate", FieldType::Salary),
        (r"years?[_-]?(of[_-]?)?experience|yoe", FieldType::YearsExperience),
        (r"education|degree|university|school", FieldType::Education),
        (r"start[_-]?date|available|availability", FieldType::StartDate),
        (r"current[_-]?company|employer", FieldType::CurrentCompany),
        (r"current[_-]?title|job[_-]?title|position", FieldType::CurrentTitle),
        (r"work[_-]?auth|authorized", FieldType::WorkAuthorization),
        (r"sponsor", FieldType::SponsorshipRequired),
        (r"gender|sex\b", FieldType::EeoGender),
        (r"race|ethnic", FieldType::EeoRaceEthnicity),
        (r"veteran", FieldType::EeoVeteranStatus),
        (r"disabilit", FieldType::EeoDisabilityStatus),
    ])
});

/// Human prose: label, aria-label and placeholder text.
pub static LABEL_PATTERNS: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    table(&[
        (r"first\s*name", FieldType::FirstName),
        (r"last\s*name|family\s*name|surname", FieldType::LastName),
        (r"^name\s*\*?$|full\s*name", FieldType::FullName),
        (r"e-?mail", FieldType::Email),
        (r"phone|mobile|telephone", FieldType::Phone),
        (r"linkedin", FieldType::LinkedinUrl),
        (r"portfolio", FieldType::PortfolioUrl),
        (r"website|personal.*url|home\s*page", FieldType::WebsiteUrl),
        (r"resume|cv\b", FieldType::ResumeUpload),
        (r"cover\s*letter", FieldType::CoverLetterText),
        (r"^location|^city|address", FieldType::Location),
        (r"^city\s*\*?$", FieldType::City),
        (r"^state\s*\*?$|^province", FieldType::State),
        (r"zip\s*code|postal\s*code", FieldType::ZipCode),
        (r"^country\s*\*?$", FieldType::Country),
        (r"salary|compensation|desired\s*pay", FieldType::Salary),
        (r"years?\s*(of\s*)?experience", FieldType::YearsExperience),
        (r"education|degree|university|school", FieldType::Education),
        (r"start\s*date|earliest.*start|available|when.*start", FieldType::StartDate),
        (r"current\s*(company|employer)", FieldType::CurrentCompany),
        (r"current\s*title|job\s*title", FieldType::CurrentTitle),
        (r"authorized.*work|work.*authori[sz]", FieldType::WorkAuthorization),
        (r"sponsor", FieldType::SponsorshipRequired),
        (r"gender|sex\b", FieldType::EeoGender),
        (r"race|ethnic", FieldType::EeoRaceEthnicity),
        (r"veteran", FieldType::EeoVeteranStatus),
        (r"disabilit", FieldType::EeoDisabilityStatus),
    ])
});

/// Section headings only nudge toward a representative type of the section.
pub static SECTION_PATTERNS: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    table(&[
        (r"personal\s*info|contact\s*info|your\s*info", FieldType::FirstName),
        (r"equal\s*opportunity|eeo|voluntary|self[_-]?id", FieldType::EeoGender),
        (r"education|academic", FieldType::Education),
        (r"work\s*experience|employment|professional", FieldType::CurrentCompany),
    ])
});

/// Last token of an `autocomplete` hint → field type.
pub fn autocomplete_type(token: &str) -> Option<FieldType> {
    let field_type = match token {
        "given-name" => FieldType::FirstName,
        "family-name" => FieldType::LastName,
        "name" => FieldType::FullName,
        "email" => FieldType::Email,
        "tel" | "tel-national" => FieldType::Phone,
        "street-address" | "address-line1" => FieldType::Address,
        "address-level2" => FieldType::City,
        "address-level1" => FieldType::State,
        "postal-code" => FieldType::ZipCode,
        "country" | "country-name" => FieldType::Country,
        "url" => FieldType::WebsiteUrl,
        "organization" => FieldType::CurrentCompany,
        "organization-title" => FieldType::CurrentTitle,
        _ => return None,
    };
    Some(field_type)
}

/// Input kind → field type. Only kinds that pin down a meaning are mapped.
pub fn input_kind_type(kind: &str) -> Option<FieldType> {
    match kind {
        "email" => Some(FieldType::Email),
        "tel" => Some(FieldType::Phone),
        "url" => Some(FieldType::WebsiteUrl),
        "file" => Some(FieldType::ResumeUpload),
        _ => None,
    }
}

/// Strip required-markers and colons, then test rows in order.
pub fn match_patterns(text: &str, rules: &[PatternRule]) -> Option<PatternMatch> {
    let cleaned: String = text.chars().filter(|c| *c != '*' && *c != ':').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    rules
        .iter()
        .find(|rule| rule.pattern.is_match(cleaned))
        .map(|rule| PatternMatch {
            field_type: rule.field_type,
            pattern: rule
                .pattern
                .as_str()
                .trim_start_matches("(?i)")
                .to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_tables_compile() {
        assert_eq!(NAME_ID_PATTERNS.len(), 27);
        assert_eq!(LABEL_PATTERNS.len(), 27);
        assert_eq!(SECTION_PATTERNS.len(), 4);
    }

    #[test]
    fn required_marker_and_colon_are_ignored() {
        let hit = match_patterns("Name *:", &LABEL_PATTERNS).unwrap();
        assert_eq!(hit.field_type, FieldType::FullName);
    }

    #[test]
    fn blank_text_never_matches() {
        assert!(match_patterns(" *: ", &LABEL_PATTERNS).is_none());
    }

    #[test]
    fn first_row_wins() {
        // "city" hits the location row before the dedicated city row
        let hit = match_patterns("city", &NAME_ID_PATTERNS).unwrap();
        assert_eq!(hit.field_type, FieldType::Location);
        assert_eq!(hit.pattern, "^location$|^city$|address[_-]?line");
    }
}
