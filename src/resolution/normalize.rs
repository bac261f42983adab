use unicode_normalization::UnicodeNormalization;

fn greek_name(c: char) -> Option<&'static str> {
    let name = match c {
        'α' | 'Α' => "alpha",
        'β' | 'Β' | 'ϐ' => "beta",
        'γ' | 'Γ' => "gamma",
        'δ' | 'Δ' => "delta",
        'ε' | 'Ε' | 'ϵ' => "epsilon",
        'ζ' | 'Ζ' => "zeta",
        'η' | 'Η' => "eta",
        'θ' | 'Θ' | 'ϑ' => "theta",
        'ι' | 'Ι' => "iota",
        'κ' | 'Κ' | 'ϰ' => "kappa",
        'λ' | 'Λ' => "lambda",
        'μ' | 'Μ' | 'µ' => "mu",
        'ν' | 'Ν' => "nu",
        'ξ' | 'Ξ' => "xi",
        'ο' | 'Ο' => "omicron",
        'π' | 'Π' => "pi",
        'ρ' | 'Ρ' => "rho",
        'σ' | 'ς' | 'Σ' => "sigma",
        'τ' | 'Τ' => "tau",
        'υ' | 'Υ' => "upsilon",
        'φ' | 'Φ' | 'ϕ' => "phi",
        'χ' | 'Χ' => "chi",
        'ψ' | 'Ψ' => "psi",
        'ω' | 'Ω' => "omega",
        _ => return None,
    };
    Some(name)
}

fn roman_to_arabic(token: &str) -> Option<&'static str> {
    let digit = match token {
        "ii" => "2",
        "iii" => "3",
        "iv" => "4",
        "v" => "5",
        "vi" => "6",
        "vii" => "7",
        "viii" => "8",
        "ix" => "9",
        "x" => "10",
        _ => return None,
    };
    Some(digit)
}

fn is_separator(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '-' | '_' | '.' | ',' | ';' | ':' | '/' | '\\' | '|' | '(' | ')' | '[' | ']' | '{'
                | '}' | '\'' | '"' | '`' | '+' | '*' | '!' | '?' | '‐' | '‑' | '–' | '—' | '’'
        )
}

/// Canonical form of an entity label for fuzzy comparison.
///
/// NFC-compose, spell out Greek letters, replace separators with spaces,
/// lower-case, turn standalone roman numerals ii..x into digits and
/// collapse whitespace.
pub fn normalize_label(label: &str) -> String {
    let mut spelled = String::with_capacity(label.len());
    for c in label.nfc() {
        if let Some(name) = greek_name(c) {
            spelled.push_str(name);
        } else if is_separator(c) {
            spelled.push(' ');
        } else {
            spelled.extend(c.to_lowercase());
        }
    }

    spelled
        .split_whitespace()
        .map(|token| roman_to_arabic(token).unwrap_or(token))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_whitespace() {
        assert_eq!(normalize_label("  Cancer "), "cancer");
        assert_eq!(normalize_label("Breast\t  Cancer"), "breast cancer");
    }

    #[test]
    fn test_greek_and_separators() {
        assert_eq!(normalize_label("β-catenin"), "beta catenin");
        assert_eq!(normalize_label("TNF-α"), "tnf alpha");
        assert_eq!(normalize_label("IL_6/JAK"), "il 6 jak");
    }

    #[test]
    fn test_roman_numerals_only_as_tokens() {
        assert_eq!(normalize_label("Type II Diabetes"), "type 2 diabetes");
        assert_eq!(normalize_label("Collagen type IX"), "collagen type 9");
        assert_eq!(normalize_label("vitamin"), "vitamin");
        assert_eq!(normalize_label("Factor I"), "factor i");
    }

    #[test]
    fn test_canonical_composition() {
        let decomposed = "Sjo\u{0308}gren syndrome";
        assert_eq!(normalize_label(decomposed), normalize_label("Sjögren syndrome"));
    }
}
