/// Street suffix abbreviations the county search form does not recognise.
const STREET_SUFFIXES: &[(&str, &str)] = &[
    ("LN", "Lane"),
    ("ST", "Street"),
    ("AVE", "Avenue"),
    ("RD", "Road"),
    ("DR", "Drive"),
    ("BLVD", "Boulevard"),
    ("CT", "Court"),
    ("PL", "Place"),
    ("CIR", "Circle"),
    ("TER", "Terrace"),
    ("PKWY", "Parkway"),
    ("HWY", "Highway"),
    ("SQ", "Square"),
    ("EXPY", "Expressway"),
    ("FWY", "Freeway"),
];

/// 將街道縮寫展開為全名，例如 `201 UNION LN` -> `201 UNION Lane`
pub fn expand_street_suffixes(address: &str) -> String {
    address
        .split_whitespace()
        .map(|word| {
            let upper = word.to_uppercase();
            STREET_SUFFIXES
                .iter()
                .find(|(abbr, _)| *abbr == upper)
                .map(|(_, full)| *full)
                .unwrap_or(word)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Capitalise the first letter of every alphabetic run, lowercase the rest.
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_is_alpha = false;
    for ch in text.trim().chars() {
        if ch.is_alphabetic() {
            if previous_is_alpha {
                result.extend(ch.to_lowercase());
            } else {
                result.extend(ch.to_uppercase());
            }
            previous_is_alpha = true;
        } else {
            result.push(ch);
            previous_is_alpha = false;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_street_suffixes() {
        assert_eq!(expand_street_suffixes("201 UNION LN"), "201 UNION Lane");
        assert_eq!(expand_street_suffixes("5 Ocean ave"), "5 Ocean Avenue");
        assert_eq!(
            expand_street_suffixes("1200  HWY 35"),
            "1200 Highway 35"
        );
        assert_eq!(expand_street_suffixes("10 Stanley Rd"), "10 Stanley Road");
    }

    #[test]
    fn test_expand_leaves_unknown_words() {
        assert_eq!(expand_street_suffixes("77 Main"), "77 Main");
        assert_eq!(expand_street_suffixes(""), "");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("BRIELLE"), "Brielle");
        assert_eq!(title_case("point pleasant beach"), "Point Pleasant Beach");
        assert_eq!(title_case(" wall "), "Wall");
        assert_eq!(title_case("o'neil"), "O'Neil");
    }
}
