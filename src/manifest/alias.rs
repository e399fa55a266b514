/// Default alias for a name: its acronym
///
/// Takes the first letter of every word plus every later upper-case letter,
/// so `"More Food"` and `"MoreFood"` both become `"MF"`. Digits are kept as
/// written (`"Bricks 2"` becomes `"B2"`).
pub fn acronym(name: &str) -> String {
    name.split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|word| !word.is_empty())
        .flat_map(|word| {
            word.chars().enumerate().filter_map(|(i, c)| {
                let keep = if i == 0 {
                    c.is_alphanumeric()
                } else {
                    c.is_uppercase()
                };
                keep.then(|| c.to_ascii_uppercase())
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("More Food", "MF")]
    #[case("MoreFood", "MF")]
    #[case("clashsoft lib", "CL")]
    #[case("Bricks 2", "B2")]
    #[case("more_food-mod", "MFM")]
    #[case("", "")]
    fn acronym_collects_word_initials(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(acronym(name), expected);
    }
}
