/// Next default name for a new row: `base` followed by one more than the
/// largest number already used directly after `base`.
///
/// Only names of the exact form `<base><digits>` count; anything else is
/// ignored. With no match the result is `<base>1`.
///
/// ```
/// use ridecheck_core::naming::next_default;
/// assert_eq!(next_default("Worker", ["Worker1", "Worker3", "Alex"]), "Worker4");
/// ```
pub fn next_default<I, S>(base: &str, names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let max = names
        .into_iter()
        .filter_map(|name| trailing_number(base, name.as_ref()))
        .max()
        .unwrap_or(0);
    format!("{base}{}", max.saturating_add(1))
}

fn trailing_number(base: &str, name: &str) -> Option<u64> {
    let suffix = name.strip_prefix(base)?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_existing_names() {
        assert_eq!(next_default("Day", Vec::<String>::new()), "Day1");
    }

    #[test]
    fn takes_maximum_suffix_not_count() {
        assert_eq!(next_default("Ride", ["Ride7", "Ride2"]), "Ride8");
    }

    #[test]
    fn ignores_non_matching_names() {
        let names = ["Worker", "Worker2b", "worker9", "XWorker5", "Worker 3", "Worker2"];
        assert_eq!(next_default("Worker", names), "Worker3");
    }

    #[test]
    fn leading_zeros_are_numeric() {
        assert_eq!(next_default("Day", ["Day007"]), "Day8");
    }

    #[test]
    fn suffix_too_large_to_parse_is_ignored() {
        assert_eq!(next_default("Day", ["Day99999999999999999999999", "Day4"]), "Day5");
    }

    #[test]
    fn base_with_regex_metacharacters_is_literal() {
        assert_eq!(next_default("R.", ["R.4", "RX5"]), "R.5");
    }
}
