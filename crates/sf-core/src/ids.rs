//! String identifiers for diagram objects.
//!
//! Component and connection ids are plain strings chosen by the caller.
//! Generated ids follow a `<prefix><n>` scheme so they stay readable in
//! saved files.

/// Next free `<prefix><n>` id, one past the highest numbered id in `ids`.
///
/// Ids that do not carry the prefix, or whose suffix is not a number,
/// are ignored.
pub fn next_id<'a, I>(prefix: &str, ids: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut max = 0u64;
    for id in ids {
        if let Some(num) = id.strip_prefix(prefix)
            && let Ok(value) = num.parse::<u64>()
            && value > max
        {
            max = value;
        }
    }
    format!("{}{}", prefix, max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_id_starts_at_one() {
        assert_eq!(next_id("c", std::iter::empty()), "c1");
    }

    #[test]
    fn next_id_skips_past_highest() {
        let ids = ["c1", "c7", "c3", "conn-1", "cx"];
        assert_eq!(next_id("c", ids), "c8");
    }

    #[test]
    fn next_id_ignores_other_prefixes() {
        let ids = ["conn-4", "c2"];
        assert_eq!(next_id("conn-", ids), "conn-5");
    }
}
