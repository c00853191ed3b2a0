//! Sort parameter parsing
//!
//! Each raw token has the form `<direction><info separator><path>`, for
//! example `A|name` or `D|owner.town`. Tokens are turned into [`SortSpec`]s in
//! request order. Malformed tokens are skipped, a repeated path keeps only its
//! first occurrence, and the result is capped at `max_sorts`.

use std::collections::HashSet;

use crate::config::SortConfig;
use crate::repository::{OrderDirection, SortSpec};

/// Parse raw sort tokens into an ordered, de-duplicated list
///
/// ```rust
/// use entity_resource::config::SortConfig;
/// use entity_resource::handlers::parse_sorts;
/// use entity_resource::repository::OrderDirection;
///
/// let sorts = parse_sorts(["D|owner.town", "a|name", "A|owner.town"], &SortConfig::default());
/// assert_eq!(sorts.len(), 2);
/// assert_eq!(sorts[0].direction, OrderDirection::Descending);
/// assert_eq!(sorts[0].joined_path(), "owner.town");
/// assert_eq!(sorts[1].direction, OrderDirection::Ascending);
/// ```
pub fn parse_sorts<'a>(
    tokens: impl IntoIterator<Item = &'a str>,
    config: &SortConfig,
) -> Vec<SortSpec> {
    if config.info_separator.is_empty() || config.path_separator.is_empty() {
        tracing::warn!("Sort separators must not be empty, ignoring sort parameters");
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut sorts = Vec::new();

    for token in tokens {
        if sorts.len() >= config.max_sorts {
            break;
        }
        let Some(sort) = parse_token(token, config) else {
            continue;
        };
        if seen.insert(sort.joined_path()) {
            sorts.push(sort);
        }
    }

    sorts
}

fn parse_token(token: &str, config: &SortConfig) -> Option<SortSpec> {
    if token.trim().is_empty() {
        return None;
    }

    let mut parts: Vec<&str> = token.split(config.info_separator.as_str()).collect();
    // Trailing separators are ignored
    while parts.last().is_some_and(|part| part.is_empty()) {
        parts.pop();
    }
    let [direction, path] = parts.as_slice() else {
        tracing::warn!(token, "Ignoring malformed sort parameter");
        return None;
    };

    let direction = if direction.trim().eq_ignore_ascii_case("A") {
        OrderDirection::Ascending
    } else {
        OrderDirection::Descending
    };

    let path: Vec<String> = path
        .split(config.path_separator.as_str())
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect();

    if path.is_empty() {
        tracing::warn!(token, "Ignoring sort parameter without a path");
        return None;
    }

    Some(SortSpec { direction, path })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(sorts: &[SortSpec]) -> Vec<String> {
        sorts.iter().map(SortSpec::joined_path).collect()
    }

    #[test]
    fn test_directions() {
        let sorts = parse_sorts(["A|a", "a|b", "D|c", "x|d", "|e"], &SortConfig {
            max_sorts: 10,
            ..SortConfig::default()
        });
        let directions: Vec<OrderDirection> = sorts.iter().map(|s| s.direction).collect();
        assert_eq!(
            directions,
            vec![
                OrderDirection::Ascending,
                OrderDirection::Ascending,
                OrderDirection::Descending,
                OrderDirection::Descending,
                OrderDirection::Descending,
            ]
        );
    }

    #[test]
    fn test_malformed_tokens_are_skipped() {
        let sorts = parse_sorts(
            ["", "   ", "name", "A|b|c", "A|", "A| . .", "D|owner. town "],
            &SortConfig::default(),
        );
        assert_eq!(paths(&sorts), vec!["owner.town"]);
        assert_eq!(sorts[0].path, vec!["owner".to_string(), "town".to_string()]);
    }

    #[test]
    fn test_trailing_separators_are_ignored() {
        let sorts = parse_sorts(["A|name|", "D|town||"], &SortConfig::default());
        assert_eq!(paths(&sorts), vec!["name", "town"]);
        assert_eq!(sorts[0].direction, OrderDirection::Ascending);
        assert_eq!(sorts[1].direction, OrderDirection::Descending);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let sorts = parse_sorts(["A|name", "D|age", "D|name"], &SortConfig::default());
        assert_eq!(paths(&sorts), vec!["name", "age"]);
        assert_eq!(sorts[0].direction, OrderDirection::Ascending);
    }

    #[test]
    fn test_capped_at_max_sorts_after_dedup() {
        let sorts = parse_sorts(
            ["A|a", "A|a", "A|b", "A|c", "A|d"],
            &SortConfig::default(),
        );
        assert_eq!(paths(&sorts), vec!["a", "b", "c"]);

        let none = parse_sorts(["A|a"], &SortConfig {
            max_sorts: 0,
            ..SortConfig::default()
        });
        assert!(none.is_empty());
    }

    #[test]
    fn test_custom_separators() {
        let config = SortConfig {
            info_separator: ":".to_string(),
            path_separator: "/".to_string(),
            ..SortConfig::default()
        };
        let sorts = parse_sorts(["a:owner/town", "A|name"], &config);
        assert_eq!(paths(&sorts), vec!["owner.town"]);
    }

    #[test]
    fn test_empty_separator_disables_sorting() {
        let config = SortConfig {
            info_separator: String::new(),
            ..SortConfig::default()
        };
        assert!(parse_sorts(["A|name"], &config).is_empty());
    }
}
