use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Section;

/// An immutable, published snapshot of a page's sections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    /// Monotonically increasing, assigned at publish time
    pub version_index: u32,

    pub published_at: DateTime<Utc>,

    pub sections: Vec<Section>,
}

/// Index the next published version will receive
pub fn next_version_index(history: &[Version]) -> u32 {
    history.last().map(|v| v.version_index + 1).unwrap_or(1)
}

/// Append a new version snapshot. Versions are append-only; callers must
/// never renumber or remove existing entries.
pub fn append_version(history: &mut Vec<Version>, sections: Vec<Section>) -> Version {
    let version = Version {
        version_index: next_version_index(history),
        published_at: Utc::now(),
        sections,
    };
    history.push(version.clone());
    version
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Section;

    #[test]
    fn test_first_version_index_is_one() {
        assert_eq!(next_version_index(&[]), 1);
    }

    #[test]
    fn test_indices_increase_monotonically() {
        let mut history = Vec::new();

        let v1 = append_version(&mut history, vec![Section::new("s-1", "hero")]);
        let v2 = append_version(&mut history, vec![]);
        let v3 = append_version(&mut history, vec![Section::new("s-2", "footer")]);

        assert_eq!(v1.version_index, 1);
        assert_eq!(v2.version_index, 2);
        assert_eq!(v3.version_index, 3);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_append_leaves_prior_versions_untouched() {
        let mut history = Vec::new();
        append_version(&mut history, vec![Section::new("s-1", "hero")]);
        let before = history.clone();

        append_version(&mut history, vec![Section::new("s-2", "footer")]);

        assert_eq!(&history[..1], &before[..]);
    }
}
