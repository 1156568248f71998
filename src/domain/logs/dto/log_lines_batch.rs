use serde::Serialize;

/// Result of one tail poll.
///
/// `count` is the number of newline-delimited records seen in the response,
/// blank and single-character ones included. `content` holds only the lines
/// longer than one character. Callers advance their offset by `count`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogLinesBatch {
    pub content: Vec<String>,
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl LogLinesBatch {
    pub fn new(last_modified: Option<String>) -> Self {
        Self {
            content: Vec::new(),
            count: 0,
            last_modified,
        }
    }

    /// Counts every candidate line; keeps it only if longer than one UTF-16
    /// code unit, so a lone astral character such as an emoji is kept.
    pub fn push_candidate(&mut self, line: String) {
        self.count += 1;
        if line.encode_utf16().count() > 1 {
            self.content.push(line);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_includes_filtered_lines() {
        let mut batch = LogLinesBatch::new(None);
        for line in ["", "a", "bb", "ccccc", "", "ddd"] {
            batch.push_candidate(line.to_string());
        }
        assert_eq!(batch.count, 6);
        assert_eq!(batch.content, vec!["bb", "ccccc", "ddd"]);
    }

    #[test]
    fn test_length_is_measured_in_utf16_units() {
        let mut batch = LogLinesBatch::new(None);
        batch.push_candidate("é".to_string());
        batch.push_candidate("éé".to_string());
        batch.push_candidate("🚀".to_string());
        assert_eq!(batch.count, 3);
        assert_eq!(batch.content, vec!["éé", "🚀"]);
    }
}
