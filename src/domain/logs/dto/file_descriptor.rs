use serde::{Deserialize, Serialize};

use crate::core::util::bytes_formatter::format_bytes;

/// One file within a route, as streamed by the route listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Timestamp string as sent by the server, not validated.
    pub last_modified: String,
}

impl FileDescriptor {
    pub fn display_size(&self) -> String {
        format_bytes(self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let json = r#"{"name":"pod-1.log","size":2048,"lastModified":"2024-01-02T03:04:05Z"}"#;
        let fd: FileDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(fd.name, "pod-1.log");
        assert_eq!(fd.size, 2048);
        assert_eq!(fd.last_modified, "2024-01-02T03:04:05Z");
        assert_eq!(fd.display_size(), "2 Kb");
    }

    #[test]
    fn test_negative_size_rejected() {
        let json = r#"{"name":"x","size":-1,"lastModified":""}"#;
        assert!(serde_json::from_str::<FileDescriptor>(json).is_err());
    }
}
