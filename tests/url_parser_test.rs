//! Tests for resolving `<id>` arguments.

use drive_cli::format::preview_url;
use drive_cli::url_parser::extract_id;
use drive_cli::DriveError;

mod accepted {
    use super::*;

    #[test]
    fn urls_printed_by_drive() {
        let cases = [
            "https://drive.google.com/drive/folders/0B1abc-_XYZ",
            "http://drive.google.com/drive/u/1/folders/0B1abc-_XYZ?usp=sharing",
            "https://drive.google.com/file/d/0B1abc-_XYZ/view?usp=sharing",
            "https://drive.google.com/file/d/0B1abc-_XYZ",
            "https://docs.google.com/document/d/0B1abc-_XYZ/edit",
            "https://drive.google.com/open?id=0B1abc-_XYZ",
            "https://drive.google.com/uc?export=download&id=0B1abc-_XYZ",
        ];
        for url in cases {
            assert_eq!(extract_id(url).unwrap(), "0B1abc-_XYZ", "{}", url);
        }
    }

    #[test]
    fn share_output_round_trips() {
        // `share` prints a preview link; it must be usable as an argument again.
        assert_eq!(extract_id(&preview_url("0B1abc")).unwrap(), "0B1abc");
    }

    #[test]
    fn raw_ids_are_trimmed() {
        assert_eq!(extract_id("abc-123_XYZ").unwrap(), "abc-123_XYZ");
        assert_eq!(extract_id("\t1abc123XYZ\n").unwrap(), "1abc123XYZ");
    }
}

mod rejected {
    use super::*;

    #[test]
    fn blank_input() {
        assert!(extract_id("").is_err());
        assert!(extract_id(" \t\n").is_err());
    }

    #[test]
    fn foreign_or_incomplete_urls() {
        assert!(extract_id("https://example.com/folder/123").is_err());
        assert!(extract_id("https://drive.google.com/drive/").is_err());
        assert!(extract_id("https://drive.google.com/open?id=").is_err());
    }

    #[test]
    fn error_keeps_original_input() {
        match extract_id("abc/123") {
            Err(DriveError::InvalidUrlOrId(input)) => assert_eq!(input, "abc/123"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
