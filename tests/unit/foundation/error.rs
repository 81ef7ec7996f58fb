use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SearchVizError::precondition("x")
            .to_string()
            .contains("precondition violation:")
    );
    assert!(
        SearchVizError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(SearchVizError::media("x").to_string().contains("media error:"));
    assert!(
        SearchVizError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(
        SearchVizError::mark_invariant("x")
            .to_string()
            .contains("mark invariant violated:")
    );
}

#[test]
fn out_of_range_reports_index_and_len() {
    let err = SearchVizError::IndexOutOfRange { index: -1, len: 4 };
    assert_eq!(
        err.to_string(),
        "index -1 out of range for array of length 4"
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SearchVizError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde() {
    let parse = serde_json::from_str::<u32>("nope").unwrap_err();
    let err = SearchVizError::from(parse);
    assert!(matches!(err, SearchVizError::Serde(_)));
}
