//! Snapshot tests for core types

#[cfg(test)]
mod snapshot_tests {
    use crate::{GenerationConfig, RetrievedPassage, Stage, DEFAULT_PROMPT_TEMPLATE};
    use insta::{assert_snapshot, assert_yaml_snapshot};
    use serde_json::json;

    #[test]
    fn test_retrieved_passage_snapshot() {
        let mut metadata = crate::Metadata::new();
        metadata.insert("chunk_index".to_string(), json!(3));
        metadata.insert("source".to_string(), json!("data.md"));

        let passage = RetrievedPassage {
            text: "Chapter 12: The End.".to_string(),
            score: 0.5,
            metadata,
        };

        assert_yaml_snapshot!(passage, @r###"
        text: "Chapter 12: The End."
        score: 0.5
        metadata:
          chunk_index: 3
          source: data.md
        "###);
    }

    #[test]
    fn test_default_template_snapshot() {
        assert_snapshot!(DEFAULT_PROMPT_TEMPLATE, @r###"
        Answer the question based only on the following context:

        {context}

        ---

        Answer the question based on the above context: {question}
        "###);
    }

    #[test]
    fn test_generation_config_default() {
        let config = GenerationConfig::default();
        assert!(config.is_default());

        let tuned = GenerationConfig {
            temperature: Some(0.2),
            ..Default::default()
        };
        assert!(!tuned.is_default());
    }

    #[test]
    fn test_stage_names() {
        let names: Vec<String> = [
            Stage::Loaded,
            Stage::Chunked,
            Stage::Indexed,
            Stage::Retrieved,
            Stage::Assembled,
            Stage::Answered,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        assert_eq!(
            names,
            ["loading", "chunking", "indexing", "retrieving", "assembling", "answering"]
        );
    }
}
