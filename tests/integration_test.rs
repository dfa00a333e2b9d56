//! Integration tests for study-buddy.

#![allow(clippy::expect_used)]

use study_buddy::core::{Course, CourseQuery, Flashcard, Summary};
use study_buddy::storage::{SqliteStorage, Storage};
use tempfile::TempDir;

/// Helper to create a test storage instance.
fn create_test_storage() -> (SqliteStorage, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let mut storage = SqliteStorage::open(&db_path).expect("Failed to create storage");
    storage.init().expect("Failed to init storage");
    (storage, temp_dir)
}

#[test]
fn test_storage_init_and_status() {
    let (storage, _temp) = create_test_storage();

    assert!(storage.is_initialized().expect("is_initialized failed"));

    let stats = storage.stats().expect("stats failed");
    assert_eq!(stats.course_count, 0);
    assert_eq!(stats.flashcard_count, 0);
}

#[test]
fn test_course_lifecycle_on_disk() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("study.db");

    let id = {
        let mut storage = SqliteStorage::open(&db_path).expect("open failed");
        storage.init().expect("init failed");
        let course = Course::new("Chemistry", "Atoms bond.".to_string())
            .with_sources(vec!["atoms".to_string()]);
        let id = storage.add_course(&course).expect("add_course failed");
        storage
            .save_summary(&Summary::new(id, "## Bonds".to_string(), 1200, None, 1))
            .expect("save_summary failed");
        id
    };

    // Reopen to make sure everything was persisted
    let storage = SqliteStorage::open(&db_path).expect("reopen failed");
    let course = storage
        .get_course(id)
        .expect("get_course failed")
        .expect("course should exist");
    assert_eq!(course.sources, vec!["atoms"]);
    let summary = storage
        .get_summary(id)
        .expect("get_summary failed")
        .expect("summary should exist");
    assert_eq!(summary.outline, "## Bonds");
}

#[test]
fn test_flashcards_replace_and_cascade() {
    let (mut storage, _temp) = create_test_storage();
    let id = storage
        .add_course(&Course::new("Geo", "Rivers flow.".to_string()))
        .expect("add_course failed");

    let deck: Vec<_> = (1..=5)
        .map(|i| Flashcard::new(i, &format!("Q{i}"), &format!("A{i}")))
        .collect();
    storage
        .replace_flashcards(id, &deck)
        .expect("replace_flashcards failed");
    assert_eq!(storage.get_flashcards(id).expect("get failed").len(), 5);

    storage.delete_course(id).expect("delete failed");
    assert_eq!(storage.stats().expect("stats failed").flashcard_count, 0);
}

#[test]
fn test_list_courses_paging() {
    let (mut storage, _temp) = create_test_storage();
    for i in 0..30 {
        let mut course = Course::new(&format!("Course {i}"), "x".to_string());
        course.created_at = i;
        storage.add_course(&course).expect("add_course failed");
    }

    let first = storage
        .list_courses(&CourseQuery::default())
        .expect("list failed");
    assert_eq!(first.len(), 25);
    assert_eq!(first[0].name, "Course 29");

    let rest = storage
        .list_courses(&CourseQuery::default().page(25, 25))
        .expect("list failed");
    assert_eq!(rest.len(), 5);
    assert_eq!(rest[4].name, "Course 0");
}

mod extraction_tests {
    use super::*;
    use study_buddy::error::{Error, IoError};
    use study_buddy::io::course_from_files;

    #[test]
    fn test_bundle_text_files_into_course() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let first = temp_dir.path().join("cells.txt");
        let second = temp_dir.path().join("energy.md");
        std::fs::write(&first, "Cells divide.\r\n\r\n\r\n\r\nThey grow.").expect("write failed");
        std::fs::write(&second, "ATP stores energy.").expect("write failed");

        let course = course_from_files(&[&first, &second], None).expect("bundle failed");
        assert_eq!(course.name, "cells & energy");
        assert_eq!(course.sources, vec!["cells", "energy"]);
        assert_eq!(
            course.content,
            "=== FILE: cells ===\nCells divide.\n\nThey grow.\n\n=== FILE: energy ===\nATP stores energy."
        );
    }

    fn write_docx(path: &std::path::Path, paragraphs: &[&str]) {
        use std::io::Write;
        use zip::write::SimpleFileOptions;

        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
            .collect();
        let xml = format!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );

        let file = std::fs::File::create(path).expect("create failed");
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .expect("start_file failed");
        writer.write_all(xml.as_bytes()).expect("write failed");
        writer.finish().expect("finish failed");
    }

    #[test]
    fn test_bundle_docx_with_text() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let essay = temp_dir.path().join("essay.docx");
        let notes = temp_dir.path().join("notes.txt");
        write_docx(&essay, &["Osmosis", "Water moves across membranes."]);
        std::fs::write(&notes, "Diffusion is passive.").expect("write failed");

        let course = course_from_files(&[&essay, &notes], Some("Transport")).expect("bundle failed");
        assert_eq!(course.name, "Transport");
        assert_eq!(
            course.content,
            "=== FILE: essay ===\nOsmosis\nWater moves across membranes.\n\n=== FILE: notes ===\nDiffusion is passive."
        );
    }

    #[test]
    fn test_corrupt_pptx_fails_extraction() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("slides.pptx");
        std::fs::write(&path, "not a zip archive").expect("write failed");

        let err = course_from_files(&[&path], None).expect_err("corrupt pptx should fail");
        assert!(matches!(err, Error::Io(IoError::ExtractionFailed { .. })));
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("slides.ppt");
        std::fs::write(&path, "binary").expect("write failed");

        let err = course_from_files(&[&path], None).expect_err("ppt should be rejected");
        assert!(err.to_string().contains(".ppt"));
    }
}

mod pipeline_tests {
    use std::num::NonZeroUsize;
    use study_buddy::error::GenerationError;
    use study_buddy::generation::{ScriptedGenerator, TextGenerator};
    use study_buddy::summarize::{ChunkedSummarizer, SummarizerConfig};

    fn budget(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).expect("non-zero budget")
    }

    #[tokio::test]
    async fn test_short_text_skips_merge() {
        let generator = ScriptedGenerator::with_responses(["## Topic\n- point"]);
        let summarizer = ChunkedSummarizer::new(&generator, SummarizerConfig::default())
            .expect("summarizer");

        let text = "y".repeat(500);
        let outcome = summarizer
            .summarize_detailed(&text, None, budget(1200))
            .await
            .expect("summarize failed");

        assert_eq!(outcome.chunk_count, 1);
        assert!(!outcome.merged);
        assert_eq!(generator.call_count(), 1);
        assert_eq!(generator.calls()[0].text, text);
    }

    #[tokio::test]
    async fn test_long_text_is_chunked_and_merged() {
        let generator = ScriptedGenerator::from_fn(|instruction, text| {
            if instruction.starts_with("You merge") {
                Ok(format!("## Merged\n- {} lines in", text.lines().count()))
            } else {
                Ok(format!("## Part\n- {} chars", text.chars().count()))
            }
        });
        let summarizer = ChunkedSummarizer::new(&generator, SummarizerConfig::default())
            .expect("summarizer");

        let text = "z".repeat(30_000);
        let outcome = summarizer
            .summarize_detailed(&text, Some("focus on z"), budget(1200))
            .await
            .expect("summarize failed");

        assert_eq!(outcome.chunk_count, 3);
        assert!(outcome.merged);
        assert_eq!(outcome.outline, "## Merged\n- 6 lines in");

        let calls = generator.calls();
        assert_eq!(calls.len(), 4);
        let lengths: Vec<_> = calls[..3].iter().map(|c| c.text.chars().count()).collect();
        assert_eq!(lengths, [12_000, 12_000, 6_000]);
        assert!(calls[0].instruction.contains("part 1 of 3"));
        assert!(calls[2].instruction.contains("part 3 of 3"));
        assert!(calls.iter().all(|c| c.instruction.contains("focus on z")));
        assert_eq!(calls[3].text.lines().count(), 6);
    }

    #[tokio::test]
    async fn test_outline_trimmed_to_budget() {
        let mut outline = String::from("## Intro\n");
        while outline.chars().count() < 1500 {
            outline.push_str("- a point worth remembering\n");
        }
        let generator = ScriptedGenerator::with_responses([outline]);
        let summarizer = ChunkedSummarizer::new(&generator, SummarizerConfig::default())
            .expect("summarizer");

        let result = summarizer
            .summarize("source", None, budget(1200))
            .await
            .expect("summarize failed");

        assert!(result.chars().count() <= 1200);
        assert!(result.ends_with("remembering"));
    }

    #[tokio::test]
    async fn test_generator_error_propagates_unchanged() {
        let generator = ScriptedGenerator::with_responses(["## First"]);
        generator.push_error(GenerationError::Request("rate limited".to_string()));
        let summarizer = ChunkedSummarizer::new(&generator, SummarizerConfig::default())
            .expect("summarizer");

        let err = summarizer
            .summarize(&"w".repeat(20_000), None, budget(100))
            .await
            .expect_err("second chunk should fail");
        assert_eq!(err, GenerationError::Request("rate limited".to_string()));
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_generator_is_object_safe() {
        let generator: Box<dyn TextGenerator> =
            Box::new(ScriptedGenerator::with_responses(["## Boxed"]));
        let summarizer = ChunkedSummarizer::new(generator.as_ref(), SummarizerConfig::default())
            .expect("summarizer");
        let outline = summarizer
            .summarize("text", None, budget(50))
            .await
            .expect("summarize failed");
        assert_eq!(outline, "## Boxed");
    }
}

mod property_tests {
    use proptest::prelude::*;
    use std::num::NonZeroUsize;
    use study_buddy::chunking::{ChunkSliceExt, Chunker, LineChunker};
    use study_buddy::summarize::{MarkerGrammar, trim_to_budget};

    proptest! {
        #[test]
        fn chunks_reconstruct_text(
            text in "[a-zé \n]{0,3000}",
            max in 10usize..400,
            min_seed in 1usize..400,
        ) {
            let min = min_seed.min(max);
            let chunker = LineChunker::with_min_advance(max, min).expect("valid chunker");
            let chunks = chunker.chunk(&text);

            prop_assert_eq!(chunks.concat_content(), text.clone());
            for chunk in &chunks {
                prop_assert!(chunk.char_count() <= max);
            }

            let len = text.chars().count();
            if len <= max {
                prop_assert_eq!(chunks.len(), 1);
            } else {
                prop_assert!(chunks.len() <= len.div_ceil(min));
            }
        }

        #[test]
        fn trimmed_outline_fits_budget(
            outline in "(## [a-z ]{1,30}\n(- [a-zé ]{1,40}\n){0,5}){0,20}",
            budget in 1usize..1500,
            window in 0usize..200,
        ) {
            let markers = MarkerGrammar::default();
            let budget_nz = NonZeroUsize::new(budget).expect("non-zero budget");
            let trimmed = trim_to_budget(&outline, budget_nz, &markers, window);

            prop_assert!(trimmed.chars().count() <= budget);
            prop_assert!(outline.starts_with(&trimmed));
            if outline.chars().count() <= budget {
                prop_assert_eq!(trimmed, outline);
            }
        }
    }
}

/// CLI command integration tests.
mod cli_tests {
    use study_buddy::cli::{Cli, execute, execute_with};
    use study_buddy::generation::{ScriptedGenerator, TextGenerator};
    use clap::Parser;
    use std::path::Path;
    use tempfile::TempDir;

    /// Helper to parse a command line against a database path.
    fn make_cli(db_path: &Path, args: &[&str]) -> Cli {
        let db = db_path.to_string_lossy().to_string();
        let mut full = vec!["study-buddy", "--db-path", db.as_str()];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).expect("arguments should parse")
    }

    #[tokio::test]
    async fn test_full_study_session() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db = temp_dir.path().join("study.db");
        let notes = temp_dir.path().join("photosynthesis.txt");
        std::fs::write(&notes, "Plants turn light into sugar.\nChlorophyll is green.")
            .expect("write failed");

        execute(&make_cli(&db, &["init"])).await.expect("init failed");
        let added = execute(&make_cli(&db, &["add", notes.to_str().expect("utf-8 path")]))
            .await
            .expect("add failed");
        assert!(added.contains("photosynthesis"));

        let generator = ScriptedGenerator::new();
        generator.push_response("## Light\n- Plants make sugar\n- Chlorophyll is green");
        generator.push_response(
            r#"[{"front":"What colour is chlorophyll?","back":"Green"},{"front":"What do plants make?","back":"Sugar"}]"#,
        );
        let generator: &dyn TextGenerator = &generator;

        let outline = execute_with(&make_cli(&db, &["summarize", "photosynthesis"]), Some(generator))
            .await
            .expect("summarize failed");
        assert!(outline.starts_with("## Light"));

        let cards = execute_with(
            &make_cli(&db, &["flashcards", "generate", "1", "--count", "2"]),
            Some(generator),
        )
        .await
        .expect("flashcards failed");
        assert!(cards.contains("2. What do plants make?"));

        let status = execute(&make_cli(&db, &["--format", "json", "status"]))
            .await
            .expect("status failed");
        let value: serde_json::Value = serde_json::from_str(&status).expect("valid json");
        assert_eq!(value["course_count"], 1);
        assert_eq!(value["summary_count"], 1);
        assert_eq!(value["flashcard_count"], 2);
    }

    #[tokio::test]
    async fn test_summarize_unknown_course() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db = temp_dir.path().join("study.db");
        execute(&make_cli(&db, &["init"])).await.expect("init failed");

        let generator = ScriptedGenerator::new();
        let err = execute_with(
            &make_cli(&db, &["summarize", "Nope"]),
            Some(&generator as &dyn TextGenerator),
        )
        .await
        .expect_err("unknown course");
        assert!(err.to_string().contains("course not found: Nope"));
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_reset_requires_confirmation() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db = temp_dir.path().join("study.db");
        execute(&make_cli(&db, &["init"])).await.expect("init failed");
        execute(&make_cli(&db, &["add", "--text", "notes"]))
            .await
            .expect("add failed");

        assert!(execute(&make_cli(&db, &["reset"])).await.is_err());
        execute(&make_cli(&db, &["reset", "--yes"]))
            .await
            .expect("reset failed");

        let listed = execute(&make_cli(&db, &["list"])).await.expect("list failed");
        assert_eq!(listed, "No courses found.\n");
    }
}
