use anyhow::Context;
use httpmock::prelude::*;
use hurricane_etl::{
    CliConfig, EtlEngine, EtlError, HurricanePipeline, LlmError, PipelineOutcome, Stage,
};
use tempfile::TempDir;

const SEASON_PAGE: &str = r#"
<html><body>
  <table class="infobox">
    <tr><th>First system formed</th><td class="infobox-data">June 1, 1975</td></tr>
    <tr><th>Total fatalities</th><td class="infobox-data">30 total</td></tr>
  </table>
  <p>Hurricane Agatha formed on July 2 and brushed Acapulco.</p>
  <p>Hurricane Olivia struck Mazatlán on October 25, killing 30.</p>
</body></html>
"#;

const REPLY: &str = "Name: Hurricane Agatha, Start: July 2, End: July 6, Deaths: 25, Affected Areas: Acapulco, Pacific Ocean\n\
\n\
Name: Hurricane Olivia, Start: October 22, End: October 25, Deaths: 30, Affected Areas: Mazatlán\n\
Note: Tropical Depressions were excluded.\n";

fn config_for(server: &MockServer, output_path: &str) -> CliConfig {
    CliConfig {
        source_url: server.url("/wiki/1975_Pacific_hurricane_season"),
        fetch_timeout_secs: 10,
        output_path: output_path.to_string(),
        output_file: "hurricanes_1975.csv".to_string(),
        model: "gpt-4".to_string(),
        api_base_url: server.url("/v1"),
        api_key: Some("sk-test".to_string()),
        llm_timeout_secs: None,
        season_year: 1975,
        config: None,
        verbose: false,
        log_json: false,
    }
}

fn chat_reply(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 100, "completion_tokens": 40, "total_tokens": 140}
    })
}

#[tokio::test]
async fn test_end_to_end_writes_csv() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir
        .path()
        .to_str()
        .context("temp dir path is not UTF-8")?
        .to_string();

    let server = MockServer::start();
    let page_mock = server.mock(|when, then| {
        when.method(GET).path("/wiki/1975_Pacific_hurricane_season");
        then.status(200)
            .header("Content-Type", "text/html; charset=UTF-8")
            .body(SEASON_PAGE);
    });
    let llm_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .header("Authorization", "Bearer sk-test")
            .json_body_partial(r#"{"model": "gpt-4", "temperature": 0.0}"#)
            .body_contains("You are an assistant for extracting hurricane data.")
            .body_contains("brushed Acapulco.")
            .body_contains("June 1, 1975 30 total");
        then.status(200).json_body(chat_reply(REPLY));
    });

    let config = config_for(&server, &output_path);
    let pipeline = HurricanePipeline::from_config(&config)?;
    let engine = EtlEngine::new(pipeline);

    let outcome = engine.run().await;

    page_mock.assert();
    llm_mock.assert();

    match outcome {
        PipelineOutcome::Completed {
            records_written,
            rejected_lines,
            ..
        } => {
            assert_eq!(records_written, 2);
            assert_eq!(rejected_lines, 1);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let full_path = temp_dir.path().join("hurricanes_1975.csv");
    assert!(full_path.exists());

    let mut reader = csv::Reader::from_path(&full_path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    assert_eq!(
        headers,
        vec![
            "hurricane_storm_name",
            "date_start",
            "date_end",
            "number_of_deaths",
            "list_of_areas_affected"
        ]
    );

    let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0].iter().collect::<Vec<_>>(),
        vec![
            "Hurricane Agatha",
            "July 2",
            "July 6",
            "25",
            "['Acapulco', 'Pacific Ocean']"
        ]
    );
    assert_eq!(&rows[1][0], "Hurricane Olivia");
    assert_eq!(&rows[1][4], "['Mazatlán']");
    Ok(())
}

#[tokio::test]
async fn test_page_failure_never_calls_llm() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let page_mock = server.mock(|when, then| {
        when.method(GET).path("/wiki/1975_Pacific_hurricane_season");
        then.status(503);
    });
    let llm_mock = server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(chat_reply(REPLY));
    });

    let config = config_for(&server, &output_path);
    let engine = EtlEngine::new(HurricanePipeline::from_config(&config).unwrap());

    let outcome = engine.run().await;

    page_mock.assert();
    llm_mock.assert_hits(0);
    assert_eq!(outcome.aborted_at(), Some(Stage::Fetch));
    assert!(matches!(
        outcome,
        PipelineOutcome::Aborted {
            error: Some(EtlError::HttpStatus { status: 503, .. }),
            ..
        }
    ));
    assert!(!temp_dir.path().join("hurricanes_1975.csv").exists());
}

#[tokio::test]
async fn test_llm_auth_failure_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/wiki/1975_Pacific_hurricane_season");
        then.status(200).body(SEASON_PAGE);
    });
    let llm_mock = server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(401)
            .json_body(serde_json::json!({"error": {"message": "Incorrect API key provided"}}));
    });

    let config = config_for(&server, &output_path);
    let engine = EtlEngine::new(HurricanePipeline::from_config(&config).unwrap());

    let outcome = engine.run().await;

    llm_mock.assert_hits(1);
    assert_eq!(outcome.aborted_at(), Some(Stage::RequestLlm));
    match &outcome {
        PipelineOutcome::Aborted { error: Some(e), .. } => {
            assert!(matches!(e, EtlError::LlmError(LlmError::Authentication(_))));
            assert!(e.recovery_suggestion().contains("API key"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(!temp_dir.path().join("hurricanes_1975.csv").exists());
}

#[tokio::test]
async fn test_unparseable_reply_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/wiki/1975_Pacific_hurricane_season");
        then.status(200).body(SEASON_PAGE);
    });
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200)
            .json_body(chat_reply("Sorry, I can't help with that."));
    });

    let config = config_for(&server, &output_path);
    let engine = EtlEngine::new(HurricanePipeline::from_config(&config).unwrap());

    let outcome = engine.run().await;

    assert_eq!(outcome.aborted_at(), Some(Stage::ParseReply));
    assert!(!temp_dir.path().join("hurricanes_1975.csv").exists());
}

#[tokio::test]
async fn test_unwritable_output_is_reported_as_write_abort() {
    let temp_dir = TempDir::new().unwrap();
    // 以檔案佔住輸出目錄的位置，使寫入失敗
    let blocker = temp_dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"occupied").unwrap();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/wiki/1975_Pacific_hurricane_season");
        then.status(200).body(SEASON_PAGE);
    });
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(chat_reply(REPLY));
    });

    let config = config_for(&server, blocker.to_str().unwrap());
    let engine = EtlEngine::new(HurricanePipeline::from_config(&config).unwrap());

    match engine.run().await {
        PipelineOutcome::Aborted {
            stage: Stage::Write,
            error: Some(e),
            ..
        } => {
            assert_eq!(
                e.severity(),
                hurricane_etl::utils::error::ErrorSeverity::Critical
            );
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}
