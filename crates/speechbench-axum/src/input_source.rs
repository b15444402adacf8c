//! Resolves a `CreateRun` request's `input_source` into plain input texts
//! (§6: "direct text OR script ids OR pasted batch in {txt|jsonl|csv} with
//! recognized keys text/prompt/sentence").

use speechbench_core::ports::ScriptRepository;

use crate::dto::{BatchFormat, InputSource};
use crate::error::HttpError;

const RECOGNIZED_KEYS: [&str; 3] = ["text", "prompt", "sentence"];

pub async fn resolve_input_texts(
    source: &InputSource,
    scripts: &dyn ScriptRepository,
) -> Result<Vec<String>, HttpError> {
    match source {
        InputSource::Direct { texts } => Ok(texts.clone()),
        InputSource::Script { script_id } => {
            let script = scripts.get_script(*script_id).await?;
            Ok(script.input_texts())
        }
        InputSource::Batch { format, content } => parse_batch(*format, content),
    }
}

fn parse_batch(format: BatchFormat, content: &str) -> Result<Vec<String>, HttpError> {
    match format {
        BatchFormat::Txt => Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect()),
        BatchFormat::Jsonl => parse_jsonl(content),
        BatchFormat::Csv => parse_csv(content),
    }
}

fn parse_jsonl(content: &str) -> Result<Vec<String>, HttpError> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line)
                .map_err(|e| HttpError::BadRequest(format!("invalid jsonl line: {e}")))?;
            extract_recognized_key(&value)
                .ok_or_else(|| HttpError::BadRequest("jsonl line missing a text/prompt/sentence key".to_string()))
        })
        .collect()
}

fn extract_recognized_key(value: &serde_json::Value) -> Option<String> {
    RECOGNIZED_KEYS
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(str::to_string))
}

/// Uses the header row's column names to find the input column; falls back
/// to the first column if no recognized header is present.
fn parse_csv(content: &str) -> Result<Vec<String>, HttpError> {
    let mut lines = content.lines();
    let header = lines.next().ok_or_else(|| HttpError::BadRequest("empty csv batch".to_string()))?;
    let columns: Vec<String> = header.split(',').map(|c| c.trim().to_lowercase()).collect();
    let col_index = columns.iter().position(|c| RECOGNIZED_KEYS.contains(&c.as_str()));

    let (rows, index): (Box<dyn Iterator<Item = &str>>, usize) = match col_index {
        Some(idx) => (Box::new(lines), idx),
        None => (Box::new(std::iter::once(header).chain(lines)), 0),
    };

    rows.filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.split(',')
                .nth(index)
                .map(|field| field.trim().to_string())
                .ok_or_else(|| HttpError::BadRequest("csv row missing the input column".to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn txt_batch_splits_lines_and_drops_blanks() {
        let texts = parse_batch(BatchFormat::Txt, "hello\n\nworld  \n").unwrap();
        assert_eq!(texts, vec!["hello".to_string(), "world".to_string()]);
    }

    #[test]
    fn jsonl_batch_reads_recognized_keys() {
        let content = "{\"text\": \"hi\"}\n{\"prompt\": \"bye\"}\n";
        let texts = parse_batch(BatchFormat::Jsonl, content).unwrap();
        assert_eq!(texts, vec!["hi".to_string(), "bye".to_string()]);
    }

    #[test]
    fn jsonl_batch_rejects_line_without_recognized_key() {
        let err = parse_batch(BatchFormat::Jsonl, "{\"other\": \"x\"}\n").unwrap_err();
        assert!(matches!(err, HttpError::BadRequest(_)));
    }

    #[test]
    fn csv_batch_uses_header_to_find_input_column() {
        let content = "id,sentence\n1,hello there\n2,goodbye\n";
        let texts = parse_batch(BatchFormat::Csv, content).unwrap();
        assert_eq!(texts, vec!["hello there".to_string(), "goodbye".to_string()]);
    }

    #[test]
    fn csv_batch_without_header_falls_back_to_first_column() {
        let content = "hello\nworld\n";
        let texts = parse_batch(BatchFormat::Csv, content).unwrap();
        assert_eq!(texts, vec!["hello".to_string(), "world".to_string()]);
    }
}
