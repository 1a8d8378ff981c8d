use std::path::Path;

use crate::errors::QueryError;

pub(crate) fn read_file(path: &Path) -> Result<String, QueryError> {
    std::fs::read_to_string(path).map_err(|source| QueryError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// `file_line:N:path` — 1-indexed line access.
pub fn file_line(path: &Path, line: usize) -> Result<String, QueryError> {
    let contents = read_file(path)?;
    let lines: Vec<&str> = contents.lines().collect();
    if line == 0 || line > lines.len() {
        return Err(QueryError::NotFound(format!(
            "line {line} out of range ({} line(s) in {})",
            lines.len(),
            path.display()
        )));
    }
    Ok(lines[line - 1].to_string())
}

/// `file_word:N:path` — 1-indexed over whitespace-split words.
pub fn file_word(path: &Path, word: usize) -> Result<String, QueryError> {
    let contents = read_file(path)?;
    let words: Vec<&str> = contents.split_whitespace().collect();
    if word == 0 || word > words.len() {
        return Err(QueryError::NotFound(format!(
            "word {word} out of range ({} word(s) in {})",
            words.len(),
            path.display()
        )));
    }
    Ok(words[word - 1].to_string())
}

pub fn file_line_count(path: &Path) -> Result<usize, QueryError> {
    Ok(read_file(path)?.lines().count())
}

pub fn file_word_count(path: &Path) -> Result<usize, QueryError> {
    Ok(read_file(path)?.split_whitespace().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_fixture(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("bw_text_{}_{name}", std::process::id()));
        std::fs::write(&path, contents).expect("write fixture");
        path
    }

    #[test]
    fn line_and_word_access_is_one_indexed() {
        let path = write_fixture("basic.txt", "first line\nsecond line\n");
        assert_eq!(file_line(&path, 1).expect("line"), "first line");
        assert_eq!(file_word(&path, 3).expect("word"), "second");
        assert_eq!(file_line_count(&path).expect("count"), 2);
        assert_eq!(file_word_count(&path).expect("count"), 4);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn out_of_range_line_reports_the_count() {
        let path = write_fixture("short.txt", "only\n");
        let err = file_line(&path, 9).unwrap_err();
        let message = err.to_string();
        assert!(message.contains('9'));
        assert!(message.contains("1 line"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_an_io_error_naming_the_path() {
        let err = file_line(Path::new("/nonexistent/bw.txt"), 1).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/bw.txt"));
    }
}
