use reedline::{Completer, Span, Suggestion};
use std::sync::{Arc, Mutex};

use crate::dashboard::COMMANDS;

/// Completes command names, and feature names for `\set`.
pub struct DashboardCompleter {
    features: Arc<Mutex<Vec<String>>>,
}

impl DashboardCompleter {
    pub fn new(features: Arc<Mutex<Vec<String>>>) -> Self {
        Self { features }
    }

    fn candidates(&self, words: &[&str], partial: &str) -> Vec<(String, Option<String>)> {
        match words {
            [] => COMMANDS
                .iter()
                .filter(|(name, _, _)| name.starts_with(partial))
                .map(|(name, _, help)| (name.to_string(), Some(help.to_string())))
                .collect(),
            [cmd, _row] if cmd.eq_ignore_ascii_case("\\set") => {
                let features = match self.features.lock() {
                    Ok(features) => features.clone(),
                    Err(_) => return Vec::new(),
                };
                features
                    .into_iter()
                    .filter(|f| f.starts_with(partial))
                    .map(|f| (f, Some("feature".to_string())))
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}

impl Completer for DashboardCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let input = &line[..pos];

        // The word under the cursor is empty right after a space
        let (done, partial) = match input.rfind(char::is_whitespace) {
            Some(idx) => (&input[..idx], &input[idx + 1..]),
            None => ("", input),
        };
        let words: Vec<&str> = done.split_whitespace().collect();
        let start_pos = pos - partial.len();

        self.candidates(&words, partial)
            .into_iter()
            .map(|(value, description)| Suggestion {
                value,
                description,
                style: None,
                extra: None,
                span: Span {
                    start: start_pos,
                    end: pos,
                },
                append_whitespace: true,
            })
            .collect()
    }
}
